mod analyze;
mod health;
mod updates;

pub use analyze::analyze;
pub use health::{health_check, root};
pub use updates::{latest_tos_versions, tos_version};
