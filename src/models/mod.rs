mod api;

pub use api::{
    AnalysisResult, AnalyzeRequest, Clause, ClauseKind, HealthResponse, RootResponse,
    SuggestedAlternative, TosVersionEntry, TosVersionResponse,
};
