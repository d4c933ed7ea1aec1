use thiserror::Error;

/// Aggregate error for every Pipeline Orchestrator operation.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("payload could not be parsed: {0}")]
    Parse(String),
    #[error("{0}")]
    Validation(String),
    #[error("unknown agent: {0}")]
    UnknownAgent(String),
    #[error(transparent)]
    Match(#[from] matcher::MatchError),
    #[error(transparent)]
    Budget(#[from] budget::BudgetError),
    #[error(transparent)]
    Index(#[from] index::IndexError),
}
