use ofc_core::{EvalError, PositionError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid search configuration: {field} {message}")]
    InvalidConfig {
        field: &'static str,
        message: String,
    },
    #[error("position error: {0}")]
    Position(#[from] PositionError),
    #[error("evaluation error: {0}")]
    Evaluation(#[from] EvalError),
}
