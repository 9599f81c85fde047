//! Gateway error types.

use thiserror::Error;

use crate::pipeline::PipelineError;

/// A request rejected before the pipeline was invoked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl GatewayError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
