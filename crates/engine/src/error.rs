use svc_router_common::LlmError;
use thiserror::Error;

/// Core error type for engine failures
///
/// Invocation failures are not represented here: the invoker always returns a
/// structured `ExecutionResult` and never propagates an error.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// Model output could not be turned into a plan; fatal to the run, never
    /// to the process. The raw text is preserved for diagnostics.
    #[error("Planning failed: {message}")]
    Planning { message: String, raw_response: String },

    #[error("Registry error: {0}")]
    Registry(String),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn planning(message: impl Into<String>, raw_response: impl Into<String>) -> Self {
        Self::Planning {
            message: message.into(),
            raw_response: raw_response.into(),
        }
    }

    pub fn registry(message: impl Into<String>) -> Self {
        Self::Registry(message.into())
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
