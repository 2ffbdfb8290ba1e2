use thiserror::Error;

/// Failures at the LLM completion boundary
///
/// Nothing past this boundary panics; the engine converts these into failed
/// traces or planning errors.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("LLM endpoint returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("LLM response contained no completion text")]
    EmptyResponse,
}

pub type LlmResult<T> = std::result::Result<T, LlmError>;
