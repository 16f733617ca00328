pub type StudioResult<T> = Result<T, StudioError>;

/// Failures of the video generation pipeline.
///
/// Fact-check failures are reported separately through
/// [`FactCheckError`](crate::factcheck::FactCheckError) and never abort a render.
#[derive(thiserror::Error, Debug)]
pub enum StudioError {
    #[error("no input: {0}")]
    NoInput(String),

    #[error("surface error: {0}")]
    Surface(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("render cancelled")]
    Cancelled,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StudioError {
    pub fn no_input(msg: impl Into<String>) -> Self {
        Self::NoInput(msg.into())
    }

    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// `true` for the variant produced by a signalled [`CancellationToken`](crate::CancellationToken).
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
