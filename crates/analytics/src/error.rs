use thiserror::Error;

/// Failure of an analytics computation.
///
/// Too little history is **not** an error: every job has a documented
/// fallback result for that case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyticsError {
    #[error("invalid job input: {0}")]
    InvalidInput(String),
}

impl AnalyticsError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
