use crate::error::AnalyticsError;

/// A self-contained analytics computation.
///
/// Jobs own an in-memory **snapshot** of the records they need. This crate
/// stays storage-agnostic: snapshots are fetched by callers (infra/services)
/// and handed over fully materialized.
pub trait AnalyticsJob: Send + Sync + 'static {
    type Output: Send + 'static;

    /// Stable report name, used for logging and cache keys.
    const NAME: &'static str;

    /// Execute the computation.
    ///
    /// Must be a pure function of the snapshot and the job's tunables.
    fn run(&self) -> Result<Self::Output, AnalyticsError>;
}
