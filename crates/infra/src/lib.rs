//! Infrastructure layer: data access, configuration and the analytics service.
//!
//! The analytics crate is pure; everything that touches storage, clocks or
//! the runtime lives here.

pub mod cached;
pub mod config;
pub mod middleware;
pub mod monitor;
pub mod service;
pub mod source;

pub use cached::CachedAnalytics;
pub use config::{AnalyticsConfig, ConfigError};
pub use middleware::{ReportCache, with_cache, with_logging};
pub use monitor::{InMemoryReorderAlertSink, ReorderAlertSink, ReorderMonitor, ReorderMonitorHandle};
pub use service::{AnalyticsService, ServiceError};
pub use source::{AnalyticsSource, DataAccessError, Dataset, InMemoryAnalyticsSource};
