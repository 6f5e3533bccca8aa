//! Background monitors built on the analytics service.
//!
//! Monitors run on the tokio runtime and publish to a sink. Their failures
//! are logged and never reach request handling.

pub mod reorder_monitor;

pub use reorder_monitor::{
    InMemoryReorderAlertSink, ReorderAlertSink, ReorderMonitor, ReorderMonitorHandle,
};
