//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms via the metrics facade)
//! ```
//!
//! # Design Decisions
//! - Structured fields (method, contract, ttl) instead of formatted strings
//! - Metrics are cheap facade calls; no exporter is bundled

pub mod logging;
pub mod metrics;
