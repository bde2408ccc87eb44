//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! ingress / egress layers produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (rejection and rewrite counters)
//! ```

pub mod logging;
pub mod metrics;
