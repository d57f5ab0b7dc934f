//! Observability: structured logging and Prometheus metrics.

pub mod metrics;
pub mod tracing;

pub use metrics::{
    record_auth_attempt, record_evaluation_submitted, record_promotion_approved, AuthOutcome,
    MetricsState,
};
pub use tracing::init_telemetry;
