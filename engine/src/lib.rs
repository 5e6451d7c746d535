#![warn(
    clippy::complexity,
    clippy::correctness,
    clippy::perf,
    clippy::style,
    clippy::unwrap_used,
    clippy::expect_used
)]

pub mod api;
pub mod definition;
pub mod dispatcher;
pub mod entity;
pub mod error;
pub mod factory;
pub mod ids;
pub mod jobs;
pub mod reconciler;
pub mod registry;
pub mod runner;
pub mod store;
mod util;

pub use dispatcher::Dispatcher;
pub use error::{EngineError, EngineResult};
pub use registry::JobRegistry;

use std::sync::Arc;

use jobs::{GeometryAnalysisJob, NotificationJob, PolygonAreaJob, ReportGenerationJob};

/// Builds the fixed job registry this crate ships: `polygonArea`, `analysis`, `notification`,
/// `reportGeneration` — the minimal job set sufficient to execute every end-to-end scenario in
/// §8 of the spec this crate implements, per §11's supplemented-features note. Every binary
/// calls this once at startup rather than relying on a process-global registry.
pub fn build_registry() -> JobRegistry {
    JobRegistry::builder()
        .register("polygonArea", Arc::new(PolygonAreaJob))
        .register("analysis", Arc::new(GeometryAnalysisJob))
        .register("notification", Arc::new(NotificationJob))
        .register("reportGeneration", Arc::new(ReportGenerationJob))
        .build()
}
