mod geo;
mod notification;
mod polygon_area;
mod report;

pub use geo::GeometryAnalysisJob;
pub use notification::NotificationJob;
pub use polygon_area::PolygonAreaJob;
pub use report::ReportGenerationJob;

use async_trait::async_trait;
use serde_json::Value;

use crate::{entity::Task, error::EngineResult, store::EntityStore};

/// The unit of work bound to a task type in the [`crate::registry::JobRegistry`]. A job
/// consumes a task and either produces a serializable value or fails. Jobs are permitted to
/// mutate `task.output` as a side channel ahead of returning (both the polygon-area and
/// geometry-analysis jobs below do this); the report-generation job additionally writes
/// directly to the owning workflow's `final_result` through `store`, which is why `store` is
/// part of the signature rather than the bare `run(task) -> value` of the originating
/// contract.
#[async_trait]
pub trait Job: Send + Sync {
    async fn run(&self, task: &mut Task, store: &dyn EntityStore) -> EngineResult<Value>;
}
