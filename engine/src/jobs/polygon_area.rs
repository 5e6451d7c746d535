use async_trait::async_trait;
use serde_json::Value;

use crate::{
    entity::Task,
    error::{EngineError, EngineResult},
    store::EntityStore,
};

use super::{geo::compute_polygon_area, Job};

/// The `polygonArea` job. Reads the GeoJSON polygon submitted for the workflow and returns an
/// approximate area — see [`super::geo`] for the caveat on accuracy.
pub struct PolygonAreaJob;

#[async_trait]
impl Job for PolygonAreaJob {
    async fn run(&self, task: &mut Task, _store: &dyn EntityStore) -> EngineResult<Value> {
        let raw = task.input.as_deref().unwrap_or(&task.geo_json);
        let geo_json = crate::util::parse_or_raw(raw);
        let output = compute_polygon_area(&geo_json).map_err(|message| EngineError::Job {
            task_id: task.task_id,
            message,
        })?;
        task.output = Some(crate::util::to_json_string(&output));
        Ok(output)
    }
}
