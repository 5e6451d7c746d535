use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{entity::Task, error::EngineResult, store::EntityStore};

use super::Job;

/// The `notification` job. Has no external recipient in this engine (no mail/SMS integration
/// is in scope, mirroring the teacher's `lettre`-based notifications being out of scope here);
/// it records a message summarizing whatever it received, either the dependency's `output`
/// (when `dependsOn` wired one in) or the original `geoJson` payload.
pub struct NotificationJob;

#[async_trait]
impl Job for NotificationJob {
    async fn run(&self, task: &mut Task, _store: &dyn EntityStore) -> EngineResult<Value> {
        let source = task.input.as_deref().unwrap_or(&task.geo_json);
        let message = format!("Notification dispatched for task {}", task.task_id);
        let output = json!({ "message": message, "source": crate::util::parse_or_raw(source) });
        task.output = Some(crate::util::to_json_string(&output));
        Ok(output)
    }
}
