use chrono::Utc;
use log::info;
use serde_json::json;

use crate::{
    entity::{TaskStatus, WorkflowStatus},
    error::{EngineError, EngineResult},
    ids::WorkflowId,
    store::EntityStore,
    util::{task_entry, to_json_string},
};

/// Recomputes a workflow's status from its tasks and, on the first terminal transition,
/// writes an aggregated `final_result`. Invoked by [`crate::runner::TaskRunner`] after every
/// task transition. No direct teacher analogue exists (the teacher's workflow-run status is
/// maintained by Postgres stored procedures, not in-process Rust); this follows the same
/// "read the aggregate, write the status" shape those procedures expose at the Rust call
/// site (`services/workflow_runs.rs`'s `complete`/`cancel` methods).
///
/// Takes the documented `MAY` branch of the spec: when a successful `reportGeneration` task
/// has already written a richer `final_result` directly, this leaves it untouched rather than
/// overwriting it with the simpler aggregate below. That guard is also what makes a repeated
/// call with no intervening task transition idempotent.
pub async fn reconcile(store: &dyn EntityStore, workflow_id: WorkflowId) -> EngineResult<()> {
    let Some(mut workflow) = store.find_workflow(workflow_id).await? else {
        return Err(EngineError::WorkflowNotFound(workflow_id.to_string()));
    };
    let mut tasks = store.tasks_for_workflow(workflow_id).await?;
    tasks.sort_by_key(|task| task.step_number);

    let all_completed = !tasks.is_empty()
        && tasks.iter().all(|task| task.status == TaskStatus::Completed);
    let any_failed = tasks.iter().any(|task| task.status == TaskStatus::Failed);

    let new_status = if any_failed {
        WorkflowStatus::Failed
    } else if all_completed {
        WorkflowStatus::Completed
    } else if tasks.iter().any(|task| task.status != TaskStatus::Queued) {
        WorkflowStatus::InProgress
    } else {
        WorkflowStatus::Initial
    };

    if new_status != workflow.status {
        info!("workflow {workflow_id} transitioned to {new_status}");
    }
    workflow.status = new_status;

    if (all_completed || any_failed) && workflow.final_result.is_none() {
        let entries: Vec<_> = tasks.iter().map(task_entry).collect();
        let envelope = json!({
            "workflowId": workflow_id.to_string(),
            "status": new_status.to_string(),
            "tasks": entries,
            "generatedAt": Utc::now().to_rfc3339(),
        });
        workflow.final_result = Some(to_json_string(&envelope));
    }

    store.update_workflow(workflow).await?;
    Ok(())
}
