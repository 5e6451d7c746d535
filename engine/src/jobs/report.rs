use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

use crate::{
    entity::{Task, TaskStatus},
    error::{EngineError, EngineResult},
    store::EntityStore,
    util::{parse_or_raw, task_entry, to_json_string},
};

use super::Job;

/// The `reportGeneration` job. Unlike every other job it is privileged: on success it writes
/// its report directly to the owning workflow's `final_result` (see [`super::Job`]'s doc
/// comment for why `store` is part of the trait signature), pre-empting the reconciler's
/// simpler aggregate for that workflow (§4.G / §9 of the spec this crate implements).
pub struct ReportGenerationJob;

/// One line of the human-readable summary for a completed task's output, type-aware per the
/// spec's §4.F: an `area` field reads as an area measurement, a `country` field reads as a
/// location, anything else falls back to its key set, and a bare string renders verbatim.
fn summarize_output(output: &Value) -> String {
    match output {
        Value::String(text) => text.clone(),
        Value::Object(map) => {
            if let Some(area) = map.get("area").and_then(Value::as_f64) {
                let unit = map
                    .get("unit")
                    .and_then(Value::as_str)
                    .unwrap_or("square meters");
                return format!("Area calculated: {area} {unit}");
            }
            if let Some(country) = map.get("country").and_then(Value::as_str) {
                return format!("Location: {country}");
            }
            let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
            keys.sort_unstable();
            keys.join(", ")
        }
        other => other.to_string(),
    }
}

fn render_finished_report(workflow_id: &str, preceding: &[Task]) -> String {
    let completed: Vec<&Task> = preceding
        .iter()
        .filter(|task| task.status == TaskStatus::Completed)
        .collect();
    let failed: Vec<&Task> = preceding
        .iter()
        .filter(|task| task.status == TaskStatus::Failed)
        .collect();

    let mut report = String::new();
    report.push_str("Workflow Analysis Report\n");
    report.push_str(&format!("Workflow ID: {workflow_id}\n"));
    report.push_str(&format!(
        "Total tasks: {}, completed: {}, failed: {}\n\n",
        preceding.len(),
        completed.len(),
        failed.len()
    ));

    report.push_str("Successful tasks:\n");
    if completed.is_empty() {
        report.push_str("  (none)\n");
    }
    for task in &completed {
        let output = task.output.as_deref().map(parse_or_raw).unwrap_or(Value::Null);
        report.push_str(&format!(
            "- {} (Step {}): {}\n",
            task.task_type,
            task.step_number,
            summarize_output(&output)
        ));
    }

    if !failed.is_empty() {
        report.push_str("\nFailed tasks:\n");
        for task in &failed {
            let entry = task_entry(task);
            let error = entry
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("Task failed");
            report.push_str(&format!("- {} (Step {}): {}\n", task.task_type, task.step_number, error));
        }
    }

    report.push_str(&format!("\nGenerated at: {}\n", Utc::now().to_rfc3339()));
    report
}

#[async_trait]
impl Job for ReportGenerationJob {
    async fn run(&self, task: &mut Task, store: &dyn EntityStore) -> EngineResult<Value> {
        let siblings = store.tasks_for_workflow(task.workflow_id).await?;
        let mut preceding: Vec<Task> = siblings
            .into_iter()
            .filter(|sibling| sibling.task_id != task.task_id && sibling.step_number < task.step_number)
            .collect();
        preceding.sort_by_key(|sibling| sibling.step_number);

        if preceding
            .iter()
            .any(|sibling| matches!(sibling.status, TaskStatus::Queued | TaskStatus::InProgress))
        {
            return Err(EngineError::ReportPrematurelyRequested(task.task_id));
        }

        let completed_count = preceding
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count();
        let failed_count = preceding
            .iter()
            .filter(|t| t.status == TaskStatus::Failed)
            .count();

        let workflow_id = task.workflow_id.to_string();
        let tasks: Vec<Value> = preceding.iter().map(task_entry).collect();
        let final_report = render_finished_report(&workflow_id, &preceding);
        let generated_at = Utc::now().to_rfc3339();

        let report = json!({
            "workflowId": workflow_id,
            "tasks": tasks,
            "finalReport": final_report,
            "summary": {
                "totalTasks": preceding.len(),
                "completedTasks": completed_count,
                "failedTasks": failed_count,
                "reportGeneratedAt": generated_at,
            },
        });

        let serialized = to_json_string(&report);
        task.output = Some(serialized.clone());

        if let Some(mut workflow) = store.find_workflow(task.workflow_id).await? {
            workflow.final_result = Some(serialized);
            store.update_workflow(workflow).await?;
        }

        Ok(report)
    }
}
