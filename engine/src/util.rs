use serde_json::{json, Value};

use crate::entity::{Task, TaskStatus};

/// Parses `raw` as JSON, falling back to the raw string wrapped as a `Value::String` on
/// failure. This is the "parse-on-read with fallback-to-raw-string" rule every boundary field
/// (`geoJson`, `input`, `output`, `finalResult`, `Result.data`) is read back under.
pub fn parse_or_raw(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

/// Serializes `value` to a compact JSON string. Only fails for types serde_json cannot
/// represent (maps with non-string keys, etc.), which none of the engine's call sites produce.
pub fn to_json_string(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

/// Builds the `{ taskId, type, stepNumber, status, output?, error? }` entry shared by the
/// report generator and the reconciler's aggregate `finalResult`. For a completed task,
/// `output` is the parsed (or raw-fallback) form of `task.output`. For a failed task, `error`
/// is taken from a `message`/`error` field of the parsed output when present; otherwise it is
/// the literal string `"Task failed"` and the raw parsed output is preserved under `output`.
pub fn task_entry(task: &Task) -> Value {
    let mut entry = json!({
        "taskId": task.task_id.to_string(),
        "type": task.task_type,
        "stepNumber": task.step_number,
        "status": task.status.to_string(),
    });
    match task.status {
        TaskStatus::Completed => {
            if let Some(raw) = &task.output {
                entry["output"] = parse_or_raw(raw);
            }
        }
        TaskStatus::Failed => {
            let parsed = task.output.as_deref().map(parse_or_raw);
            let error_text = parsed
                .as_ref()
                .and_then(|value| value.get("message").or_else(|| value.get("error")))
                .and_then(Value::as_str)
                .map(str::to_owned);
            match (error_text, parsed) {
                (Some(text), _) => entry["error"] = json!(text),
                (None, Some(parsed)) => {
                    entry["error"] = json!("Task failed");
                    entry["output"] = parsed;
                }
                (None, None) => entry["error"] = json!("Task failed"),
            }
        }
        TaskStatus::Queued | TaskStatus::InProgress => {}
    }
    entry
}
