use serde::{Deserialize, Serialize};

use crate::ids::{ResultId, TaskId, WorkflowId};

/// A [`Task`]'s lifecycle is linear and one-way: `Queued -> InProgress -> {Completed, Failed}`.
/// No transition leads out of a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        write!(f, "{text}")
    }
}

/// A single unit of work within a [`crate::entity::Workflow`]. `step_number` is unique within
/// the owning workflow and is both the intended ordering and the dispatcher's tiebreaker;
/// `depends_on`, when set, additionally threads the dependency's `output` into this task's
/// `input` at dispatch time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub task_id: TaskId,
    pub client_id: String,
    pub workflow_id: WorkflowId,
    pub task_type: String,
    pub step_number: u32,
    pub status: TaskStatus,
    pub depends_on: Option<TaskId>,
    /// Original client payload, opaque to the engine.
    pub geo_json: String,
    /// Populated by the runner from the dependency's `output` at dispatch time.
    pub input: Option<String>,
    /// The job's serialized return value, or a serialized error envelope on failure.
    pub output: Option<String>,
    pub progress: Option<String>,
    pub result_id: Option<ResultId>,
}

impl Task {
    pub fn new(
        workflow_id: WorkflowId,
        client_id: String,
        task_type: String,
        step_number: u32,
        depends_on: Option<TaskId>,
        geo_json: String,
    ) -> Self {
        Self {
            task_id: TaskId::new(),
            client_id,
            workflow_id,
            task_type,
            step_number,
            status: TaskStatus::Queued,
            depends_on,
            geo_json,
            input: None,
            output: None,
            progress: None,
            result_id: None,
        }
    }
}
