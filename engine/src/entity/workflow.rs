use serde::{Deserialize, Serialize};

use crate::ids::WorkflowId;

/// Status of a [`Workflow`], derived entirely from the aggregate status of its tasks by the
/// reconciler. Never set directly by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Initial,
    InProgress,
    Completed,
    Failed,
}

impl WorkflowStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Initial => "initial",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        write!(f, "{text}")
    }
}

/// An instantiated, persistent ordered collection of tasks sharing a client id. The engine
/// never deletes a workflow row; it is mutated only by the reconciler (with the single
/// documented exception of a successful `reportGeneration` task writing `final_result`
/// directly).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub workflow_id: WorkflowId,
    pub client_id: String,
    pub status: WorkflowStatus,
    /// Serialized aggregate, present only once `status` is terminal. Set exactly once.
    pub final_result: Option<String>,
}

impl Workflow {
    pub fn new(client_id: String) -> Self {
        Self {
            workflow_id: WorkflowId::new(),
            client_id,
            status: WorkflowStatus::Initial,
            final_result: None,
        }
    }
}
