use serde::{Deserialize, Serialize};

use crate::ids::{ResultId, TaskId};

/// The persisted output of a single successfully completed task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Result {
    pub result_id: ResultId,
    pub task_id: TaskId,
    pub data: String,
}

impl Result {
    pub fn new(task_id: TaskId, data: String) -> Self {
        Self {
            result_id: ResultId::new(),
            task_id,
            data,
        }
    }
}
