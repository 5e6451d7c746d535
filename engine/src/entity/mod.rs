mod result;
mod task;
mod workflow;

pub use result::Result as TaskResult;
pub use task::{Task, TaskStatus};
pub use workflow::{Workflow, WorkflowStatus};
