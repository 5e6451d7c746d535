mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;

use crate::{
    entity::{Task, TaskResult, TaskStatus, Workflow},
    error::EngineResult,
    ids::{ResultId, TaskId, WorkflowId},
};

/// Durable read/write access to the three core entities. Implementations must guarantee
/// read-your-writes consistency within a process: once an `insert_*`/`update_*` call returns,
/// a subsequent lookup in the same process observes the write. The core confines mutation of
/// each row to a single component (the factory creates, the runner mutates tasks, the
/// reconciler mutates workflows), so no multi-row transactions are required of implementors.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn insert_workflow(&self, workflow: Workflow) -> EngineResult<Workflow>;
    async fn update_workflow(&self, workflow: Workflow) -> EngineResult<Workflow>;
    async fn find_workflow(&self, workflow_id: WorkflowId) -> EngineResult<Option<Workflow>>;

    async fn insert_task(&self, task: Task) -> EngineResult<Task>;
    async fn update_task(&self, task: Task) -> EngineResult<Task>;
    async fn find_task(&self, task_id: TaskId) -> EngineResult<Option<Task>>;
    async fn tasks_for_workflow(&self, workflow_id: WorkflowId) -> EngineResult<Vec<Task>>;
    async fn tasks_with_status(&self, status: TaskStatus) -> EngineResult<Vec<Task>>;

    async fn insert_result(&self, result: TaskResult) -> EngineResult<TaskResult>;
    async fn find_result(&self, result_id: ResultId) -> EngineResult<Option<TaskResult>>;
}
