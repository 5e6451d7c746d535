use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    entity::{Task, TaskResult, TaskStatus, Workflow},
    error::EngineResult,
    ids::{ResultId, TaskId, WorkflowId},
};

use super::EntityStore;

/// Reference `EntityStore` implementation backing the combined single-process binary and the
/// integration test suite. Each entity lives in its own `RwLock<HashMap<..>>`; a write always
/// completes before the lock is released, so a following read in the same process observes it.
#[derive(Default)]
pub struct InMemoryStore {
    workflows: RwLock<HashMap<WorkflowId, Workflow>>,
    tasks: RwLock<HashMap<TaskId, Task>>,
    results: RwLock<HashMap<ResultId, TaskResult>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn insert_workflow(&self, workflow: Workflow) -> EngineResult<Workflow> {
        let mut workflows = self.workflows.write().await;
        workflows.insert(workflow.workflow_id, workflow.clone());
        Ok(workflow)
    }

    async fn update_workflow(&self, workflow: Workflow) -> EngineResult<Workflow> {
        let mut workflows = self.workflows.write().await;
        workflows.insert(workflow.workflow_id, workflow.clone());
        Ok(workflow)
    }

    async fn find_workflow(&self, workflow_id: WorkflowId) -> EngineResult<Option<Workflow>> {
        let workflows = self.workflows.read().await;
        Ok(workflows.get(&workflow_id).cloned())
    }

    async fn insert_task(&self, task: Task) -> EngineResult<Task> {
        let mut tasks = self.tasks.write().await;
        tasks.insert(task.task_id, task.clone());
        Ok(task)
    }

    async fn update_task(&self, task: Task) -> EngineResult<Task> {
        let mut tasks = self.tasks.write().await;
        tasks.insert(task.task_id, task.clone());
        Ok(task)
    }

    async fn find_task(&self, task_id: TaskId) -> EngineResult<Option<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.get(&task_id).cloned())
    }

    async fn tasks_for_workflow(&self, workflow_id: WorkflowId) -> EngineResult<Vec<Task>> {
        let tasks = self.tasks.read().await;
        let mut matching: Vec<Task> = tasks
            .values()
            .filter(|task| task.workflow_id == workflow_id)
            .cloned()
            .collect();
        matching.sort_by_key(|task| task.step_number);
        Ok(matching)
    }

    async fn tasks_with_status(&self, status: TaskStatus) -> EngineResult<Vec<Task>> {
        let tasks = self.tasks.read().await;
        let matching: Vec<Task> = tasks
            .values()
            .filter(|task| task.status == status)
            .cloned()
            .collect();
        Ok(matching)
    }

    async fn insert_result(&self, result: TaskResult) -> EngineResult<TaskResult> {
        let mut results = self.results.write().await;
        results.insert(result.result_id, result.clone());
        Ok(result)
    }

    async fn find_result(&self, result_id: ResultId) -> EngineResult<Option<TaskResult>> {
        let results = self.results.read().await;
        Ok(results.get(&result_id).cloned())
    }
}
