use log::{error, info};

use crate::{
    entity::{Task, TaskResult, TaskStatus},
    error::{EngineError, EngineResult},
    reconciler,
    registry::JobRegistry,
    store::EntityStore,
};

/// Drives a single [`Task`] through `queued -> in_progress -> {completed, failed}`, then
/// invokes the reconciler unconditionally. Grounded on the teacher's
/// `WorkflowRunWorker::complete_task`/`fail_task` split (`executor/worker.rs`): one method per
/// outcome, both ending in a store write, with the reconciler call playing the role of that
/// worker's `wr_service.complete(...)` call after every outcome rather than only on exhaustion.
pub struct TaskRunner<'a> {
    store: &'a dyn EntityStore,
    registry: &'a JobRegistry,
}

impl<'a> TaskRunner<'a> {
    pub fn new(store: &'a dyn EntityStore, registry: &'a JobRegistry) -> Self {
        Self { store, registry }
    }

    /// Runs `task`, which must be `queued`. Always persists the reconciler's workflow update
    /// before returning, whether the job succeeded or failed. Returns the terminal task state;
    /// a job failure is reported through the `Ok` value's `status`, not as an `Err`, so the
    /// dispatcher loop never needs to special-case it beyond logging.
    pub async fn run(&self, mut task: Task) -> EngineResult<Task> {
        task.status = TaskStatus::InProgress;
        task.progress = Some("starting job...".to_owned());
        task = self.store.update_task(task).await?;

        if let Some(depends_on) = task.depends_on {
            let dependency = match self.store.find_task(depends_on).await? {
                Some(dependency) => dependency,
                None => {
                    return self
                        .fail(task, EngineError::TaskNotFound(depends_on.to_string()))
                        .await
                }
            };
            if dependency.status != TaskStatus::Completed {
                return self
                    .fail(task, EngineError::DependencyNotSatisfied(dependency.task_id))
                    .await;
            }
            task.input = dependency.output.clone();
        }

        let job = match self.registry.lookup(&task.task_type) {
            Ok(job) => job,
            Err(error) => return self.fail(task, error).await,
        };

        match job.run(&mut task, self.store).await {
            Ok(value) => self.succeed(task, value).await,
            Err(error) => self.fail(task, error).await,
        }
    }

    async fn succeed(&self, mut task: Task, value: serde_json::Value) -> EngineResult<Task> {
        let data = if value.is_null() {
            "{}".to_owned()
        } else {
            crate::util::to_json_string(&value)
        };
        let result = self.store.insert_result(TaskResult::new(task.task_id, data)).await?;
        task.result_id = Some(result.result_id);
        task.status = TaskStatus::Completed;
        task.progress = None;
        task = self.store.update_task(task).await?;
        info!("task {} completed", task.task_id);
        self.reconcile(&task).await?;
        Ok(task)
    }

    async fn fail(&self, mut task: Task, error: EngineError) -> EngineResult<Task> {
        error!("task {} failed: {error}", task.task_id);
        task.status = TaskStatus::Failed;
        task.progress = None;
        task = self.store.update_task(task).await?;
        self.reconcile(&task).await?;
        Ok(task)
    }

    async fn reconcile(&self, task: &Task) -> EngineResult<()> {
        reconciler::reconcile(self.store, task.workflow_id).await
    }
}
