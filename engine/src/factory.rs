use std::collections::HashSet;

use log::info;

use crate::{
    definition::WorkflowDefinition,
    entity::{Task, Workflow},
    error::{EngineError, EngineResult},
    ids::TaskId,
    registry::JobRegistry,
    store::EntityStore,
};

/// Materializes a validated [`WorkflowDefinition`] plus a client payload into one persisted
/// [`Workflow`] row and one [`Task`] row per step, with `depends_on` edges wired between task
/// identities. Grounded on the teacher's `TaskQueueRequest` validate-then-insert pattern
/// (`services/task_queue.rs`): the definition is validated in full before any row is written,
/// so a rejected definition never leaves partial rows behind.
pub struct WorkflowFactory<'a> {
    store: &'a dyn EntityStore,
    registry: &'a JobRegistry,
}

impl<'a> WorkflowFactory<'a> {
    pub fn new(store: &'a dyn EntityStore, registry: &'a JobRegistry) -> Self {
        Self { store, registry }
    }

    /// Validates `definition` against the job registry and its own internal structure,
    /// without touching the store. Exposed separately so the HTTP adapter can reject a bad
    /// definition with a 400 before attempting to materialize anything.
    pub fn validate(&self, definition: &WorkflowDefinition) -> EngineResult<()> {
        if definition.name.trim().is_empty() {
            return Err(EngineError::InvalidWorkflow("definition has no name".into()));
        }
        if definition.steps.is_empty() {
            return Err(EngineError::InvalidWorkflow(
                "definition has no steps".into(),
            ));
        }

        let mut seen_steps = HashSet::new();
        for step in &definition.steps {
            if step.step_number == 0 {
                return Err(EngineError::InvalidWorkflow(format!(
                    "step_number must be positive, found {}",
                    step.step_number
                )));
            }
            if !seen_steps.insert(step.step_number) {
                return Err(EngineError::InvalidWorkflow(format!(
                    "duplicate step_number {}",
                    step.step_number
                )));
            }
            if !self.registry.contains(&step.task_type) {
                return Err(EngineError::InvalidWorkflow(format!(
                    "unknown task type {}",
                    step.task_type
                )));
            }
        }

        for step in &definition.steps {
            let Some(depends_on) = step.depends_on else {
                continue;
            };
            if depends_on == step.step_number {
                return Err(EngineError::InvalidWorkflow(format!(
                    "step {} cannot depend on itself",
                    step.step_number
                )));
            }
            if !seen_steps.contains(&depends_on) {
                return Err(EngineError::InvalidWorkflow(format!(
                    "step {} depends on non-existent step {}",
                    step.step_number, depends_on
                )));
            }
        }

        Ok(())
    }

    /// Validates `definition`, then persists a [`Workflow`] and one [`Task`] per step,
    /// resolving `depends_on` step numbers into [`TaskId`] references once every task has an
    /// identity.
    pub async fn materialize(
        &self,
        definition: &WorkflowDefinition,
        client_id: String,
        geo_json: String,
    ) -> EngineResult<Workflow> {
        self.validate(definition)?;

        let workflow = self.store.insert_workflow(Workflow::new(client_id.clone())).await?;
        info!(
            "materialized workflow {} from definition '{}'",
            workflow.workflow_id, definition.name
        );

        let mut step_to_task_id: Vec<(u32, TaskId)> = Vec::with_capacity(definition.steps.len());
        for step in &definition.steps {
            let task = Task::new(
                workflow.workflow_id,
                client_id.clone(),
                step.task_type.clone(),
                step.step_number,
                None,
                geo_json.clone(),
            );
            let task = self.store.insert_task(task).await?;
            step_to_task_id.push((step.step_number, task.task_id));
        }

        for step in &definition.steps {
            let Some(depends_on_step) = step.depends_on else {
                continue;
            };
            let (_, task_id) = step_to_task_id
                .iter()
                .find(|(number, _)| *number == step.step_number)
                .ok_or_else(|| EngineError::TaskNotFound(format!("step {}", step.step_number)))?;
            let (_, depends_on_id) = step_to_task_id
                .iter()
                .find(|(number, _)| *number == depends_on_step)
                .ok_or_else(|| EngineError::TaskNotFound(format!("step {depends_on_step}")))?;
            let Some(mut task) = self.store.find_task(*task_id).await? else {
                return Err(EngineError::TaskNotFound(task_id.to_string()));
            };
            task.depends_on = Some(*depends_on_id);
            self.store.update_task(task).await?;
        }

        Ok(workflow)
    }
}
