use std::{collections::HashMap, sync::Arc};

use crate::{error::EngineError, jobs::Job};

/// Maps a task-type tag to the job implementation that executes it. Populated once at process
/// start via [`JobRegistry::builder`] and immutable thereafter — the teacher's
/// `services` singleton map plays the same role but through a global `OnceCell`; here every
/// binary constructs one explicitly and shares it via `Arc`.
pub struct JobRegistry {
    jobs: HashMap<String, Arc<dyn Job>>,
}

impl JobRegistry {
    pub fn builder() -> JobRegistryBuilder {
        JobRegistryBuilder {
            jobs: HashMap::new(),
        }
    }

    pub fn lookup(&self, task_type: &str) -> Result<Arc<dyn Job>, EngineError> {
        self.jobs
            .get(task_type)
            .cloned()
            .ok_or_else(|| EngineError::UnknownTaskType(task_type.to_owned()))
    }

    pub fn contains(&self, task_type: &str) -> bool {
        self.jobs.contains_key(task_type)
    }
}

pub struct JobRegistryBuilder {
    jobs: HashMap<String, Arc<dyn Job>>,
}

impl JobRegistryBuilder {
    pub fn register(mut self, task_type: impl Into<String>, job: Arc<dyn Job>) -> Self {
        self.jobs.insert(task_type.into(), job);
        self
    }

    pub fn build(self) -> JobRegistry {
        JobRegistry { jobs: self.jobs }
    }
}
