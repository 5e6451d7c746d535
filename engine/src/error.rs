use thiserror::Error;

use crate::ids::TaskId;

/// Every failure mode the engine can produce, spanning both the domain-level taxonomy
/// (validation, unknown task types, job failures, dependency/report ordering violations) and
/// the infrastructural failures a real service accumulates (store, serialization, I/O).
#[derive(Debug, Error)]
pub enum EngineError {
    /// Workflow-definition validation failed before any row was persisted. `Display` begins
    /// with the literal prefix `Invalid workflow:` so the HTTP adapter's 400 body matches it.
    #[error("Invalid workflow: {0}")]
    InvalidWorkflow(String),

    #[error("Unknown task type: {0}")]
    UnknownTaskType(String),

    #[error("Job failed for task {task_id}: {message}")]
    Job { task_id: TaskId, message: String },

    #[error("Dependency not satisfied for task {0}")]
    DependencyNotSatisfied(TaskId),

    #[error("Report generation requested before preceding tasks finished for task {0}")]
    ReportPrematurelyRequested(TaskId),

    #[error("Workflow not found: {0}")]
    WorkflowNotFound(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Entity store error: {0}")]
    Store(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Common(#[from] common::error::EmError),
}

pub type EngineResult<T> = Result<T, EngineError>;
