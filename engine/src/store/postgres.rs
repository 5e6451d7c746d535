use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::{
    entity::{Task, TaskResult, TaskStatus, Workflow, WorkflowStatus},
    error::{EngineError, EngineResult},
    ids::{ResultId, TaskId, WorkflowId},
};

use super::EntityStore;

/// `sqlx`-backed `EntityStore` for real deployments. Status columns are stored as `TEXT`
/// (rather than the teacher's custom Postgres composite/enum types in
/// `services/workflow_runs.rs`) since the concrete column representation is an out-of-scope
/// persistence detail; only the trait contract matters to the core.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> EngineResult<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn workflow_status_to_str(status: WorkflowStatus) -> &'static str {
    match status {
        WorkflowStatus::Initial => "initial",
        WorkflowStatus::InProgress => "in_progress",
        WorkflowStatus::Completed => "completed",
        WorkflowStatus::Failed => "failed",
    }
}

fn workflow_status_from_str(value: &str) -> EngineResult<WorkflowStatus> {
    match value {
        "initial" => Ok(WorkflowStatus::Initial),
        "in_progress" => Ok(WorkflowStatus::InProgress),
        "completed" => Ok(WorkflowStatus::Completed),
        "failed" => Ok(WorkflowStatus::Failed),
        other => Err(EngineError::Store(format!(
            "unrecognized workflow status in database: {other}"
        ))),
    }
}

fn task_status_to_str(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Queued => "queued",
        TaskStatus::InProgress => "in_progress",
        TaskStatus::Completed => "completed",
        TaskStatus::Failed => "failed",
    }
}

fn task_status_from_str(value: &str) -> EngineResult<TaskStatus> {
    match value {
        "queued" => Ok(TaskStatus::Queued),
        "in_progress" => Ok(TaskStatus::InProgress),
        "completed" => Ok(TaskStatus::Completed),
        "failed" => Ok(TaskStatus::Failed),
        other => Err(EngineError::Store(format!(
            "unrecognized task status in database: {other}"
        ))),
    }
}

fn row_to_workflow(row: &sqlx::postgres::PgRow) -> EngineResult<Workflow> {
    let workflow_id: uuid::Uuid = row.try_get("workflow_id")?;
    let status_text: String = row.try_get("status")?;
    Ok(Workflow {
        workflow_id: workflow_id.into(),
        client_id: row.try_get("client_id")?,
        status: workflow_status_from_str(&status_text)?,
        final_result: row.try_get("final_result")?,
    })
}

fn row_to_task(row: &sqlx::postgres::PgRow) -> EngineResult<Task> {
    let task_id: uuid::Uuid = row.try_get("task_id")?;
    let workflow_id: uuid::Uuid = row.try_get("workflow_id")?;
    let status_text: String = row.try_get("status")?;
    let depends_on: Option<uuid::Uuid> = row.try_get("depends_on")?;
    let result_id: Option<uuid::Uuid> = row.try_get("result_id")?;
    let step_number: i32 = row.try_get("step_number")?;
    Ok(Task {
        task_id: task_id.into(),
        client_id: row.try_get("client_id")?,
        workflow_id: workflow_id.into(),
        task_type: row.try_get("task_type")?,
        step_number: step_number as u32,
        status: task_status_from_str(&status_text)?,
        depends_on: depends_on.map(Into::into),
        geo_json: row.try_get("geo_json")?,
        input: row.try_get("input")?,
        output: row.try_get("output")?,
        progress: row.try_get("progress")?,
        result_id: result_id.map(Into::into),
    })
}

fn row_to_result(row: &sqlx::postgres::PgRow) -> EngineResult<TaskResult> {
    let result_id: uuid::Uuid = row.try_get("result_id")?;
    let task_id: uuid::Uuid = row.try_get("task_id")?;
    Ok(TaskResult {
        result_id: result_id.into(),
        task_id: task_id.into(),
        data: row.try_get("data")?,
    })
}

#[async_trait]
impl EntityStore for PgStore {
    async fn insert_workflow(&self, workflow: Workflow) -> EngineResult<Workflow> {
        sqlx::query(
            "insert into workflows (workflow_id, client_id, status, final_result) \
             values ($1, $2, $3, $4)",
        )
        .bind(workflow.workflow_id.into_inner())
        .bind(&workflow.client_id)
        .bind(workflow_status_to_str(workflow.status))
        .bind(&workflow.final_result)
        .execute(&self.pool)
        .await?;
        Ok(workflow)
    }

    async fn update_workflow(&self, workflow: Workflow) -> EngineResult<Workflow> {
        sqlx::query(
            "update workflows set client_id = $2, status = $3, final_result = $4 \
             where workflow_id = $1",
        )
        .bind(workflow.workflow_id.into_inner())
        .bind(&workflow.client_id)
        .bind(workflow_status_to_str(workflow.status))
        .bind(&workflow.final_result)
        .execute(&self.pool)
        .await?;
        Ok(workflow)
    }

    async fn find_workflow(&self, workflow_id: WorkflowId) -> EngineResult<Option<Workflow>> {
        let row = sqlx::query("select * from workflows where workflow_id = $1")
            .bind(workflow_id.into_inner())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_workflow).transpose()
    }

    async fn insert_task(&self, task: Task) -> EngineResult<Task> {
        sqlx::query(
            "insert into tasks (task_id, client_id, workflow_id, task_type, step_number, \
             status, depends_on, geo_json, input, output, progress, result_id) \
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(task.task_id.into_inner())
        .bind(&task.client_id)
        .bind(task.workflow_id.into_inner())
        .bind(&task.task_type)
        .bind(task.step_number as i32)
        .bind(task_status_to_str(task.status))
        .bind(task.depends_on.map(|id| id.into_inner()))
        .bind(&task.geo_json)
        .bind(&task.input)
        .bind(&task.output)
        .bind(&task.progress)
        .bind(task.result_id.map(|id| id.into_inner()))
        .execute(&self.pool)
        .await?;
        Ok(task)
    }

    async fn update_task(&self, task: Task) -> EngineResult<Task> {
        sqlx::query(
            "update tasks set status = $2, input = $3, output = $4, progress = $5, \
             result_id = $6 where task_id = $1",
        )
        .bind(task.task_id.into_inner())
        .bind(task_status_to_str(task.status))
        .bind(&task.input)
        .bind(&task.output)
        .bind(&task.progress)
        .bind(task.result_id.map(|id| id.into_inner()))
        .execute(&self.pool)
        .await?;
        Ok(task)
    }

    async fn find_task(&self, task_id: TaskId) -> EngineResult<Option<Task>> {
        let row = sqlx::query("select * from tasks where task_id = $1")
            .bind(task_id.into_inner())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_task).transpose()
    }

    async fn tasks_for_workflow(&self, workflow_id: WorkflowId) -> EngineResult<Vec<Task>> {
        let rows = sqlx::query("select * from tasks where workflow_id = $1 order by step_number")
            .bind(workflow_id.into_inner())
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_task).collect()
    }

    async fn tasks_with_status(&self, status: TaskStatus) -> EngineResult<Vec<Task>> {
        let rows = sqlx::query("select * from tasks where status = $1 order by step_number")
            .bind(task_status_to_str(status))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_task).collect()
    }

    async fn insert_result(&self, result: TaskResult) -> EngineResult<TaskResult> {
        sqlx::query("insert into results (result_id, task_id, data) values ($1, $2, $3)")
            .bind(result.result_id.into_inner())
            .bind(result.task_id.into_inner())
            .bind(&result.data)
            .execute(&self.pool)
            .await?;
        Ok(result)
    }

    async fn find_result(&self, result_id: ResultId) -> EngineResult<Option<TaskResult>> {
        let row = sqlx::query("select * from results where result_id = $1")
            .bind(result_id.into_inner())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_result).transpose()
    }
}
