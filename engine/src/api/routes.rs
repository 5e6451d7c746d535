use std::sync::Arc;

use common::{api::ApiResponse, error::EmError};
use rocket::{get, post, serde::json::Json, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    definition::load_definition,
    entity::TaskStatus,
    error::EngineError,
    factory::WorkflowFactory,
    ids::WorkflowId,
    registry::JobRegistry,
    store::EntityStore,
    util::{parse_or_raw, to_json_string},
};

const DEFAULT_WORKFLOW_NAME: &str = "example_workflow";

/// Body of `POST /analysis`. `geo_json` is accepted as a structured JSON value and immediately
/// flattened to the opaque string the core stores in `Task::geo_json` (§9 "serialization at
/// boundaries" of the spec this crate implements).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub client_id: String,
    pub geo_json: Value,
    pub workflow_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub workflow_id: String,
    pub message: String,
}

/// `POST /analysis` — loads the named (or default) workflow definition, validates it against
/// the job registry, and materializes a workflow for the dispatcher to pick up. Returns 202 on
/// success; 400 with an `Invalid workflow:`-prefixed message on validation failure (§6/S3).
#[post("/analysis", data = "<request>")]
pub async fn submit_analysis(
    request: Json<AnalysisRequest>,
    store: &State<Arc<dyn EntityStore>>,
    registry: &State<Arc<JobRegistry>>,
) -> ApiResponse<AnalysisResponse> {
    let workflow_name = request
        .workflow_name
        .as_deref()
        .unwrap_or(DEFAULT_WORKFLOW_NAME);

    let definition = match load_definition(workflow_name).await {
        Ok(definition) => definition,
        Err(error @ EngineError::InvalidWorkflow(_)) => {
            return ApiResponse::bad_request(error.to_string())
        }
        Err(error) => return ApiResponse::server_error(EmError::from(error.to_string())),
    };

    let factory = WorkflowFactory::new(store.inner().as_ref(), registry.inner().as_ref());
    let geo_json = to_json_string(&request.geo_json);
    match factory
        .materialize(&definition, request.client_id.clone(), geo_json)
        .await
    {
        Ok(workflow) => ApiResponse::accepted(AnalysisResponse {
            workflow_id: workflow.workflow_id.to_string(),
            message: "workflow queued".to_owned(),
        }),
        Err(error @ EngineError::InvalidWorkflow(_)) => {
            ApiResponse::bad_request(error.to_string())
        }
        Err(error) => ApiResponse::server_error(EmError::from(error.to_string())),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub workflow_id: String,
    pub status: String,
    pub completed_tasks: usize,
    pub total_tasks: usize,
}

/// `GET /workflow/<id>/status` — always reflects the latest persisted state; 404 if the id is
/// unknown or unparseable (§8/S5).
#[get("/workflow/<id>/status")]
pub async fn workflow_status(
    id: String,
    store: &State<Arc<dyn EntityStore>>,
) -> ApiResponse<StatusResponse> {
    let Ok(workflow_id) = id.parse::<WorkflowId>() else {
        return ApiResponse::not_found(format!("Workflow not found: {id}"));
    };
    let workflow = match store.find_workflow(workflow_id).await {
        Ok(Some(workflow)) => workflow,
        Ok(None) => return ApiResponse::not_found(format!("Workflow not found: {id}")),
        Err(error) => return ApiResponse::server_error(EmError::from(error.to_string())),
    };
    let tasks = match store.tasks_for_workflow(workflow_id).await {
        Ok(tasks) => tasks,
        Err(error) => return ApiResponse::server_error(EmError::from(error.to_string())),
    };
    let completed_tasks = tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Completed)
        .count();
    ApiResponse::ok(StatusResponse {
        workflow_id: workflow.workflow_id.to_string(),
        status: workflow.status.to_string(),
        completed_tasks,
        total_tasks: tasks.len(),
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsResponse {
    pub workflow_id: String,
    pub status: String,
    pub final_result: Value,
}

/// `GET /workflow/<id>/results` — only fruitful once the workflow has reached a terminal
/// status; 400 with the current status otherwise, 404 if the id is unknown (§7 "user-visible
/// behavior"). `final_result` is returned parsed, falling back to the raw string on parse
/// failure, per §6's "parse-on-read" rule.
#[get("/workflow/<id>/results")]
pub async fn workflow_results(
    id: String,
    store: &State<Arc<dyn EntityStore>>,
) -> ApiResponse<ResultsResponse> {
    let Ok(workflow_id) = id.parse::<WorkflowId>() else {
        return ApiResponse::not_found(format!("Workflow not found: {id}"));
    };
    let workflow = match store.find_workflow(workflow_id).await {
        Ok(Some(workflow)) => workflow,
        Ok(None) => return ApiResponse::not_found(format!("Workflow not found: {id}")),
        Err(error) => return ApiResponse::server_error(EmError::from(error.to_string())),
    };
    if !workflow.status.is_terminal() {
        return ApiResponse::bad_request(format!(
            "workflow {} is not yet terminal (status: {})",
            workflow.workflow_id, workflow.status
        ));
    }
    let final_result = workflow
        .final_result
        .as_deref()
        .map(parse_or_raw)
        .unwrap_or(Value::Null);
    ApiResponse::ok(ResultsResponse {
        workflow_id: workflow.workflow_id.to_string(),
        status: workflow.status.to_string(),
        final_result,
    })
}
