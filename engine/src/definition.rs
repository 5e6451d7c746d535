use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// One step of a declarative [`WorkflowDefinition`]: the task type to invoke, its intended
/// ordering, and an optional dependency on another step's output. Mirrors the YAML shape of
/// §6 of the spec this crate implements.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDefinition {
    pub task_type: String,
    pub step_number: u32,
    #[serde(default)]
    pub depends_on: Option<u32>,
}

/// A named, declarative workflow template: an ordered list of steps with task types, step
/// numbers, and inter-step dependencies. Loaded from a YAML file by [`load_definition`];
/// validated (but not yet persisted) by [`crate::factory::WorkflowFactory`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub name: String,
    pub steps: Vec<StepDefinition>,
}

/// Directory searched for workflow-definition YAML files. Overridable via the
/// `WORKFLOW_DEFINITIONS_DIR` environment variable; defaults to `./workflows` relative to the
/// process's current working directory.
pub fn definitions_dir() -> PathBuf {
    std::env::var("WORKFLOW_DEFINITIONS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("workflows"))
}

/// Loads and parses the workflow definition named `name` (without extension) from
/// [`definitions_dir`]. The file is expected at `<definitions_dir>/<name>.yaml` (or `.yml`).
/// `name` must be a single path component (no `/` or `..`) so a client-supplied
/// `workflowName` can't escape the definitions directory.
pub async fn load_definition(name: &str) -> EngineResult<WorkflowDefinition> {
    if name.is_empty() || name.contains(['/', '\\']) || name == ".." {
        return Err(EngineError::InvalidWorkflow(format!(
            "invalid workflow name: {name}"
        )));
    }
    let dir = definitions_dir();
    let yaml_path = dir.join(format!("{name}.yaml"));
    let yml_path = dir.join(format!("{name}.yml"));
    let path = if tokio::fs::try_exists(&yaml_path).await.unwrap_or(false) {
        yaml_path
    } else {
        yml_path
    };
    let contents = common::read_file(&path).await?;
    let definition: WorkflowDefinition = serde_yaml::from_str(&contents)?;
    Ok(definition)
}
