mod routes;

use std::sync::Arc;

use rocket::{routes, Build, Config, Rocket};

use crate::{registry::JobRegistry, store::EntityStore};

pub use routes::{AnalysisRequest, AnalysisResponse, ResultsResponse, StatusResponse};

/// Assembles the rocket HTTP adapter described by §6 of the spec this crate implements: the
/// three routes (`POST /analysis`, `GET /workflow/<id>/status`, `GET /workflow/<id>/results`),
/// managed state carrying the shared store and job registry. Grounded on the teacher's
/// `build_api()` (`workflow-engine/src/api/mod.rs`): the same
/// `rocket::build().manage(...).configure(...).mount(...)` assembly, trimmed to this crate's
/// three-route surface rather than the teacher's full workflow/job/executor CRUD.
pub fn build_api(store: Arc<dyn EntityStore>, registry: Arc<JobRegistry>) -> Rocket<Build> {
    let config = Config {
        port: 8000,
        ..Default::default()
    };
    rocket::build()
        .manage(store)
        .manage(registry)
        .configure(config)
        .mount(
            "/",
            routes![
                routes::submit_analysis,
                routes::workflow_status,
                routes::workflow_results,
            ],
        )
}
