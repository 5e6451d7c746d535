use std::sync::Arc;

use common::error::EmResult;
use engine::{api::build_api, build_registry, store::PgStore};
use log::info;

/// Standalone HTTP-adapter process for operators who back the store with Postgres and want the
/// API surface scaled independently from the dispatcher, mirroring the teacher's
/// `we_api_server` binary (`bin/we_api_server.rs`).
#[rocket::main]
async fn main() -> EmResult<()> {
    log4rs::init_file("engine/api_server_log.yml", Default::default())
        .unwrap_or_else(|error| eprintln!("failed to initialize logging: {error}"));

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| common::error::EmError::from("DATABASE_URL is not set"))?;
    let store: Arc<dyn engine::store::EntityStore> = Arc::new(
        PgStore::connect(&database_url)
            .await
            .map_err(|error| common::error::EmError::from(error.to_string()))?,
    );
    let registry = Arc::new(build_registry());

    info!("starting HTTP adapter on port 8000");
    if let Err(error) = build_api(store, registry).launch().await {
        log::error!("HTTP adapter exited with an error: {error}");
    }
    Ok(())
}
