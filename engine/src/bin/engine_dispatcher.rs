use common::error::EmResult;
use engine::{build_registry, dispatcher::Dispatcher, store::PgStore};
use log::{error, info};

/// Standalone dispatcher process for operators who back the store with Postgres and want the
/// dispatcher scaled independently from the HTTP surface, mirroring the teacher's
/// `we_executor` binary (`bin/we_executor.rs`).
#[tokio::main]
async fn main() -> EmResult<()> {
    log4rs::init_file("engine/dispatcher_log.yml", Default::default())
        .unwrap_or_else(|error| eprintln!("failed to initialize logging: {error}"));

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| common::error::EmError::from("DATABASE_URL is not set"))?;
    info!("connecting to store");
    let store = PgStore::connect(&database_url)
        .await
        .map_err(|error| common::error::EmError::from(error.to_string()))?;
    let registry = build_registry();

    info!("starting dispatcher loop");
    let dispatcher = Dispatcher::new(&store, &registry);
    if let Err(error) = dispatcher.run().await {
        error!("dispatcher loop exited with an error: {error}");
    }

    info!("exiting dispatcher");
    Ok(())
}
