use std::sync::Arc;

use common::error::EmResult;
use engine::{api::build_api, build_registry, dispatcher::Dispatcher, store::InMemoryStore};
use log::info;

/// Combined single-process binary: spawns the dispatcher loop as a background task and serves
/// the HTTP adapter from the same process, against the same `Arc<dyn EntityStore>`. The natural
/// realization of this engine's Non-goal ("distributed execution across multiple runner
/// processes") as a positive architectural choice — see §11 of the spec this crate implements.
#[rocket::main]
async fn main() -> EmResult<()> {
    log4rs::init_file("engine/server_log.yml", Default::default())
        .unwrap_or_else(|error| eprintln!("failed to initialize logging: {error}"));

    let store: Arc<dyn engine::store::EntityStore> = Arc::new(InMemoryStore::new());
    let registry = Arc::new(build_registry());

    let dispatcher_store = store.clone();
    let dispatcher_registry = registry.clone();
    tokio::spawn(async move {
        let dispatcher = Dispatcher::new(dispatcher_store.as_ref(), dispatcher_registry.as_ref());
        info!("starting dispatcher loop");
        if let Err(error) = dispatcher.run().await {
            log::error!("dispatcher loop exited with an error: {error}");
        }
    });

    info!("starting HTTP adapter on port 8000");
    if let Err(error) = build_api(store, registry).launch().await {
        log::error!("HTTP adapter exited with an error: {error}");
    }
    Ok(())
}
