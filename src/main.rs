use std::sync::Arc;

use coviscope::{logging, server, DatasetCache, ServerConfig, Store};

fn main() -> coviscope::Result<()> {
    let config = ServerConfig::from_env()?;
    logging::init_logging();

    let store = match &config.database {
        Some(path) => Store::open(path)?,
        None => Store::open_in_memory()?,
    };
    store.ensure_schema()?;

    // Runs before the async runtime starts; the download client is blocking.
    if config.bootstrap {
        let mut cache =
            DatasetCache::new(Some(config.cache_dir.clone()), config.offline, config.timeout)?;
        let rows = coviscope::bootstrap(&store, &mut cache)?;
        if rows == 0 {
            tracing::info!("store already populated; skipping dataset import");
        }
    }

    let app = server::router(Arc::new(store));

    tokio::runtime::Runtime::new()?.block_on(server::serve(config.addr, app))
}
