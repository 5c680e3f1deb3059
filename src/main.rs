use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use tacmap::config::Config;
use tacmap::server::{self, AppState};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    let config = Config::load()?;
    let thread_count = config.thread_count();

    info!("starting server with {} threads", thread_count);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(thread_count)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

async fn async_main(config: Config) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(&config)?);
    info!(
        "loaded {} maps, serving assets from {}",
        state.catalog.list_maps().len(),
        state.compositor.assets().content_root().display()
    );

    let listener = TcpListener::bind(config.listen_addr()).await?;
    server::serve(state, listener).await
}
