use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use model_view_service::{
    AppCatalog, AppConfig, HttpModelSource, Loader, ModelStore, build_router,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env()?;

    let catalog = match config.catalog_path.as_ref() {
        Some(path) => AppCatalog::load_from_path(path)?,
        None => AppCatalog::new(),
    };
    tracing::info!(records = catalog.len(), "application catalog ready");

    let store = ModelStore::new();
    let source = Arc::new(HttpModelSource::new(config.api_base_url.clone()));
    let loader = Arc::new(Loader::new(source, store));
    let router = build_router(loader, Arc::new(catalog));

    let listener = TcpListener::bind(config.listen_addr).await?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, api_base_url = %config.api_base_url, "execute view server ready");

    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,hyper=warn,axum::rejection=trace".into());
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
