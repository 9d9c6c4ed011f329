use anyhow::Context;
use osb_core::{Broker, Catalog, InMemoryBroker};
use osb_gate::{log::TracingErrorLog, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let level = osb_config::LOG_LEVEL.parse().unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();

    let catalog = match osb_config::CATALOG_PATH.as_deref() {
        Some(path) => Catalog::from_path(path)
            .with_context(|| format!("loading catalog from {path}"))?,
        None => Catalog::demo(),
    };
    let broker = InMemoryBroker::new(catalog, *osb_config::INSTANCE_LIMIT)
        .with_dashboard_base_url(osb_config::DASHBOARD_BASE_URL.as_str())
        .with_credentials_endpoint(
            osb_config::CREDENTIALS_HOST.as_str(),
            *osb_config::CREDENTIALS_PORT,
        );
    info!(
        services = broker.catalog().services.len(),
        instance_limit = broker.instance_limit(),
        "in-memory broker ready"
    );

    let state = AppState::new(Arc::new(broker), Arc::new(TracingErrorLog));
    let app = osb_gate::app(state);
    let listener = TcpListener::bind(osb_config::BIND_ADDR.as_str()).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
