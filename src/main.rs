use doc_assistant::api::{create_router, AppState};
use doc_assistant::infrastructure::{init_tracing, AppConfig, Services};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("api=debug,doc_assistant=debug,tower_http=debug");

    let config = AppConfig::load()?;
    let services = Services::from_config(&config).await?;
    info!(
        vector_store = ?config.config.vector_store.backend,
        session = ?config.config.session.backend,
        model = %config.config.llm.model,
        "services initialized"
    );

    // Optional document to load before accepting traffic.
    if let Some(path) = std::env::var_os("DOCUMENT_PATH").map(PathBuf::from) {
        let (doc, chunks) = services.documents.ingest_file(&path).await?;
        info!(document_id = %doc.id, chunks = chunks.len(), "initial document loaded");
    }

    let addr = SocketAddr::new(
        config.config.server.host.parse()?,
        config.config.server.port,
    );
    let app = create_router(AppState::new(services, config));

    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
