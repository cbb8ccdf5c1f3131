pub mod handlers;
pub mod response;

use crate::config::cli::LocalStorage;
use crate::core::engine::MarksEngine;
use crate::core::export::Exporter;
use crate::core::store::InMemoryMarksStore;
use crate::core::ConfigProvider;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<MarksEngine<LocalStorage>>,
}

impl AppState {
    pub fn new(engine: MarksEngine<LocalStorage>) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// Fresh in-memory store with exports going to the configured directory.
    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        let storage = LocalStorage::new(config.downloads_dir());
        let exporter = Exporter::new(storage, config.keep_latest());
        Self::new(MarksEngine::new(Arc::new(InMemoryMarksStore::new()), exporter))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/update_marks", post(handlers::update_marks))
        .route("/api/voice_entry", post(handlers::voice_entry))
        .route("/api/get_marks", get(handlers::get_marks))
        .route("/api/download_excel", get(handlers::download_excel))
        .route("/api/download_csv", get(handlers::download_csv))
        .fallback(handlers::not_found)
        .with_state(state)
}

pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("🚀 Listening on http://{}", addr);
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
