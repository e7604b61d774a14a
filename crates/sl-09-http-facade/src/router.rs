//! Router assembly and the listener loop.

use crate::config::FacadeConfig;
use crate::errors::FacadeError;
use crate::handlers;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post, put};
use axum::Router;
use sl_08_lab_ledger::LedgerConnector;
use std::future::Future;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::map_response_body::MapResponseBodyLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub connector: Arc<LedgerConnector>,
}

impl AppState {
    pub fn new(connector: LedgerConnector) -> Self {
        Self {
            connector: Arc::new(connector),
        }
    }
}

/// All routes with tracing, permissive CORS and the body size limit.
pub fn build_router(state: AppState, config: &FacadeConfig) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(MapResponseBodyLayer::new(axum::body::Body::new))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.body_limit_bytes));

    Router::new()
        .route("/health", get(handlers::health))
        // Store
        .route("/store/test", post(handlers::store_test))
        .route("/store/image", post(handlers::store_image))
        .route("/store/model", post(handlers::store_model))
        .route("/store/planilha", post(handlers::store_planilha))
        // Query
        .route("/query/test/id/:testID", get(handlers::query_test_by_id))
        .route("/query/test/lote/:lote", get(handlers::query_tests_by_lote))
        .route("/query/image/hash/:imageHash", get(handlers::query_image_by_hash))
        .route("/query/image/kit/:kitID", get(handlers::query_images_by_kit))
        .route("/query/planilha/hash/:planilhaHash", get(handlers::query_planilha_by_hash))
        .route("/query/planilha/lote/:lote", get(handlers::query_planilhas_by_lote))
        // Update
        .route("/update/test", put(handlers::update_test))
        .route("/update/test/field", patch(handlers::edit_test_field))
        // Legacy
        .route("/query/test", post(handlers::legacy_query_test))
        .route("/query/image", post(handlers::legacy_query_image))
        .layer(middleware)
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn serve<S>(config: FacadeConfig, state: AppState, shutdown: S) -> Result<(), FacadeError>
where
    S: Future<Output = ()> + Send + 'static,
{
    config.validate().map_err(FacadeError::Config)?;

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .map_err(|source| FacadeError::Bind {
            addr: config.listen_addr,
            source,
        })?;
    info!(addr = %config.listen_addr, body_limit = config.body_limit_bytes, "HTTP facade listening");

    axum::serve(listener, build_router(state, &config))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(FacadeError::Serve)?;

    info!("HTTP facade stopped");
    Ok(())
}
