use axum::Router;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

use crate::api;
use crate::config::ServerConfig;
use crate::predictor::SharedPredictor;

/// The full application: API routes under `/api`, open CORS.
pub fn app(predictor: SharedPredictor) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api::router(predictor))
        .layer(cors)
}

pub async fn run(
    config: &ServerConfig,
    predictor: SharedPredictor,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Web server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app(predictor))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}
