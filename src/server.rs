use crate::config::AppConfig;
use crate::mapping::IconAliases;
use crate::store::{ShapeCache, ShapeSource};
use crate::types::ShapeIcon;
use anyhow::Result;
use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

pub struct AppState {
    pub shapes: ShapeCache,
    pub aliases: IconAliases,
}

pub async fn start_server(config: AppConfig) -> Result<()> {
    let state = Arc::new(AppState {
        shapes: ShapeCache::new(ShapeSource::File(config.output.cleaned.clone())),
        aliases: IconAliases::new(config.icons.aliases.clone()),
    });

    let port = config.server.port;
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    println!("Starting server on http://{}", addr);

    // The cleaned document is served as-is; the map UI fetches it whole.
    let data_dir = config.output.cleaned.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."))
        .to_path_buf();

    let app = Router::new()
        .route("/api/shapes/:slug", get(shape_handler))
        .nest_service("/data", ServeDir::new(data_dir))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn shape_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Json<Option<ShapeIcon>> {
    Json(state.shapes.icon(&slug, &state.aliases).await)
}
