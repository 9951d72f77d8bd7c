use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{ControlChange, DashboardLayout, DashboardSummary, ViewUpdate},
};
use table::DatasetSource;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use views::{automobile_sales, launch_records, Catalog};

mod app_state;
mod config;
mod page;

use app_state::AppState;
use config::{load_settings, Settings};

const MAX_REQUEST_BYTES: usize = 64 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .init();

    let catalog = load_catalog(&settings).await?;
    let app = build_router(Arc::new(AppState { catalog }));

    let addr: SocketAddr = settings
        .server_bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.server_bind))?;
    info!(%addr, "dashboard server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Loads every dataset before the listener binds; any failure is fatal.
async fn load_catalog(settings: &Settings) -> anyhow::Result<Catalog> {
    let launches = DatasetSource::parse(&settings.launch_data)
        .load(launch_records::SCHEMA)
        .await
        .with_context(|| format!("failed to load launch records from {}", settings.launch_data))?;
    let sales = DatasetSource::parse(&settings.automobile_data)
        .load(automobile_sales::SCHEMA)
        .await
        .with_context(|| {
            format!(
                "failed to load automobile sales from {}",
                settings.automobile_data
            )
        })?;

    Ok(Catalog::new(vec![
        launch_records::dashboard(Arc::new(launches)),
        automobile_sales::dashboard(Arc::new(sales)),
    ]))
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/", get(index))
        .route("/dashboards/:dashboard_id", get(dashboard_page))
        .route("/api/dashboards", get(list_dashboards))
        .route("/api/dashboards/:dashboard_id", get(dashboard_layout))
        .route("/api/dashboards/:dashboard_id/update", post(update_view))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BYTES))
        .with_state(state)
}

fn reject(error: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match error.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
    };
    (status, Json(error))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(page::index_page(&state.catalog.summaries()))
}

async fn dashboard_page(
    State(state): State<Arc<AppState>>,
    Path(dashboard_id): Path<String>,
) -> Result<Html<String>, (StatusCode, Json<ApiError>)> {
    let dashboard = state.catalog.get(&dashboard_id).map_err(reject)?;
    Ok(Html(page::dashboard_page(&dashboard.summary())))
}

async fn list_dashboards(State(state): State<Arc<AppState>>) -> Json<Vec<DashboardSummary>> {
    Json(state.catalog.summaries())
}

async fn dashboard_layout(
    State(state): State<Arc<AppState>>,
    Path(dashboard_id): Path<String>,
) -> Result<Json<DashboardLayout>, (StatusCode, Json<ApiError>)> {
    let dashboard = state.catalog.get(&dashboard_id).map_err(reject)?;
    Ok(Json(dashboard.layout()))
}

async fn update_view(
    State(state): State<Arc<AppState>>,
    Path(dashboard_id): Path<String>,
    Json(change): Json<ControlChange>,
) -> Result<Json<ViewUpdate>, (StatusCode, Json<ApiError>)> {
    let dashboard = state.catalog.get(&dashboard_id).map_err(reject)?;
    let update = dashboard.on_change(&change).map_err(|error| {
        debug!(%dashboard_id, %error, "rejected control change");
        reject(error)
    })?;
    Ok(Json(update))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
