//! Query server for territory lookups.
//!
//! Provides an HTTP API resolving a point to its substation zone, feeder,
//! service hut, grid and directional neighbor grids.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use clap::Parser;
use geo::Coord;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use gridfinder::config::Config;
use gridfinder::models::{checked_position, AssignmentResult, Neighbors};
use gridfinder::spatial::haversine_miles;
use gridfinder::{LayerRole, LayerSet};

mod state;
use state::AppState;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "query")]
#[command(about = "Territory lookup query server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    listen: String,

    /// Configuration file
    #[arg(short, long, default_value = "gridfinder.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Gridfinder Query Server");
    info!("Loading configuration from {}", args.config.display());

    let config = Config::load_from_file(&args.config)?;
    let layers = config.load_layers().context("Failed to load layers")?;
    let state = Arc::new(AppState::new(config, layers));

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/resolve", get(resolve_handler))
        .route("/v1/neighbors", get(neighbors_handler))
        .route("/v1/distance", get(distance_handler))
        .route("/v1/reload", post(reload_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", args.listen);

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn internal_error(context: &str, e: anyhow::Error) -> (StatusCode, String) {
    tracing::error!("{}: {:#}", context, e);
    (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e))
}

fn query_point(lon: f64, lat: f64) -> Result<Coord<f64>, (StatusCode, String)> {
    checked_position(lon, lat).map_err(|e| (StatusCode::BAD_REQUEST, e))
}

/// Health check endpoint
async fn health_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, (StatusCode, String)> {
    let layers = state
        .layers()
        .map_err(|e| internal_error("Health check failed", e))?;

    Ok(Json(HealthResponse::new("ok", &state, &layers)))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    layers: BTreeMap<LayerRole, usize>,
    feeder_tolerance_miles: f64,
    nearby_grid_count: usize,
}

impl HealthResponse {
    fn new(status: &'static str, state: &AppState, layers: &LayerSet) -> Self {
        let options = state.resolver().options();
        Self {
            status,
            layers: layers.counts().into_iter().collect(),
            feeder_tolerance_miles: options.feeder_tolerance_miles,
            nearby_grid_count: options.nearby_grid_count,
        }
    }
}

/// Full assignment for a point
async fn resolve_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PointQueryParams>,
) -> Result<Json<AssignmentResult>, (StatusCode, String)> {
    let point = query_point(params.lon, params.lat)?;
    let layers = state
        .layers()
        .map_err(|e| internal_error("Resolve failed", e))?;

    Ok(Json(state.resolver().resolve(point, &layers)))
}

/// Directional neighbor grids only
async fn neighbors_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PointQueryParams>,
) -> Result<Json<Neighbors>, (StatusCode, String)> {
    let point = query_point(params.lon, params.lat)?;
    let layers = state
        .layers()
        .map_err(|e| internal_error("Neighbor lookup failed", e))?;

    Ok(Json(state.resolver().neighbors(point, &layers)))
}

/// Great-circle distance between two points
async fn distance_handler(
    Query(params): Query<DistanceQueryParams>,
) -> Result<Json<DistanceResponse>, (StatusCode, String)> {
    let from = parse_lon_lat(&params.from)?;
    let to = parse_lon_lat(&params.to)?;

    Ok(Json(DistanceResponse {
        distance_miles: haversine_miles(from, to),
    }))
}

/// Re-read all layers from disk
async fn reload_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, (StatusCode, String)> {
    let layers = state
        .reload()
        .await
        .map_err(|e| internal_error("Layer reload failed", e))?;

    Ok(Json(HealthResponse::new("reloaded", &state, &layers)))
}

#[derive(Deserialize)]
struct PointQueryParams {
    /// Point longitude
    lon: f64,
    /// Point latitude
    lat: f64,
}

#[derive(Deserialize)]
struct DistanceQueryParams {
    /// "lon,lat"
    from: String,
    /// "lon,lat"
    to: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DistanceResponse {
    distance_miles: f64,
}

/// Parse "lon,lat"
fn parse_lon_lat(value: &str) -> Result<Coord<f64>, (StatusCode, String)> {
    let parts: Vec<f64> = value
        .split(',')
        .filter_map(|p| p.trim().parse().ok())
        .collect();
    match parts.as_slice() {
        [lon, lat] => query_point(*lon, *lat),
        _ => Err((
            StatusCode::BAD_REQUEST,
            format!("expected \"lon,lat\", got {:?}", value),
        )),
    }
}
