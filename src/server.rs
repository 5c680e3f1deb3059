use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

use crate::asset_cache::AssetCache;
use crate::catalog::MapCatalog;
use crate::compositor::{Compositor, CONTENT_TYPE};
use crate::config::Config;
use crate::error::{RenderError, ValidationError};
use crate::models::RenderRequest;
use crate::validate::validate;

const CACHE_CONTROL: &str = "public, max-age=86400";

pub struct AppState {
    pub catalog: MapCatalog,
    pub compositor: Compositor,
    render_permits: Arc<Semaphore>,
    render_timeout: Duration,
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let catalog = match &config.catalog_path {
            Some(path) => MapCatalog::load(path)?,
            None => MapCatalog::builtin()?,
        };
        let assets = AssetCache::new(config.content_root(), config.cache_size_mb());

        Ok(Self::with_parts(
            catalog,
            Compositor::new(assets),
            config.max_concurrent_renders(),
            config.render_timeout(),
        ))
    }

    pub fn with_parts(
        catalog: MapCatalog,
        compositor: Compositor,
        max_concurrent_renders: usize,
        render_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            compositor,
            render_permits: Arc::new(Semaphore::new(max_concurrent_renders)),
            render_timeout,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(get_map_image))
        .route("/maps", get(list_maps))
        .route("/maps/{map}/strongpoints", get(list_map_strongpoints))
        .route("/strongpoints", get(list_all_strongpoints))
        .layer(middleware::from_fn(log_request_response))
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn log_request_response(
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    let method = req.method().to_string();
    info!("incoming request: {} {}", method, path);
    let response = next.run(req).await;
    info!("request result: {} for {} {}", response.status(), method, path);
    response
}

// --- Handlers ---

async fn get_map_image(
    State(state): State<Arc<AppState>>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Response {
    let params = match query {
        Ok(Query(params)) => params,
        Err(rejection) => {
            return validation_failure(vec![ValidationError::new("query", rejection.body_text())])
        }
    };
    let request = match validate(&state.catalog, &params) {
        Ok(request) => request,
        Err(errors) => return validation_failure(errors),
    };

    match render(state, request).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, CONTENT_TYPE),
                (header::CACHE_CONTROL, CACHE_CONTROL),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            error!("map render error: {}", e);
            (e.status(), Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

async fn list_maps(State(state): State<Arc<AppState>>) -> Response {
    Json(state.catalog.list_maps()).into_response()
}

async fn list_all_strongpoints(State(state): State<Arc<AppState>>) -> Response {
    let index: BTreeMap<&str, Vec<&str>> = state.catalog.strongpoint_index().into_iter().collect();
    Json(index).into_response()
}

async fn list_map_strongpoints(
    State(state): State<Arc<AppState>>,
    Path(map): Path<String>,
) -> Response {
    match state.catalog.list_strongpoints(&map) {
        Some(points) => Json(points).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("Invalid map '{}'. Should be one of: {}", map, state.catalog.list_maps().join(", "))
            })),
        )
            .into_response(),
    }
}

fn validation_failure(errors: Vec<ValidationError>) -> Response {
    debug!("rejected request with {} validation error(s)", errors.len());
    (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
}

// --- Core Logic ---

/// Runs the compositor off the async workers, bounded in concurrency and time.
///
/// The permit moves into the blocking task, so a render that outlives the
/// timeout keeps its slot until the work actually finishes.
async fn render(state: Arc<AppState>, request: RenderRequest) -> Result<Vec<u8>, RenderError> {
    let limit = state.render_timeout;
    let work = async {
        // The semaphore is never closed; acquisition only ever waits.
        let permit = state
            .render_permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| RenderError::TimedOut(limit))?;
        let state_clone = state.clone();
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            state_clone.compositor.render(&request)
        })
        .await?
    };

    match tokio::time::timeout(limit, work).await {
        Ok(result) => result,
        Err(_) => Err(RenderError::TimedOut(limit)),
    }
}
