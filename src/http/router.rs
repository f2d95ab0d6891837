use super::error::ApiError;
use super::handlers;
use super::types::AppState;
use crate::deadline::Deadline;
use crate::error::EngineError;
use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::time::Instant;
use tracing::debug;

/// All routes, unprefixed.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(handlers::core::routes())
        .merge(handlers::batches::routes())
        .merge(handlers::students::routes())
        .merge(handlers::attendance::routes())
        .merge(handlers::reports::routes())
        .fallback(unknown_route)
        .layer(middleware::from_fn_with_state(state.clone(), request_deadline))
        .with_state(state)
}

/// Routes nested under `base_path` ("" or "/" mounts at the root).
pub fn app(state: AppState, base_path: &str) -> Router {
    let base = base_path.trim_matches('/');
    if base.is_empty() {
        router(state)
    } else {
        Router::new().nest(&format!("/{}", base), router(state))
    }
}

async fn unknown_route(req: Request) -> ApiError {
    ApiError(EngineError::NotFound(format!(
        "unknown route: {} {}",
        req.method(),
        req.uri().path()
    )))
}

async fn request_deadline(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    req.extensions_mut().insert(Deadline::after(state.request_timeout));
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();
    let resp = match tokio::time::timeout(state.request_timeout, next.run(req)).await {
        Ok(resp) => resp,
        Err(_) => ApiError(EngineError::Unavailable(format!(
            "request timed out after {}s",
            state.request_timeout.as_secs_f64()
        )))
        .into_response(),
    };
    debug!(
        %method,
        %path,
        status = resp.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request finished"
    );
    resp
}
