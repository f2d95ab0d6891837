use crate::deadline::Deadline;
use crate::http::error::ApiResult;
use crate::http::extract::ApiJson;
use crate::http::types::AppState;
use crate::model::Batch;
use crate::roster::{self, NewBatch};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

pub fn routes() -> Router<AppState> {
    Router::new().route("/batches", get(list_batches).post(create_batch))
}

async fn list_batches(State(state): State<AppState>, deadline: Deadline) -> ApiResult<Json<Vec<Batch>>> {
    let batches = state.with_conn(deadline, |conn| roster::list_batches(conn)).await?;
    Ok(Json(batches))
}

async fn create_batch(
    State(state): State<AppState>,
    deadline: Deadline,
    ApiJson(body): ApiJson<NewBatch>,
) -> ApiResult<(StatusCode, Json<Batch>)> {
    let batch = state
        .with_conn(deadline, move |conn| roster::create_batch(conn, body))
        .await?;
    Ok((StatusCode::CREATED, Json(batch)))
}
