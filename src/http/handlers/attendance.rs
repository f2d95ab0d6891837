use super::{get_required, get_required_date};
use crate::attendance::{self, BulkAck, BulkEntry, SheetRow};
use crate::deadline::Deadline;
use crate::http::error::ApiResult;
use crate::http::extract::{ApiJson, ApiQuery};
use crate::http::types::AppState;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/attendance", get(get_sheet))
        .route("/attendance/bulk", post(save_bulk))
}

#[derive(Debug, Deserialize)]
struct SheetQuery {
    batch: Option<String>,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BulkBody {
    batch: Option<String>,
    date: Option<String>,
    #[serde(default)]
    records: Vec<BulkEntry>,
}

async fn get_sheet(
    State(state): State<AppState>,
    deadline: Deadline,
    ApiQuery(q): ApiQuery<SheetQuery>,
) -> ApiResult<Json<Vec<SheetRow>>> {
    let batch = get_required(q.batch, "batch")?;
    let date = get_required_date(q.date, "date")?;
    let rows = state
        .with_conn(deadline, move |conn| attendance::sheet(conn, &batch, date))
        .await?;
    Ok(Json(rows))
}

async fn save_bulk(
    State(state): State<AppState>,
    deadline: Deadline,
    ApiJson(body): ApiJson<BulkBody>,
) -> ApiResult<Json<BulkAck>> {
    let batch = get_required(body.batch, "batch")?;
    let date = get_required_date(body.date, "date")?;
    let records = body.records;
    let ack = state
        .with_conn(deadline, move |conn| attendance::save_bulk(conn, &batch, date, records, deadline))
        .await?;
    Ok(Json(ack))
}
