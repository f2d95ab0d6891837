use super::{get_optional_date, get_required, get_required_date, get_required_number};
use crate::calc::StatusCounts;
use crate::deadline::Deadline;
use crate::http::error::ApiResult;
use crate::http::extract::{ApiPath, ApiQuery};
use crate::http::types::AppState;
use crate::reports::{self, DateRange, DefaulterEntry, DefaulterQuery, Overview, StudentReport};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/student/{id}", get(student_report))
        .route("/reports/batch-summary", get(batch_summary))
        .route("/reports/defaulters", get(defaulters))
        .route("/reports/overview", get(overview))
}

#[derive(Debug, Deserialize)]
struct RangeQuery {
    from: Option<String>,
    to: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SummaryQuery {
    batch: Option<String>,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DefaultersQuery {
    batch: Option<String>,
    month: Option<String>,
    year: Option<String>,
    threshold: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OverviewQuery {
    date: Option<String>,
}

async fn student_report(
    State(state): State<AppState>,
    deadline: Deadline,
    ApiPath(id): ApiPath<String>,
    ApiQuery(q): ApiQuery<RangeQuery>,
) -> ApiResult<Json<StudentReport>> {
    let range = DateRange {
        from: get_optional_date(q.from, "from")?,
        to: get_optional_date(q.to, "to")?,
    };
    let report = state
        .with_conn(deadline, move |conn| reports::student_report(conn, &id, range))
        .await?;
    Ok(Json(report))
}

async fn batch_summary(
    State(state): State<AppState>,
    deadline: Deadline,
    ApiQuery(q): ApiQuery<SummaryQuery>,
) -> ApiResult<Json<StatusCounts>> {
    let batch = get_required(q.batch, "batch")?;
    let date = get_required_date(q.date, "date")?;
    let counts = state
        .with_conn(deadline, move |conn| reports::batch_summary(conn, &batch, date))
        .await?;
    Ok(Json(counts))
}

async fn defaulters(
    State(state): State<AppState>,
    deadline: Deadline,
    ApiQuery(q): ApiQuery<DefaultersQuery>,
) -> ApiResult<Json<Vec<DefaulterEntry>>> {
    let batch = get_required(q.batch, "batch")?;
    let query = DefaulterQuery {
        month: get_required_number(q.month, "month")?,
        year: get_required_number(q.year, "year")?,
        threshold: get_required_number(q.threshold, "threshold")?,
    };
    let entries = state
        .with_conn(deadline, move |conn| reports::defaulters(conn, &batch, query))
        .await?;
    Ok(Json(entries))
}

async fn overview(
    State(state): State<AppState>,
    deadline: Deadline,
    ApiQuery(q): ApiQuery<OverviewQuery>,
) -> ApiResult<Json<Overview>> {
    let date = get_optional_date(q.date, "date")?
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let overview = state
        .with_conn(deadline, move |conn| reports::overview(conn, date))
        .await?;
    Ok(Json(overview))
}
