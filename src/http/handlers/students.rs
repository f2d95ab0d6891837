use super::get_required;
use crate::deadline::Deadline;
use crate::http::error::ApiResult;
use crate::http::extract::{ApiJson, ApiQuery};
use crate::http::types::AppState;
use crate::model::Student;
use crate::roster::{self, NewStudent};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

pub fn routes() -> Router<AppState> {
    Router::new().route("/students", get(list_students).post(create_student))
}

#[derive(Debug, Deserialize)]
struct StudentsQuery {
    batch: Option<String>,
}

async fn list_students(
    State(state): State<AppState>,
    deadline: Deadline,
    ApiQuery(q): ApiQuery<StudentsQuery>,
) -> ApiResult<Json<Vec<Student>>> {
    // An empty `batch` parameter means no filter.
    let batch = get_required(q.batch, "batch").ok();
    let students = state
        .with_conn(deadline, move |conn| roster::list_students(conn, batch.as_deref()))
        .await?;
    Ok(Json(students))
}

async fn create_student(
    State(state): State<AppState>,
    deadline: Deadline,
    ApiJson(body): ApiJson<NewStudent>,
) -> ApiResult<(StatusCode, Json<Student>)> {
    let student = state
        .with_conn(deadline, move |conn| roster::create_student(conn, body))
        .await?;
    Ok((StatusCode::CREATED, Json(student)))
}
