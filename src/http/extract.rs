//! Extractors whose rejections use the shared error envelope.

use super::error::ApiError;
use super::types::AppState;
use crate::deadline::Deadline;
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::request::Parts;
use std::convert::Infallible;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Deadline stamped by the router middleware. Handlers mounted without it
/// get a fresh one from the configured timeout.
impl FromRequestParts<AppState> for Deadline {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Deadline>()
            .copied()
            .unwrap_or_else(|| Deadline::after(state.request_timeout)))
    }
}
