use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
    response::Response,
};
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;
use crate::relay::Service;
use crate::routes::{AppState, cookie_header, relayed};

#[derive(Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_size() -> u32 {
    10
}

/// GET /api/symbols - paginated ticker symbol listing
pub async fn list(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let path = format!(
        "/symbol/all?page={}&size={}",
        pagination.page, pagination.size
    );
    let outcome = state
        .api
        .relay(
            Service::Py,
            Method::GET,
            &path,
            cookie_header(&headers),
            None,
        )
        .await?;
    Ok(relayed(outcome))
}

/// POST /api/symbols - add a ticker symbol
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Response, AppError> {
    let outcome = state
        .api
        .relay(
            Service::Py,
            Method::POST,
            "/symbol/add",
            cookie_header(&headers),
            Some(&body),
        )
        .await?;
    Ok(relayed(outcome))
}

/// DELETE /api/symbols - remove a ticker symbol (id in the body, as the
/// backend expects)
pub async fn remove(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Response, AppError> {
    let outcome = state
        .api
        .relay(
            Service::Py,
            Method::DELETE,
            "/symbol/delete",
            cookie_header(&headers),
            Some(&body),
        )
        .await?;
    Ok(relayed(outcome))
}
