use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ResolveError;
use crate::forecast_resolver::ForecastResolver;
use crate::models::{ForecastRecord, Suggestion};

#[derive(Debug, Deserialize)]
pub struct AddressParams {
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

/// Error body returned by every endpoint
#[derive(Debug)]
pub enum ApiError {
    BlankAddress,
    Resolve(ResolveError),
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        ApiError::Resolve(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BlankAddress => (
                StatusCode::BAD_REQUEST,
                "Please enter a valid address".to_string(),
            ),
            ApiError::Resolve(err) => {
                let status = match err {
                    ResolveError::LocationNotFound => StatusCode::NOT_FOUND,
                    ResolveError::ForecastUnavailable => StatusCode::BAD_GATEWAY,
                    ResolveError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub fn router(resolver: ForecastResolver) -> Router {
    Router::new()
        .route("/forecast", get(get_forecast))
        .route("/autocomplete", get(autocomplete))
        .route("/cache", axum::routing::delete(clear_cache))
        .route("/health", get(health))
        .with_state(resolver)
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

async fn get_forecast(
    State(resolver): State<ForecastResolver>,
    Query(params): Query<AddressParams>,
) -> Result<Json<ForecastRecord>, ApiError> {
    let address = present(params.address).ok_or(ApiError::BlankAddress)?;
    let record = resolver.resolve(&address).await?;
    Ok(Json(record))
}

async fn autocomplete(
    State(resolver): State<ForecastResolver>,
    Query(params): Query<SuggestParams>,
) -> Json<Vec<Suggestion>> {
    let query = params.q.unwrap_or_default();
    Json(resolver.suggest(&query).await)
}

async fn clear_cache(
    State(resolver): State<ForecastResolver>,
    Query(params): Query<AddressParams>,
) -> Result<Json<MessageBody>, ApiError> {
    let message = match present(params.address) {
        Some(address) => {
            resolver.invalidate(&address).await?;
            format!("Cache cleared for {address}")
        }
        None => {
            resolver.clear_all().await?;
            "All weather cache cleared".to_string()
        }
    };
    Ok(Json(MessageBody { message }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": crate::VERSION }))
}
