// src/handlers.rs
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use http::StatusCode;
use serde_json::json;
use tracing::error;

use crate::gateway::{ContractGateway, GatewayError};
use crate::models::{
    AccountRequest, CreatePollRequest, CreatePollResponse, DraftReport, PollDraft, PollView,
    VoteRequest,
};
use crate::services::{self, ServiceError};
use crate::wallet::WalletProvider;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn ContractGateway>,
    pub wallet: Arc<dyn WalletProvider>,
}

pub struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ServiceError::NoSender => StatusCode::BAD_REQUEST,
            ServiceError::Draft(_) | ServiceError::ChoiceOutOfRange(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ServiceError::Gateway(GatewayError::UnknownApp(_)) => StatusCode::NOT_FOUND,
            ServiceError::Gateway(GatewayError::Rejected(_)) => StatusCode::CONFLICT,
            ServiceError::Gateway(GatewayError::Unavailable(_)) => StatusCode::BAD_GATEWAY,
        };
        if status.is_server_error() {
            error!(reason = %self.0, "gateway failure");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Create a poll from a draft; the whole create flow runs before replying.
pub async fn create_poll(
    State(state): State<AppState>,
    Json(request): Json<CreatePollRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let app_id = services::create_poll(state.gateway.as_ref(), state.wallet.as_ref(), request).await?;
    Ok((StatusCode::CREATED, Json(CreatePollResponse { app_id })))
}

/// Read a poll's state together with its display open/closed status.
pub async fn get_poll(
    State(state): State<AppState>,
    Path(app_id): Path<u64>,
) -> Result<Json<PollView>, ApiError> {
    let now = Utc::now().timestamp();
    let view = services::view_poll(state.gateway.as_ref(), app_id, now).await?;
    Ok(Json(view))
}

pub async fn join_poll(
    State(state): State<AppState>,
    Path(app_id): Path<u64>,
    Json(request): Json<AccountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    services::join_poll(state.gateway.as_ref(), state.wallet.as_ref(), app_id, request.sender)
        .await?;
    Ok(Json(json!({ "status": "opted in" })))
}

pub async fn leave_poll(
    State(state): State<AppState>,
    Path(app_id): Path<u64>,
    Json(request): Json<AccountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    services::leave_poll(state.gateway.as_ref(), state.wallet.as_ref(), app_id, request.sender)
        .await?;
    Ok(Json(json!({ "status": "opted out" })))
}

pub async fn submit_vote(
    State(state): State<AppState>,
    Path(app_id): Path<u64>,
    Json(request): Json<VoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    services::cast_vote(state.gateway.as_ref(), state.wallet.as_ref(), app_id, request).await?;
    Ok(Json(json!({ "status": "vote recorded" })))
}

pub async fn delete_poll(
    State(state): State<AppState>,
    Path(app_id): Path<u64>,
    Json(request): Json<AccountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    services::delete_poll(state.gateway.as_ref(), state.wallet.as_ref(), app_id, request.sender)
        .await?;
    Ok(Json(json!({ "status": "poll deleted" })))
}

/// Stateless draft validation for the poll form; drives inline messages and
/// input highlighting on every keystroke.
pub async fn validate_draft(Json(draft): Json<PollDraft>) -> Json<DraftReport> {
    Json(services::review_draft(&draft))
}
