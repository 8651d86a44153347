//! Response envelope and error mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::PlannerError;

/// API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// A request-scoped failure; only the user message leaves the process
#[derive(Debug)]
pub struct ApiError(pub PlannerError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            PlannerError::Conflict { .. } => StatusCode::CONFLICT,
            PlannerError::NotFound { .. } => StatusCode::NOT_FOUND,
            PlannerError::Validation { .. } => StatusCode::BAD_REQUEST,
            PlannerError::Config { .. }
            | PlannerError::Storage { .. }
            | PlannerError::Execution { .. }
            | PlannerError::TimerIntegrity { .. }
            | PlannerError::Other { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PlannerError> for ApiError {
    fn from(err: PlannerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self.0.developer_message());
        } else {
            debug!("Request rejected ({}): {}", status, self.0);
        }
        let body = ApiResponse::<()>::error(self.0.user_message());
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}
