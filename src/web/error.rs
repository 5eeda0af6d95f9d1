//! JSON error responses
//!
//! Every failure leaves the API as `{"code": ..., "message": ...}` with the status
//! code matching its category. Database details are logged, never returned.

use crate::api_key::ApiKeyError;
use crate::authz::AuthzError;
use crate::store::StoreError;
use crate::validation::ToggleError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derive_more::Display;
use serde::Serialize;

#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "{}", _0)]
    Invalid(ToggleError),
    #[display(fmt = "{}", _0)]
    BadRequest(String),
    #[display(fmt = "{}", _0)]
    Unauthenticated(String),
    #[display(fmt = "Insufficient permissions")]
    Forbidden,
    #[display(fmt = "Feature toggle {} not found", _0)]
    NotFound(i32),
    #[display(fmt = "Feature key '{}' already exists", _0)]
    Conflict(String),
    #[display(fmt = "Internal server error")]
    Internal,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    /// Stable machine readable code
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Invalid(ToggleError::InvalidKey(_)) => "invalid_key",
            ApiError::Invalid(ToggleError::InvalidName) => "invalid_name",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthenticated(_) => "unauthenticated",
            ApiError::Forbidden => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Internal => "internal",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Invalid(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            code: self.code(),
            message: self.to_string(),
        })
    }
}

impl From<ToggleError> for ApiError {
    fn from(e: ToggleError) -> Self {
        ApiError::Invalid(e)
    }
}

impl From<AuthzError> for ApiError {
    fn from(e: AuthzError) -> Self {
        match e {
            AuthzError::Unauthenticated => ApiError::Unauthenticated(e.to_string()),
            AuthzError::Forbidden => ApiError::Forbidden,
        }
    }
}

impl From<ApiKeyError> for ApiError {
    fn from(e: ApiKeyError) -> Self {
        ApiError::Unauthenticated(e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Invalid(e) => ApiError::Invalid(e),
            StoreError::NotFound(id) => ApiError::NotFound(id),
            StoreError::Conflict(key) => ApiError::Conflict(key),
            StoreError::Database(e) => {
                log::error!("Feature toggle storage error: {}", e);
                ApiError::Internal
            }
        }
    }
}
