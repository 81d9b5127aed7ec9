//! Structured API error payloads: `{ "error": ..., "details": [...] }`.

use {
    axum::{
        Json,
        http::StatusCode,
        response::{IntoResponse, Response},
    },
    serde_json::json,
};

use {
    promptloop_engine::{GeneratorError, TargetError},
    promptloop_playbook::StoreError,
};

pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Vec<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: Vec::new(),
        }
    }

    pub fn with_details(status: StatusCode, error: impl Into<String>, details: Vec<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({ "error": self.error });
        if !self.details.is_empty() {
            body["details"] = json!(self.details);
        }
        (self.status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        let status = match e {
            StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            StoreError::InvalidName { .. } | StoreError::Reserved => StatusCode::BAD_REQUEST,
            StoreError::Io(_) | StoreError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

impl From<GeneratorError> for ApiError {
    fn from(e: GeneratorError) -> Self {
        let status = match &e {
            GeneratorError::AlreadyRunning | GeneratorError::NotRunning => StatusCode::CONFLICT,
            GeneratorError::Target(TargetError::PageNotFound { .. }) => StatusCode::NOT_FOUND,
            GeneratorError::Target(_) => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, e.to_string())
    }
}
