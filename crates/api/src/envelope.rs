#![forbid(unsafe_code)]

use crate::support::now_rfc3339;
use fb_storage::StoreError;
use serde_json::{Value, json};

/// Client/server error surfaced through the envelope. `status` is a
/// transport hint (the external HTTP collaborator maps it 1:1).
#[derive(Clone, Debug)]
pub struct ApiError {
    pub code: &'static str,
    pub status: u16,
    pub message: String,
}

impl ApiError {
    pub fn from_store(err: StoreError) -> Self {
        let status = match &err {
            StoreError::InvalidInput(message) if message.starts_with("RESET_REQUIRED") => 500,
            StoreError::InvalidInput(_) => 400,
            StoreError::RecipeNotFound | StoreError::ParentNotFound => 404,
            StoreError::RecipeHasForks => 409,
            StoreError::LineageCycle
            | StoreError::LineageDepthExceeded
            | StoreError::Io(_)
            | StoreError::Sql(_) => 500,
        };
        Self {
            code: err.code(),
            status,
            message: err.to_string(),
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    pub(crate) fn to_value(&self) -> Value {
        json!({
            "code": self.code,
            "status": self.status,
            "message": self.message,
        })
    }
}

#[derive(Clone, Debug)]
pub struct ApiResponse {
    data: Value,
    message: Option<&'static str>,
    error: Option<ApiError>,
}

impl ApiResponse {
    pub fn success(data: Value) -> Self {
        Self {
            data,
            message: None,
            error: None,
        }
    }

    pub fn failure(error: ApiError) -> Self {
        Self {
            data: Value::Null,
            message: None,
            error: Some(error),
        }
    }

    pub fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }

    pub fn into_value(self) -> Value {
        json!({
            "success": self.error.is_none(),
            "data": self.data,
            "message": self.message,
            "error": self.error.as_ref().map(ApiError::to_value).unwrap_or(Value::Null),
            "timestamp": now_rfc3339(),
        })
    }
}
