//! Error types for xiaoyu-ai
//!
//! Every failure reaches the client as `{ "error": <message>, "details"?: <text> }`
//! with a user-facing Chinese message. `details` carries the internal error
//! text and is only filled in development mode.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::llm::LlmError;

/// Message returned when the orchestrator has no language model configured
pub const NOT_CONFIGURED_MESSAGE: &str = "服务配置错误，请检查 API 密钥";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// No language model configured (500)
    #[error("Language model not configured")]
    NotConfigured,

    /// Language model call failed (401/408/429/500 by cause)
    #[error("Language model error: {source}")]
    Llm {
        source: LlmError,
        details: Option<String>,
    },

    /// Internal server error (500) with a user-facing message
    #[error("Internal server error: {message}")]
    Internal {
        message: String,
        details: Option<String>,
    },
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Status and user-facing message for a language model failure
pub fn llm_status(error: &LlmError) -> (StatusCode, &'static str) {
    match error {
        LlmError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "API密钥配置错误，请检查环境变量"),
        LlmError::RateLimited(_) => (StatusCode::TOO_MANY_REQUESTS, "请求过于频繁，请稍后再试"),
        LlmError::Timeout(_) => (StatusCode::REQUEST_TIMEOUT, "请求超时，请重试"),
        LlmError::InvalidResponse(_) | LlmError::Upstream(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "AI协同响应失败，请稍后重试")
        }
    }
}

impl ApiError {
    pub fn internal(message: impl Into<String>, details: Option<String>) -> Self {
        ApiError::Internal {
            message: message.into(),
            details,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Llm { source, .. } => llm_status(source).0,
            ApiError::NotConfigured | ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::BadRequest(message) => ErrorBody {
                error: message,
                details: None,
            },
            ApiError::NotConfigured => ErrorBody {
                error: NOT_CONFIGURED_MESSAGE.to_string(),
                details: None,
            },
            ApiError::Llm { source, details } => ErrorBody {
                error: llm_status(&source).1.to_string(),
                details,
            },
            ApiError::Internal { message, details } => ErrorBody {
                error: message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_status_mapping() {
        let cases = [
            (LlmError::Unauthorized("x".into()), 401),
            (LlmError::RateLimited("x".into()), 429),
            (LlmError::Timeout("x".into()), 408),
            (LlmError::Upstream("x".into()), 500),
            (LlmError::InvalidResponse("x".into()), 500),
        ];
        for (error, status) in cases {
            let api = ApiError::Llm {
                source: error,
                details: None,
            };
            assert_eq!(api.status().as_u16(), status);
        }
    }

    #[test]
    fn test_error_body_omits_empty_details() {
        let body = ErrorBody {
            error: "消息内容不能为空".to_string(),
            details: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "消息内容不能为空" }));
    }

    #[test]
    fn test_bad_request_status() {
        let response = ApiError::BadRequest("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let response = ApiError::NotConfigured.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
