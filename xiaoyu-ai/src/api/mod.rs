//! HTTP API handlers for xiaoyu-ai
//!
//! All bodies are JSON with camelCase field names. The content type is not
//! checked: browsers posting with `text/plain` are accepted as well.

use axum::body::Bytes;
use serde::de::DeserializeOwned;

pub mod emotion;
pub mod enhanced_emotion;
pub mod health;
pub mod orchestrate;
pub mod roles;

pub use emotion::emotion_routes;
pub use enhanced_emotion::enhanced_emotion_routes;
pub use health::health_routes;
pub use orchestrate::orchestrate_routes;
pub use roles::role_routes;

/// Message returned when a required message is missing or blank
pub const EMPTY_MESSAGE: &str = "消息内容不能为空";

/// Message returned by role selection when the body is not valid JSON
pub const MALFORMED_BODY: &str = "请求格式错误";

/// Decode a JSON request body regardless of its declared content type
pub fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, serde_json::Error> {
    serde_json::from_slice(body)
}
