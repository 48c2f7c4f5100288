//! Test Helper Utilities
//!
//! Shared utilities for testing xiaoyu-ai: a scripted language model and
//! request/response shortcuts for driving the router with `oneshot`.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use tower::util::ServiceExt;
use xiaoyu_ai::llm::{LanguageModel, LlmError};
use xiaoyu_ai::AppState;
use xiaoyu_common::config::EmotionConfig;

/// One recorded `generate` call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system: String,
    pub prompt: String,
}

/// Language model double that answers by system-prompt substring
///
/// Calls run concurrently in the orchestrator, so responses are keyed on
/// the prompt content rather than call order. The first matching rule wins.
pub struct ScriptedModel {
    rules: Vec<(String, Result<String, LlmError>)>,
    fallback: Result<String, LlmError>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedModel {
    pub fn new(fallback: &str) -> Self {
        Self {
            rules: Vec::new(),
            fallback: Ok(fallback.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Model whose every call fails with `error`
    pub fn failing(error: LlmError) -> Self {
        Self {
            rules: Vec::new(),
            fallback: Err(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn respond_when(mut self, system_contains: &str, response: &str) -> Self {
        self.rules
            .push((system_contains.to_string(), Ok(response.to_string())));
        self
    }

    pub fn fail_when(mut self, system_contains: &str, error: LlmError) -> Self {
        self.rules.push((system_contains.to_string(), Err(error)));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            system: system.to_string(),
            prompt: prompt.to_string(),
        });

        self.rules
            .iter()
            .find(|(needle, _)| system.contains(needle.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| self.fallback.clone())
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Router with the given model (or none) and default emotion settings
pub fn create_test_app(llm: Option<Arc<ScriptedModel>>, development: bool) -> Router {
    let llm = llm.map(|model| model as Arc<dyn LanguageModel>);
    let state = AppState::new(&EmotionConfig::default(), llm, development);
    xiaoyu_ai::build_router(state)
}

/// Router plus its state, for tests that inspect shared state afterwards
pub fn create_test_app_with_state(
    llm: Option<Arc<ScriptedModel>>,
    emotion: &EmotionConfig,
) -> (Router, AppState) {
    let llm = llm.map(|model| model as Arc<dyn LanguageModel>);
    let state = AppState::new(emotion, llm, false);
    (xiaoyu_ai::build_router(state.clone()), state)
}

pub fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    post_raw(uri, &body.to_string())
}

pub fn post_raw(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// POST with the content type browsers use for `fetch` without headers
pub fn post_text(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "text/plain;charset=UTF-8")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Send one request and decode the JSON response
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}
