//! POST /api/ai/enhanced-emotion - four-modality emotion fusion
//!
//! Missing behavioural fields fall back to defaults (attention 0.5,
//! activity "unknown", situation "home"), and age falls back to 1 year, so
//! the behavioural modality is always present.

use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, error};
use xiaoyu_common::time;

use crate::emotion::enhanced::{
    AudioFeatures, AudioInput, BehavioralInput, BodyLanguageFeatures, FacialFeatures,
    FusionContext, VideoInput,
};
use crate::emotion::{
    caregiver_suggestions, EmotionFeatures, EmotionTrends, MultimodalInput, DEFAULT_SESSION,
};
use super::parse_body;
use crate::{ApiError, ApiResult, AppState};

const FAILURE_MESSAGE: &str = "增强情感分析失败，请稍后重试";

const DEFAULT_ATTENTION: f64 = 0.5;
const DEFAULT_AGE: f64 = 1.0;
const DEFAULT_AUDIO_DURATION: f64 = 1.0;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    pub age: Option<f64>,
    pub environment: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedEmotionRequest {
    pub text: Option<String>,
    pub audio_features: Option<AudioFeatures>,
    pub facial_features: Option<FacialFeatures>,
    pub body_language: Option<BodyLanguageFeatures>,
    pub attention: Option<f64>,
    pub activity: Option<String>,
    pub situation: Option<String>,
    pub audio_duration: Option<f64>,
    pub context: Option<RequestContext>,
    /// History to smooth against; "default" when absent
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedEmotionResponse {
    pub emotion: EmotionFeatures,
    pub trends: EmotionTrends,
    pub suggestions: Vec<String>,
    /// Milliseconds spent on the request
    pub processing_time: u64,
    /// Unix epoch milliseconds
    pub timestamp: i64,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Normalise a request into the fusion input, applying route defaults
pub fn build_input(request: &EnhancedEmotionRequest) -> MultimodalInput {
    let attention = request
        .attention
        .filter(|a| *a != 0.0)
        .unwrap_or(DEFAULT_ATTENTION);

    let audio = request.audio_features.clone().map(|features| AudioInput {
        features,
        duration: request
            .audio_duration
            .filter(|d| *d != 0.0)
            .unwrap_or(DEFAULT_AUDIO_DURATION),
    });

    let video = if request.facial_features.is_some() || request.body_language.is_some() {
        Some(VideoInput {
            facial: request.facial_features.clone().unwrap_or_default(),
            body: request.body_language.clone().unwrap_or_default(),
        })
    } else {
        None
    };

    let context = request.context.as_ref();

    MultimodalInput {
        text: non_empty(request.text.clone()),
        audio,
        video,
        behavioral: Some(BehavioralInput {
            attention,
            activity: non_empty(request.activity.clone()).unwrap_or_else(|| "unknown".to_string()),
            situation: non_empty(request.situation.clone()).unwrap_or_else(|| "home".to_string()),
        }),
        context: Some(FusionContext {
            age: context
                .and_then(|c| c.age)
                .filter(|a| *a != 0.0)
                .unwrap_or(DEFAULT_AGE),
            environment: non_empty(context.and_then(|c| c.environment.clone()))
                .unwrap_or_else(|| "home".to_string()),
        }),
    }
}

/// POST /api/ai/enhanced-emotion
pub async fn analyze_enhanced_emotion(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<EnhancedEmotionResponse>> {
    let started = Instant::now();

    let request: EnhancedEmotionRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(err) => {
            error!("Enhanced emotion analysis failed: {}", err);
            state.record_error(format!("enhanced-emotion: {}", err)).await;
            return Err(ApiError::internal(FAILURE_MESSAGE, state.details(&err)));
        }
    };

    let input = build_input(&request);
    let session_id = request.session_id.as_deref().unwrap_or(DEFAULT_SESSION);

    let (emotion, trends) = {
        let mut histories = state.histories.lock().await;
        let history = histories.session(session_id);
        let emotion = state.enhanced_fusion.fuse(&input, history);
        history.push(emotion.clone());
        let trends = history.trends(state.trend_window);
        (emotion, trends)
    };

    // Age-specific suggestions only when the caller actually reported an age
    let reported_age = request.context.as_ref().and_then(|c| c.age);
    let suggestions = caregiver_suggestions(&emotion, reported_age);

    let processing_time = started.elapsed().as_millis() as u64;
    debug!(session = %session_id, processing_ms = processing_time, "Enhanced emotion request complete");

    Ok(Json(EnhancedEmotionResponse {
        emotion,
        trends,
        suggestions,
        processing_time,
        timestamp: time::now_millis(),
    }))
}

pub fn enhanced_emotion_routes() -> Router<AppState> {
    Router::new().route("/api/ai/enhanced-emotion", post(analyze_enhanced_emotion))
}
