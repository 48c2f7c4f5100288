//! POST /api/ai/emotion - keyword emotion analysis of a text

use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::error;
use xiaoyu_common::EmotionLabel;

use super::parse_body;
use crate::{ApiError, ApiResult, AppState};

const FAILURE_MESSAGE: &str = "情感分析失败";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionRequest {
    pub text: String,
    #[serde(default)]
    pub include_advice: bool,
}

#[derive(Debug, Serialize)]
pub struct EmotionResponse {
    pub emotion: EmotionLabel,
    pub confidence: f64,
    pub valence: f64,
    pub arousal: f64,
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advice: Option<String>,
}

/// POST /api/ai/emotion
///
/// Malformed bodies (including a missing `text`) are reported as a 500
/// analysis failure, the same as any other failure of this endpoint.
pub async fn analyze_emotion(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<EmotionResponse>> {
    let request: EmotionRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(err) => {
            error!("Emotion analysis failed: {}", err);
            state.record_error(format!("emotion: {}", err)).await;
            return Err(ApiError::internal(FAILURE_MESSAGE, state.details(&err)));
        }
    };

    let observation = state.classifier.classify(&request.text);
    let advice = request
        .include_advice
        .then(|| state.classifier.advice(observation.label).to_string());

    Ok(Json(EmotionResponse {
        emotion: observation.label,
        confidence: observation.confidence,
        valence: observation.valence,
        arousal: observation.arousal,
        keywords: observation.keywords,
        advice,
    }))
}

pub fn emotion_routes() -> Router<AppState> {
    Router::new().route("/api/ai/emotion", post(analyze_emotion))
}
