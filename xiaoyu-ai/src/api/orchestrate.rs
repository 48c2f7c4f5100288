//! POST /api/ai/orchestrate - multi-role AI answer to a parent's message

use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use serde::Deserialize;
use tracing::{error, info};

use super::{parse_body, EMPTY_MESSAGE};
use crate::emotion::VoiceEmotionObservation;
use crate::roles::{ChildContext, OrchestrationContext, OrchestrationResult};
use crate::{ApiError, ApiResult, AppState};

const FAILURE_MESSAGE: &str = "AI协同响应失败，请稍后重试";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrateRequest {
    #[serde(default)]
    pub message: Option<String>,
    /// Prosody-based emotion of the same utterance, fused with the text emotion
    #[serde(default)]
    pub voice_emotion: Option<VoiceEmotionObservation>,
    #[serde(default)]
    pub child_context: Option<ChildContext>,
}

/// POST /api/ai/orchestrate
///
/// 400 for a missing message, 500 when no language model is configured,
/// otherwise the status follows the language model failure (401/408/429/500).
pub async fn orchestrate(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<OrchestrationResult>> {
    let request: OrchestrateRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(err) => {
            error!("AI orchestrate failed: {}", err);
            state.record_error(format!("orchestrate: {}", err)).await;
            return Err(ApiError::internal(FAILURE_MESSAGE, state.details(&err)));
        }
    };

    let message = match request.message.as_deref() {
        Some(message) if !message.trim().is_empty() => message,
        _ => return Err(ApiError::BadRequest(EMPTY_MESSAGE.to_string())),
    };

    let Some(orchestrator) = state.orchestrator.as_ref() else {
        error!("Language model API key is not configured");
        state.record_error("orchestrate: language model not configured").await;
        return Err(ApiError::NotConfigured);
    };

    let emotion = request.voice_emotion.as_ref().map(|voice| {
        let text = state.classifier.classify(message);
        state.fusion.fuse(Some(&text), Some(voice))
    });

    let context = OrchestrationContext {
        child: request.child_context,
        emotion,
    };

    match orchestrator.orchestrate(message, context).await {
        Ok(result) => {
            info!(
                complexity = ?result.complexity,
                main_role = %result.main_role,
                "Orchestration complete"
            );
            Ok(Json(result))
        }
        Err(err) => {
            error!("AI orchestrate failed: {}", err);
            state.record_error(format!("orchestrate: {}", err)).await;
            let details = state.details(&err);
            Err(ApiError::Llm {
                source: err,
                details,
            })
        }
    }
}

pub fn orchestrate_routes() -> Router<AppState> {
    Router::new().route("/api/ai/orchestrate", post(orchestrate))
}
