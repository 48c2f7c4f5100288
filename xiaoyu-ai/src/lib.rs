//! xiaoyu-ai library interface
//!
//! Emotion analysis and multi-role AI orchestration for the child growth
//! companion. Exposes the router and state for integration testing.

pub mod api;
pub mod config;
pub mod emotion;
pub mod error;
pub mod llm;
pub mod roles;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use xiaoyu_common::config::EmotionConfig;
use xiaoyu_common::time;

use crate::emotion::{EmotionClassifier, EnhancedEmotionFusion, MultimodalFusion, SessionHistories};
use crate::llm::LanguageModel;
use crate::roles::{RoleCatalog, RoleOrchestrator};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<EmotionClassifier>,
    pub fusion: Arc<MultimodalFusion>,
    pub enhanced_fusion: Arc<EnhancedEmotionFusion>,
    /// Per-session enhanced fusion history
    pub histories: Arc<Mutex<SessionHistories>>,
    /// Entries considered by trend summaries
    pub trend_window: usize,
    pub catalog: Arc<RoleCatalog>,
    /// `None` when no language model is configured
    pub orchestrator: Option<RoleOrchestrator>,
    /// Whether error details are returned to clients
    pub development: bool,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(
        emotion: &EmotionConfig,
        llm: Option<Arc<dyn LanguageModel>>,
        development: bool,
    ) -> Self {
        let catalog = Arc::new(RoleCatalog::default());
        let orchestrator = llm.map(|llm| RoleOrchestrator::new(catalog.clone(), llm));

        Self {
            classifier: Arc::new(EmotionClassifier::default()),
            fusion: Arc::new(MultimodalFusion::default()),
            enhanced_fusion: Arc::new(EnhancedEmotionFusion::default()),
            histories: Arc::new(Mutex::new(SessionHistories::new(
                emotion.history_capacity,
                emotion.max_sessions,
            ))),
            trend_window: emotion.trend_window,
            catalog,
            orchestrator,
            development,
            startup_time: time::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Remember an error for the health endpoint
    pub async fn record_error(&self, message: impl Into<String>) {
        *self.last_error.write().await = Some(message.into());
    }

    /// Error details for clients (development mode only)
    pub fn details(&self, error: &impl Display) -> Option<String> {
        self.development.then(|| error.to_string())
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::emotion_routes())
        .merge(api::enhanced_emotion_routes())
        .merge(api::orchestrate_routes())
        .merge(api::role_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
