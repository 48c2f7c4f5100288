//! Role catalog endpoints
//!
//! GET /api/ai/roles lists active roles by priority; POST
//! /api/ai/roles/select explains which role a message would be routed to.

use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{parse_body, EMPTY_MESSAGE, MALFORMED_BODY};
use crate::roles::{QueryAnalysis, RoleConfig, RoleSelection};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct SelectRoleRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectRoleResponse {
    #[serde(flatten)]
    pub selection: RoleSelection,
    pub analysis: QueryAnalysis,
}

/// GET /api/ai/roles
pub async fn list_roles(State(state): State<AppState>) -> Json<Vec<RoleConfig>> {
    Json(state.catalog.by_priority().into_iter().cloned().collect())
}

/// POST /api/ai/roles/select
///
/// 400 with a JSON error body for unparseable or blank input.
pub async fn select_role(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<SelectRoleResponse>> {
    let request: SelectRoleRequest = parse_body(&body).map_err(|err| {
        warn!("Rejected role selection body: {}", err);
        ApiError::BadRequest(MALFORMED_BODY.to_string())
    })?;

    let message = request
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest(EMPTY_MESSAGE.to_string()))?;

    Ok(Json(SelectRoleResponse {
        selection: state.catalog.select_role_by_context_detailed(&message),
        analysis: state.catalog.analyze_query_complexity(&message),
    }))
}

pub fn role_routes() -> Router<AppState> {
    Router::new()
        .route("/api/ai/roles", get(list_roles))
        .route("/api/ai/roles/select", post(select_role))
}
