//! Configuration resolution for xiaoyu-ai
//!
//! Language model settings are resolved with ENV → TOML → default priority.
//! A missing API key is not fatal: the emotion endpoints keep working and
//! the orchestrator answers with a configuration error.

use std::time::Duration;
use tracing::{info, warn};
use xiaoyu_common::config::LlmConfig;

use crate::llm::openai::OpenAiSettings;

pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV_VAR: &str = "OPENAI_BASE_URL";
pub const MODEL_ENV_VAR: &str = "OPENAI_MODEL";

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Resolve the language model API key
///
/// **Priority:** ENV → TOML
pub fn resolve_api_key(config: &LlmConfig) -> Option<String> {
    let env_key = env_value(API_KEY_ENV_VAR).filter(|k| is_valid_key(k));
    let toml_key = config.api_key.clone().filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "LLM API key found in both environment and TOML config. Using environment (highest priority)."
        );
    }

    if let Some(key) = env_key {
        info!("LLM API key loaded from environment variable");
        return Some(key);
    }

    if let Some(key) = toml_key {
        info!("LLM API key loaded from TOML config");
        return Some(key);
    }

    warn!(
        "LLM API key not configured; orchestration is disabled. Configure using one of:\n\
         1. Environment: {}=your-key-here\n\
         2. TOML config: [llm] api_key = \"your-key\"",
        API_KEY_ENV_VAR
    );
    None
}

/// Resolve complete client settings, or `None` when no key is configured
pub fn resolve_llm_settings(config: &LlmConfig) -> Option<OpenAiSettings> {
    let api_key = resolve_api_key(config)?;
    let base_url = env_value(BASE_URL_ENV_VAR).unwrap_or_else(|| config.base_url.clone());
    let model = env_value(MODEL_ENV_VAR).unwrap_or_else(|| config.model.clone());

    info!(base_url = %base_url, model = %model, "Language model endpoint resolved");

    Some(OpenAiSettings {
        api_key,
        base_url,
        model,
        timeout: Duration::from_secs(config.timeout_secs),
    })
}
