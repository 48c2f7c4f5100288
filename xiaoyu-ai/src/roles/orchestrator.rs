//! Multi-role response orchestration
//!
//! A message is analysed into a complexity tier and answered with:
//! - simple: one call with the single role's full prompt
//! - medium: main role and support role answered concurrently
//! - complex: a coordinated answer, up to three short role insights
//!   (concurrent), then three pipe-separated action items
//!
//! Any failed call fails the whole request; nothing is retried.

use futures::future::try_join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::analysis::{Complexity, DEFAULT_ROLE};
use super::prompts::ChildContext;
use super::{AiRole, RoleCatalog};
use crate::emotion::FusedEmotionResult;
use crate::llm::{LanguageModel, LlmError};

/// Most supporting insights requested in the complex tier
pub const MAX_INSIGHTS: usize = 3;

/// Support role for the medium tier when only one role matched
const DEFAULT_SUPPORT_ROLE: AiRole = AiRole::Companion;

const ACTIONS_SYSTEM_PROMPT: &str =
    "基于上述分析，给出3条具体可行的行动建议，每条15字以内，用|分隔：";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportingInsight {
    pub role: AiRole,
    pub role_name: String,
    pub role_icon: String,
    pub insight: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleSummary {
    pub id: AiRole,
    pub name: String,
    pub icon: String,
}

/// Answer to one orchestrated message; optional parts depend on the tier
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrationResult {
    pub complexity: Complexity,
    pub main_role: AiRole,
    pub main_response: String,
    pub role_name: String,
    pub role_icon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supporting_insights: Option<Vec<SupportingInsight>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_actions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub involved_roles: Option<Vec<RoleSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<FusedEmotionResult>,
}

/// Optional inputs that shape the prompts
#[derive(Debug, Clone, Default)]
pub struct OrchestrationContext {
    pub child: Option<ChildContext>,
    /// Appended to the main response's system prompt and echoed back
    pub emotion: Option<FusedEmotionResult>,
}

/// Routes messages to roles and fans out language model calls
#[derive(Clone)]
pub struct RoleOrchestrator {
    catalog: Arc<RoleCatalog>,
    llm: Arc<dyn LanguageModel>,
}

impl RoleOrchestrator {
    pub fn new(catalog: Arc<RoleCatalog>, llm: Arc<dyn LanguageModel>) -> Self {
        Self { catalog, llm }
    }

    pub fn catalog(&self) -> &RoleCatalog {
        &self.catalog
    }

    pub async fn orchestrate(
        &self,
        message: &str,
        context: OrchestrationContext,
    ) -> Result<OrchestrationResult, LlmError> {
        let analysis = self.catalog.analyze_query_complexity(message);
        info!(
            complexity = ?analysis.complexity,
            roles = ?analysis.involved_roles,
            model = self.llm.model_name(),
            "Orchestrating message"
        );

        let mut result = match analysis.complexity {
            Complexity::Simple => self.simple(message, &analysis.involved_roles, &context).await?,
            Complexity::Medium => self.medium(message, &analysis.involved_roles, &context).await?,
            Complexity::Complex => self.complex(message, &analysis.involved_roles, &context).await?,
        };
        result.emotion = context.emotion;
        Ok(result)
    }

    fn with_emotion(&self, system: String, context: &OrchestrationContext) -> String {
        match &context.emotion {
            Some(emotion) => format!(
                "{}\n\n情绪参考：孩子当前情绪为{}（置信度{:.0}%）。{}",
                system,
                emotion.dominant_emotion.display_name(),
                emotion.confidence * 100.0,
                emotion.recommendation
            ),
            None => system,
        }
    }

    fn base_result(&self, complexity: Complexity, role: AiRole, response: String) -> OrchestrationResult {
        let config = self.catalog.get(role);
        OrchestrationResult {
            complexity,
            main_role: role,
            main_response: response,
            role_name: config.name.clone(),
            role_icon: config.icon.clone(),
            supporting_insights: None,
            suggested_actions: None,
            involved_roles: None,
            emotion: None,
        }
    }

    fn insight(&self, role: AiRole, insight: String) -> SupportingInsight {
        let config = self.catalog.get(role);
        SupportingInsight {
            role,
            role_name: config.name.clone(),
            role_icon: config.icon.clone(),
            insight,
        }
    }

    async fn simple(
        &self,
        message: &str,
        roles: &[AiRole],
        context: &OrchestrationContext,
    ) -> Result<OrchestrationResult, LlmError> {
        let role = roles.first().copied().unwrap_or(DEFAULT_ROLE);
        let system = self.with_emotion(
            self.catalog.coordinated_prompt(&[role], context.child.as_ref()),
            context,
        );

        let text = self.llm.generate(&system, message).await?;
        Ok(self.base_result(Complexity::Simple, role, text))
    }

    async fn medium(
        &self,
        message: &str,
        roles: &[AiRole],
        context: &OrchestrationContext,
    ) -> Result<OrchestrationResult, LlmError> {
        let main_role = roles.first().copied().unwrap_or(DEFAULT_ROLE);
        let support_role = roles.get(1).copied().unwrap_or(DEFAULT_SUPPORT_ROLE);

        let main_system = self.with_emotion(self.catalog.get(main_role).system_prompt.clone(), context);
        let support_system = format!(
            "基于\"{}\"的视角，针对以下问题给出补充建议（50字以内）：",
            self.catalog.get(support_role).name
        );

        let (main_text, support_text) = tokio::try_join!(
            self.llm.generate(&main_system, message),
            self.llm.generate(&support_system, message),
        )?;

        let mut result = self.base_result(Complexity::Medium, main_role, main_text);
        result.supporting_insights = Some(vec![self.insight(support_role, support_text)]);
        Ok(result)
    }

    async fn complex(
        &self,
        message: &str,
        roles: &[AiRole],
        context: &OrchestrationContext,
    ) -> Result<OrchestrationResult, LlmError> {
        let main_role = roles.first().copied().unwrap_or(DEFAULT_ROLE);
        let coordinated = self.with_emotion(
            self.catalog.coordinated_prompt(roles, context.child.as_ref()),
            context,
        );

        let main_text = self.llm.generate(&coordinated, message).await?;

        let insight_roles: Vec<AiRole> = roles.iter().skip(1).take(MAX_INSIGHTS).copied().collect();
        let insight_prompts: Vec<String> = insight_roles
            .iter()
            .map(|role| {
                format!(
                    "你是\"{}\"，请从你的专业角度给出一条简短建议（30字以内）：",
                    self.catalog.get(*role).name
                )
            })
            .collect();
        let insight_texts = try_join_all(
            insight_prompts
                .iter()
                .map(|system| self.llm.generate(system, message)),
        )
        .await?;

        let actions_prompt = format!("问题：{}\n分析：{}", message, main_text);
        let actions_text = self.llm.generate(ACTIONS_SYSTEM_PROMPT, &actions_prompt).await?;
        let suggested_actions = split_actions(&actions_text);
        debug!(actions = suggested_actions.len(), "Parsed suggested actions");

        let mut result = self.base_result(Complexity::Complex, main_role, main_text);
        result.supporting_insights = Some(
            insight_roles
                .into_iter()
                .zip(insight_texts)
                .map(|(role, text)| self.insight(role, text))
                .collect(),
        );
        result.suggested_actions = Some(suggested_actions);
        result.involved_roles = Some(
            roles
                .iter()
                .map(|role| {
                    let config = self.catalog.get(*role);
                    RoleSummary {
                        id: *role,
                        name: config.name.clone(),
                        icon: config.icon.clone(),
                    }
                })
                .collect(),
        );
        Ok(result)
    }
}

/// Split a pipe-separated action list, trimming and dropping empty items
pub fn split_actions(text: &str) -> Vec<String> {
    text.split('|')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_actions() {
        assert_eq!(
            split_actions(" 多陪伴 | 讲故事 ||  按时睡觉 "),
            vec!["多陪伴", "讲故事", "按时睡觉"]
        );
        assert!(split_actions(" | ").is_empty());
        assert_eq!(split_actions("只有一条"), vec!["只有一条"]);
    }
}
