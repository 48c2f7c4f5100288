//! System prompt builders

use serde::{Deserialize, Serialize};

use super::{AiRole, RoleCatalog};

const BASE_PROMPT: &str =
    "你是AI小语，YYC³智能成长守护系统的AI助手。你服务的是一个温暖的家庭，致力于陪伴孩子健康成长。";

const GENERAL_REQUIREMENTS: &str = "通用要求：
- 使用简洁、易懂的语言
- 提供具体、可操作的建议
- 关注孩子的年龄特点和个体差异
- 尊重家长的教育理念
- 保持积极、正面的态度
- 回答控制在200字以内，除非用户要求详细说明";

/// Facts about the child injected into prompts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildContext {
    pub name: String,
    /// Human-readable age, e.g. "2岁3个月"
    pub age_text: String,
    /// Development stage, e.g. "幼儿期"
    pub stage: String,
    #[serde(default)]
    pub traits: Vec<String>,
}

impl ChildContext {
    fn prompt_section(&self) -> String {
        let traits = if self.traits.is_empty() {
            "活泼可爱".to_string()
        } else {
            self.traits.join("、")
        };
        format!(
            "\n\n当前服务的孩子信息：\n- 姓名：{}\n- 年龄：{}\n- 所处阶段：{}\n- 特点：{}",
            self.name, self.age_text, self.stage, traits
        )
    }
}

impl RoleCatalog {
    /// Full system prompt for a single role
    pub fn role_system_prompt(&self, role: AiRole, child: Option<&ChildContext>) -> String {
        let context = child.map(ChildContext::prompt_section).unwrap_or_default();
        format!(
            "{}{}\n\n{}\n\n{}",
            BASE_PROMPT,
            context,
            self.get(role).system_prompt,
            GENERAL_REQUIREMENTS
        )
    }

    /// System prompt combining several roles' viewpoints
    ///
    /// With zero or one role this is the single-role prompt (advisor when
    /// empty). Each role contributes its first three specialties.
    pub fn coordinated_prompt(&self, roles: &[AiRole], child: Option<&ChildContext>) -> String {
        if roles.len() <= 1 {
            let role = roles.first().copied().unwrap_or(AiRole::Advisor);
            return self.role_system_prompt(role, child);
        }

        let perspectives = roles
            .iter()
            .map(|role| {
                let config = self.get(*role);
                let specialties: Vec<&str> =
                    config.specialties.iter().take(3).map(String::as_str).collect();
                format!("【{}视角】{}", config.name, specialties.join("、"))
            })
            .collect::<Vec<_>>()
            .join("\n");

        let context = child.map(ChildContext::prompt_section).unwrap_or_default();

        format!(
            "你是AI小语，需要综合多个角色视角回答用户问题。{}\n\n用户问题涉及以下方面：\n{}\n\n\
             请综合以上视角，给出全面而有条理的回答。\n\
             - 先从最相关的角度切入\n\
             - 适当补充其他角度的见解\n\
             - 给出具体可行的建议\n\
             - 回答控制在300字以内",
            context, perspectives
        )
    }
}
