//! Message analysis: which roles a message touches and how complex it is
//!
//! All matching is plain substring search over the lowercased message.

use serde::{Deserialize, Serialize};

use super::{AiRole, ResponseLength, RoleCatalog};

/// Role used when no trigger keyword matches
pub const DEFAULT_ROLE: AiRole = AiRole::Advisor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionalTone {
    Positive,
    Negative,
    Neutral,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryAnalysis {
    pub complexity: Complexity,
    /// Matching roles in declaration order; never empty
    pub involved_roles: Vec<AiRole>,
    pub emotional_tone: EmotionalTone,
    pub urgency: Urgency,
    pub suggested_response_length: ResponseLength,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleScore {
    pub role: AiRole,
    pub score: usize,
    pub matched_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSelection {
    pub selected_role: AiRole,
    pub confidence: f64,
    /// Highest score first; equal scores keep declaration order
    pub all_scores: Vec<RoleScore>,
    pub reason: String,
}

const POSITIVE_WORDS: &[&str] = &["开心", "高兴", "喜欢", "爱", "快乐", "幸福", "满意", "棒", "好"];
const NEGATIVE_WORDS: &[&str] = &["难过", "伤心", "生气", "愤怒", "讨厌", "害怕", "担心", "焦虑", "痛苦"];
const URGENT_WORDS: &[&str] = &["紧急", "马上", "立即", "快点", "危险", "救命", "急"];

fn count_matches(text: &str, words: &[&str]) -> usize {
    words.iter().filter(|w| text.contains(*w)).count()
}

fn emotional_tone(text: &str) -> EmotionalTone {
    let positive = count_matches(text, POSITIVE_WORDS);
    let negative = count_matches(text, NEGATIVE_WORDS);
    match (positive > 0, negative > 0) {
        (true, true) => EmotionalTone::Mixed,
        (true, false) => EmotionalTone::Positive,
        (false, true) => EmotionalTone::Negative,
        (false, false) => EmotionalTone::Neutral,
    }
}

fn urgency(text: &str) -> Urgency {
    match count_matches(text, URGENT_WORDS) {
        0 => Urgency::Low,
        1 => Urgency::Medium,
        _ => Urgency::High,
    }
}

impl RoleCatalog {
    /// Keywords of `role` found in the (already lowercased) message
    fn matched_keywords(&self, role: AiRole, lowered: &str) -> Vec<String> {
        self.get(role)
            .trigger_keywords
            .iter()
            .filter(|kw| lowered.contains(kw.as_str()))
            .cloned()
            .collect()
    }

    /// Determine the roles involved and the complexity tier
    ///
    /// Three or more roles is complex, two is medium, otherwise simple.
    /// When nothing matches the advisor is the only involved role.
    pub fn analyze_query_complexity(&self, query: &str) -> QueryAnalysis {
        let lowered = query.to_lowercase();

        let mut involved_roles: Vec<AiRole> = self
            .active()
            .filter(|config| config.trigger_keywords.iter().any(|kw| lowered.contains(kw.as_str())))
            .map(|config| config.id)
            .collect();

        let complexity = match involved_roles.len() {
            n if n >= 3 => Complexity::Complex,
            2 => Complexity::Medium,
            _ => Complexity::Simple,
        };

        if involved_roles.is_empty() {
            involved_roles.push(DEFAULT_ROLE);
        }

        let suggested_response_length = match complexity {
            Complexity::Simple => ResponseLength::Short,
            Complexity::Medium => ResponseLength::Medium,
            Complexity::Complex => ResponseLength::Long,
        };

        QueryAnalysis {
            complexity,
            involved_roles,
            emotional_tone: emotional_tone(&lowered),
            urgency: urgency(&lowered),
            suggested_response_length,
        }
    }

    /// Score every active role by matched keywords
    ///
    /// The highest score wins (first declared on ties); confidence is
    /// `min(score / 3, 1)`, or 0.5 for the advisor fallback.
    pub fn select_role_by_context_detailed(&self, message: &str) -> RoleSelection {
        let lowered = message.to_lowercase();

        let mut all_scores: Vec<RoleScore> = self
            .active()
            .map(|config| {
                let matched_keywords = self.matched_keywords(config.id, &lowered);
                RoleScore {
                    role: config.id,
                    score: matched_keywords.len(),
                    matched_keywords,
                }
            })
            .collect();

        let mut selected_role = DEFAULT_ROLE;
        let mut max_score = 0;
        for score in &all_scores {
            if score.score > max_score {
                max_score = score.score;
                selected_role = score.role;
            }
        }

        // Stable sort keeps declaration order among equal scores
        all_scores.sort_by(|a, b| b.score.cmp(&a.score));

        let (confidence, reason) = if max_score > 0 {
            (
                (max_score as f64 / 3.0).min(1.0),
                format!("匹配到{}个关键词", max_score),
            )
        } else {
            (0.5, "默认选择建议者角色".to_string())
        };

        RoleSelection {
            selected_role,
            confidence,
            all_scores,
            reason,
        }
    }
}
