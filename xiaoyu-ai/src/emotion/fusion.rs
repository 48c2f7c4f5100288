//! Text + voice emotion fusion
//!
//! Combines an optional text observation and an optional voice observation
//! into one [`FusedEmotionResult`]:
//! - neither present: fixed "no signal" result
//! - one present: label kept, dimensions from the lookup table, confidence
//!   discounted (text ×0.8, voice ×0.9)
//! - both present: confidence-weighted mean of (valence, arousal), then the
//!   point is mapped back to a label on the Russell circumplex
//!
//! Unknown labels never fail; every lookup falls back to the neutral row.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use xiaoyu_common::EmotionLabel;

use super::classifier::EmotionObservation;

/// Emotion detected from speech prosody
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceEmotionObservation {
    #[serde(rename = "type")]
    pub label: EmotionLabel,
    pub confidence: f64,
    #[serde(default)]
    pub pitch: f64,
    #[serde(default)]
    pub energy: f64,
    #[serde(default)]
    pub variation: f64,
}

/// Inputs that produced a fused result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FusionSources {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<EmotionObservation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<VoiceEmotionObservation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FusedEmotionResult {
    pub dominant_emotion: EmotionLabel,
    pub confidence: f64,
    pub valence: f64,
    pub arousal: f64,
    pub sources: FusionSources,
    pub recommendation: String,
    pub action_suggestions: Vec<String>,
}

/// Position of a label in valence/arousal space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub valence: f64,
    pub arousal: f64,
}

/// Caregiver guidance attached to a fused label
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub text: String,
    pub actions: Vec<String>,
}

impl Recommendation {
    fn new(text: &str, actions: [&str; 3]) -> Self {
        Self {
            text: text.to_string(),
            actions: actions.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Per-modality fusion weights
///
/// They need not sum to one: the weighted sum is normalised by the sum of
/// weight × confidence actually used.
#[derive(Debug, Clone, Copy)]
pub struct FusionWeights {
    pub text: f64,
    pub voice: f64,
    /// Single-modality confidence discount for text
    pub text_only_discount: f64,
    /// Single-modality confidence discount for voice
    pub voice_only_discount: f64,
    pub agreement_boost: f64,
    pub disagreement_discount: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            text: 0.4,
            voice: 0.6,
            text_only_discount: 0.8,
            voice_only_discount: 0.9,
            agreement_boost: 1.2,
            disagreement_discount: 0.8,
        }
    }
}

/// Read-only lookup tables used by [`MultimodalFusion`]
#[derive(Debug, Clone)]
pub struct FusionTables {
    dimensions: HashMap<EmotionLabel, Dimensions>,
    recommendations: HashMap<EmotionLabel, Recommendation>,
}

impl FusionTables {
    pub fn dimensions(&self, label: EmotionLabel) -> Dimensions {
        self.dimensions
            .get(&label)
            .or_else(|| self.dimensions.get(&EmotionLabel::Neutral))
            .copied()
            .unwrap_or(Dimensions {
                valence: 0.0,
                arousal: 0.3,
            })
    }

    pub fn recommendation(&self, label: EmotionLabel) -> Option<&Recommendation> {
        self.recommendations
            .get(&label)
            .or_else(|| self.recommendations.get(&EmotionLabel::Neutral))
    }
}

impl Default for FusionTables {
    fn default() -> Self {
        let dimensions = [
            (EmotionLabel::Happy, 0.8, 0.6),
            (EmotionLabel::Excited, 0.9, 0.9),
            (EmotionLabel::Calm, 0.5, 0.2),
            (EmotionLabel::Neutral, 0.0, 0.3),
            (EmotionLabel::Sad, -0.7, 0.3),
            (EmotionLabel::Angry, -0.8, 0.9),
            (EmotionLabel::Anxious, -0.5, 0.8),
            (EmotionLabel::Tired, -0.3, 0.1),
            (EmotionLabel::Curious, 0.6, 0.5),
            (EmotionLabel::Frustrated, -0.6, 0.7),
        ]
        .into_iter()
        .map(|(label, valence, arousal)| (label, Dimensions { valence, arousal }))
        .collect();

        let recommendations = [
            (
                EmotionLabel::Happy,
                Recommendation::new(
                    "宝贝现在心情很好，这是学习新知识的好时机！",
                    ["尝试有挑战性的任务", "记录这个开心时刻", "分享快乐给家人"],
                ),
            ),
            (
                EmotionLabel::Excited,
                Recommendation::new(
                    "宝贝非常兴奋！可以引导这份热情到有意义的活动中。",
                    ["进行创意活动", "户外运动释放能量", "分享兴奋的原因"],
                ),
            ),
            (
                EmotionLabel::Calm,
                Recommendation::new(
                    "宝贝状态平和稳定，适合进行需要专注的活动。",
                    ["阅读或学习", "安静的手工活动", "亲子对话时光"],
                ),
            ),
            (
                EmotionLabel::Neutral,
                Recommendation::new(
                    "宝贝情绪平稳，可以根据计划进行日常活动。",
                    ["按计划完成任务", "尝试新的兴趣", "户外活动放松"],
                ),
            ),
            (
                EmotionLabel::Sad,
                Recommendation::new(
                    "宝贝似乎有些不开心，需要更多的关心和陪伴。",
                    ["倾听孩子的想法", "给一个温暖的拥抱", "一起做喜欢的事情"],
                ),
            ),
            (
                EmotionLabel::Angry,
                Recommendation::new(
                    "宝贝情绪有些激动，先帮助Ta平复情绪。",
                    ["深呼吸练习", "给予冷静空间", "等平静后再沟通"],
                ),
            ),
            (
                EmotionLabel::Anxious,
                Recommendation::new(
                    "宝贝可能感到焦虑，需要安抚和支持。",
                    ["陪伴和倾听", "帮助分析担心的事", "制定小步骤计划"],
                ),
            ),
            (
                EmotionLabel::Curious,
                Recommendation::new(
                    "宝贝充满好奇心，这是探索学习的好时机！",
                    ["鼓励提问", "一起寻找答案", "进行科学小实验"],
                ),
            ),
        ]
        .into_iter()
        .collect();

        Self {
            dimensions,
            recommendations,
        }
    }
}

/// Map a (valence, arousal) point back to a label
pub fn classify_from_dimensions(valence: f64, arousal: f64) -> EmotionLabel {
    if valence > 0.3 {
        if arousal > 0.6 {
            EmotionLabel::Excited
        } else if arousal > 0.3 {
            EmotionLabel::Happy
        } else {
            EmotionLabel::Calm
        }
    } else if valence < -0.3 {
        if arousal > 0.6 {
            EmotionLabel::Angry
        } else if arousal > 0.4 {
            EmotionLabel::Anxious
        } else {
            EmotionLabel::Sad
        }
    } else if arousal > 0.5 {
        EmotionLabel::Curious
    } else {
        EmotionLabel::Neutral
    }
}

/// Stateless text/voice fusion engine
#[derive(Debug, Clone, Default)]
pub struct MultimodalFusion {
    tables: FusionTables,
    weights: FusionWeights,
}

impl MultimodalFusion {
    pub fn new(tables: FusionTables, weights: FusionWeights) -> Self {
        Self { tables, weights }
    }

    pub fn tables(&self) -> &FusionTables {
        &self.tables
    }

    /// Fuse the available modalities; never fails
    pub fn fuse(
        &self,
        text: Option<&EmotionObservation>,
        voice: Option<&VoiceEmotionObservation>,
    ) -> FusedEmotionResult {
        match (text, voice) {
            (None, None) => Self::no_signal(),
            (Some(text), None) => self.single_modality(
                text.label,
                text.confidence * self.weights.text_only_discount,
                FusionSources {
                    text: Some(text.clone()),
                    voice: None,
                },
            ),
            (None, Some(voice)) => self.single_modality(
                voice.label,
                voice.confidence * self.weights.voice_only_discount,
                FusionSources {
                    text: None,
                    voice: Some(voice.clone()),
                },
            ),
            (Some(text), Some(voice)) => self.fuse_both(text, voice),
        }
    }

    fn fuse_both(
        &self,
        text: &EmotionObservation,
        voice: &VoiceEmotionObservation,
    ) -> FusedEmotionResult {
        let text_dims = self.tables.dimensions(text.label);
        let voice_dims = self.tables.dimensions(voice.label);

        let mut text_weight = self.weights.text * text.confidence;
        let mut voice_weight = self.weights.voice * voice.confidence;
        // Zero confidences would divide by zero; fall back to the raw weights
        if text_weight + voice_weight <= f64::EPSILON {
            text_weight = self.weights.text;
            voice_weight = self.weights.voice;
        }
        let total = text_weight + voice_weight;

        let valence = (text_dims.valence * text_weight + voice_dims.valence * voice_weight) / total;
        let arousal = (text_dims.arousal * text_weight + voice_dims.arousal * voice_weight) / total;

        let dominant = classify_from_dimensions(valence, arousal);

        let base = (text.confidence + voice.confidence) / 2.0;
        let agree = text.label == voice.label;
        let confidence = if agree {
            (base * self.weights.agreement_boost).min(1.0)
        } else {
            base * self.weights.disagreement_discount
        };

        debug!(
            text = %text.label,
            voice = %voice.label,
            fused = %dominant,
            valence,
            arousal,
            confidence,
            agree,
            "Fused text and voice emotion"
        );

        let (recommendation, action_suggestions) = self.recommend(dominant);

        FusedEmotionResult {
            dominant_emotion: dominant,
            confidence,
            valence,
            arousal,
            sources: FusionSources {
                text: Some(text.clone()),
                voice: Some(voice.clone()),
            },
            recommendation,
            action_suggestions,
        }
    }

    fn single_modality(
        &self,
        label: EmotionLabel,
        confidence: f64,
        sources: FusionSources,
    ) -> FusedEmotionResult {
        let dims = self.tables.dimensions(label);
        let (recommendation, action_suggestions) = self.recommend(label);

        FusedEmotionResult {
            dominant_emotion: label,
            confidence,
            valence: dims.valence,
            arousal: dims.arousal,
            sources,
            recommendation,
            action_suggestions,
        }
    }

    fn recommend(&self, label: EmotionLabel) -> (String, Vec<String>) {
        match self.tables.recommendation(label) {
            Some(rec) => (rec.text.clone(), rec.actions.clone()),
            None => Self::no_signal_guidance(),
        }
    }

    fn no_signal_guidance() -> (String, Vec<String>) {
        (
            "暂时无法检测到明确的情绪信号。".to_string(),
            vec!["继续观察".to_string(), "主动询问感受".to_string()],
        )
    }

    fn no_signal() -> FusedEmotionResult {
        let (recommendation, action_suggestions) = Self::no_signal_guidance();
        FusedEmotionResult {
            dominant_emotion: EmotionLabel::Neutral,
            confidence: 0.5,
            valence: 0.0,
            arousal: 0.3,
            sources: FusionSources::default(),
            recommendation,
            action_suggestions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(label: EmotionLabel, confidence: f64) -> EmotionObservation {
        EmotionObservation {
            label,
            confidence,
            valence: 0.0,
            arousal: 0.0,
            keywords: vec![],
        }
    }

    fn voice(label: EmotionLabel, confidence: f64) -> VoiceEmotionObservation {
        VoiceEmotionObservation {
            label,
            confidence,
            pitch: 220.0,
            energy: 0.5,
            variation: 0.2,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_no_signal() {
        let fusion = MultimodalFusion::default();
        let result = fusion.fuse(None, None);
        assert_eq!(result.dominant_emotion, EmotionLabel::Neutral);
        assert_eq!(result.confidence, 0.5);
        assert_eq!(result.valence, 0.0);
        assert_eq!(result.arousal, 0.3);
        assert_eq!(result.sources, FusionSources::default());
        assert_eq!(result.action_suggestions, vec!["继续观察", "主动询问感受"]);
    }

    #[test]
    fn test_text_only_discount() {
        let fusion = MultimodalFusion::default();
        let t = text(EmotionLabel::Sad, 0.5);
        let result = fusion.fuse(Some(&t), None);
        assert_eq!(result.dominant_emotion, EmotionLabel::Sad);
        assert!(approx(result.confidence, 0.4));
        assert_eq!(result.valence, -0.7);
        assert_eq!(result.arousal, 0.3);
        assert!(result.sources.voice.is_none());
        assert!(result.recommendation.contains("不开心"));
    }

    #[test]
    fn test_voice_only_discount() {
        let fusion = MultimodalFusion::default();
        let v = voice(EmotionLabel::Excited, 0.5);
        let result = fusion.fuse(None, Some(&v));
        assert_eq!(result.dominant_emotion, EmotionLabel::Excited);
        assert!(approx(result.confidence, 0.45));
        assert_eq!(result.valence, 0.9);
    }

    #[test]
    fn test_label_without_recommendation_falls_back_to_neutral() {
        let fusion = MultimodalFusion::default();
        let t = text(EmotionLabel::Tired, 0.6);
        let result = fusion.fuse(Some(&t), None);
        assert_eq!(result.dominant_emotion, EmotionLabel::Tired);
        assert_eq!(result.valence, -0.3);
        assert_eq!(result.recommendation, "宝贝情绪平稳，可以根据计划进行日常活动。");
    }

    #[test]
    fn test_agreement_boost() {
        let fusion = MultimodalFusion::default();
        let result = fusion.fuse(
            Some(&text(EmotionLabel::Happy, 0.5)),
            Some(&voice(EmotionLabel::Happy, 0.7)),
        );
        assert_eq!(result.dominant_emotion, EmotionLabel::Happy);
        assert!(approx(result.confidence, 0.72));
        assert!(approx(result.valence, 0.8));
        assert!(approx(result.arousal, 0.6));
    }

    #[test]
    fn test_agreement_boost_is_capped() {
        let fusion = MultimodalFusion::default();
        let result = fusion.fuse(
            Some(&text(EmotionLabel::Calm, 0.95)),
            Some(&voice(EmotionLabel::Calm, 0.95)),
        );
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_disagreement_discount_and_back_mapping() {
        let fusion = MultimodalFusion::default();
        let t = text(EmotionLabel::Happy, 0.5);
        let v = voice(EmotionLabel::Angry, 0.5);
        let result = fusion.fuse(Some(&t), Some(&v));

        // weights: text 0.4*0.5=0.2, voice 0.6*0.5=0.3, total 0.5
        let valence = (0.8 * 0.2 + -0.8 * 0.3) / 0.5;
        let arousal = (0.6 * 0.2 + 0.9 * 0.3) / 0.5;
        assert!(approx(result.valence, valence));
        assert!(approx(result.arousal, arousal));
        // valence -0.16 sits in the neutral band, arousal 0.78 > 0.5
        assert_eq!(result.dominant_emotion, EmotionLabel::Curious);
        assert!(approx(result.confidence, 0.4));
        assert!(result.sources.text.is_some() && result.sources.voice.is_some());
    }

    #[test]
    fn test_agreement_never_lower_than_disagreement() {
        let fusion = MultimodalFusion::default();
        for c in [0.1, 0.3, 0.5, 0.8, 0.95] {
            let agree = fusion.fuse(
                Some(&text(EmotionLabel::Sad, c)),
                Some(&voice(EmotionLabel::Sad, c)),
            );
            let disagree = fusion.fuse(
                Some(&text(EmotionLabel::Sad, c)),
                Some(&voice(EmotionLabel::Happy, c)),
            );
            assert!(agree.confidence >= disagree.confidence);
        }
    }

    #[test]
    fn test_zero_confidences_do_not_produce_nan() {
        let fusion = MultimodalFusion::default();
        let result = fusion.fuse(
            Some(&text(EmotionLabel::Happy, 0.0)),
            Some(&voice(EmotionLabel::Happy, 0.0)),
        );
        assert!(result.valence.is_finite());
        assert!(result.arousal.is_finite());
        assert_eq!(result.dominant_emotion, EmotionLabel::Happy);
    }

    #[test]
    fn test_classify_from_dimensions_regions() {
        assert_eq!(classify_from_dimensions(0.5, 0.7), EmotionLabel::Excited);
        assert_eq!(classify_from_dimensions(0.5, 0.5), EmotionLabel::Happy);
        assert_eq!(classify_from_dimensions(0.5, 0.2), EmotionLabel::Calm);
        assert_eq!(classify_from_dimensions(-0.5, 0.7), EmotionLabel::Angry);
        assert_eq!(classify_from_dimensions(-0.5, 0.5), EmotionLabel::Anxious);
        assert_eq!(classify_from_dimensions(-0.5, 0.3), EmotionLabel::Sad);
        assert_eq!(classify_from_dimensions(0.0, 0.6), EmotionLabel::Curious);
        assert_eq!(classify_from_dimensions(0.0, 0.5), EmotionLabel::Neutral);
        // Boundaries are exclusive
        assert_eq!(classify_from_dimensions(0.3, 0.9), EmotionLabel::Curious);
        assert_eq!(classify_from_dimensions(-0.3, 0.2), EmotionLabel::Neutral);
    }

    #[test]
    fn test_wire_format() {
        let fusion = MultimodalFusion::default();
        let result = fusion.fuse(None, Some(&voice(EmotionLabel::Calm, 0.6)));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["dominantEmotion"], "calm");
        assert_eq!(json["sources"]["voice"]["type"], "calm");
        assert!(json["sources"].get("text").is_none());
        assert!(json["actionSuggestions"].is_array());
    }
}
