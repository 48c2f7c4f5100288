//! Emotion vocabulary shared by every Xiaoyu module
//!
//! One set of tagged types replaces the overlapping string enumerations
//! the services used to pass around:
//! - [`EmotionLabel`]: conversational labels (classifier output, fusion input/output)
//! - [`InfantEmotion`]: infant/toddler labels used by growth records
//! - [`BasicEmotion`] / [`SecondaryEmotion`]: enhanced multimodal fusion labels
//!
//! Conversion between the sets goes through the explicit adapters in this
//! module. Parsing never fails: unrecognised names map to neutral.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Conversational emotion label
///
/// The keyword classifier only ever emits the first seven variants.
/// `Tired`, `Curious` and `Frustrated` appear in the fusion valence/arousal
/// table and in its two-dimensional back-mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Happy,
    Sad,
    Angry,
    Excited,
    Calm,
    Anxious,
    #[default]
    Neutral,
    Tired,
    Curious,
    Frustrated,
}

impl EmotionLabel {
    /// All labels in declaration order
    pub const ALL: [EmotionLabel; 10] = [
        EmotionLabel::Happy,
        EmotionLabel::Sad,
        EmotionLabel::Angry,
        EmotionLabel::Excited,
        EmotionLabel::Calm,
        EmotionLabel::Anxious,
        EmotionLabel::Neutral,
        EmotionLabel::Tired,
        EmotionLabel::Curious,
        EmotionLabel::Frustrated,
    ];

    /// Wire name (lowercase)
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionLabel::Happy => "happy",
            EmotionLabel::Sad => "sad",
            EmotionLabel::Angry => "angry",
            EmotionLabel::Excited => "excited",
            EmotionLabel::Calm => "calm",
            EmotionLabel::Anxious => "anxious",
            EmotionLabel::Neutral => "neutral",
            EmotionLabel::Tired => "tired",
            EmotionLabel::Curious => "curious",
            EmotionLabel::Frustrated => "frustrated",
        }
    }

    /// Parse any known emotion name, falling back to `Neutral`
    ///
    /// Accepts the conversational labels, the infant labels and the basic
    /// emotion names, case-insensitively.
    pub fn parse_lenient(name: &str) -> Self {
        let lower = name.trim().to_lowercase();
        if let Some(label) = Self::ALL.iter().find(|l| l.as_str() == lower) {
            return *label;
        }
        if let Some(infant) = InfantEmotion::from_name(&lower) {
            return infant.into();
        }
        match lower.as_str() {
            "joy" => EmotionLabel::Happy,
            "anger" => EmotionLabel::Angry,
            "fear" => EmotionLabel::Anxious,
            _ => EmotionLabel::Neutral,
        }
    }

    /// Chinese display name
    pub fn display_name(&self) -> &'static str {
        match self {
            EmotionLabel::Happy => "开心",
            EmotionLabel::Sad => "难过",
            EmotionLabel::Angry => "生气",
            EmotionLabel::Excited => "兴奋",
            EmotionLabel::Calm => "平静",
            EmotionLabel::Anxious => "焦虑",
            EmotionLabel::Neutral => "平静",
            EmotionLabel::Tired => "疲惫",
            EmotionLabel::Curious => "好奇",
            EmotionLabel::Frustrated => "沮丧",
        }
    }
}

/// Deserialized through [`EmotionLabel::parse_lenient`] so unknown names become neutral
impl<'de> Deserialize<'de> for EmotionLabel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(EmotionLabel::parse_lenient(&name))
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Infant and toddler emotion label (growth-record vocabulary)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfantEmotion {
    Happiness,
    Sadness,
    Fear,
    Anger,
    Surprise,
    Disgust,
    Curiosity,
    Comfort,
    Hunger,
    Discomfort,
    Pain,
    Attention,
    Colic,
    Neutral,
}

impl InfantEmotion {
    pub const ALL: [InfantEmotion; 14] = [
        InfantEmotion::Happiness,
        InfantEmotion::Sadness,
        InfantEmotion::Fear,
        InfantEmotion::Anger,
        InfantEmotion::Surprise,
        InfantEmotion::Disgust,
        InfantEmotion::Curiosity,
        InfantEmotion::Comfort,
        InfantEmotion::Hunger,
        InfantEmotion::Discomfort,
        InfantEmotion::Pain,
        InfantEmotion::Attention,
        InfantEmotion::Colic,
        InfantEmotion::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InfantEmotion::Happiness => "happiness",
            InfantEmotion::Sadness => "sadness",
            InfantEmotion::Fear => "fear",
            InfantEmotion::Anger => "anger",
            InfantEmotion::Surprise => "surprise",
            InfantEmotion::Disgust => "disgust",
            InfantEmotion::Curiosity => "curiosity",
            InfantEmotion::Comfort => "comfort",
            InfantEmotion::Hunger => "hunger",
            InfantEmotion::Discomfort => "discomfort",
            InfantEmotion::Pain => "pain",
            InfantEmotion::Attention => "attention",
            InfantEmotion::Colic => "colic",
            InfantEmotion::Neutral => "neutral",
        }
    }

    fn from_name(lower: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|e| e.as_str() == lower)
    }
}

impl fmt::Display for InfantEmotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<EmotionLabel> for InfantEmotion {
    fn from(label: EmotionLabel) -> Self {
        match label {
            EmotionLabel::Happy => InfantEmotion::Happiness,
            EmotionLabel::Sad => InfantEmotion::Sadness,
            EmotionLabel::Angry => InfantEmotion::Anger,
            EmotionLabel::Excited | EmotionLabel::Calm => InfantEmotion::Comfort,
            EmotionLabel::Anxious | EmotionLabel::Frustrated => InfantEmotion::Discomfort,
            EmotionLabel::Curious => InfantEmotion::Curiosity,
            EmotionLabel::Tired | EmotionLabel::Neutral => InfantEmotion::Neutral,
        }
    }
}

impl From<InfantEmotion> for EmotionLabel {
    fn from(infant: InfantEmotion) -> Self {
        match infant {
            InfantEmotion::Happiness => EmotionLabel::Happy,
            InfantEmotion::Sadness => EmotionLabel::Sad,
            InfantEmotion::Anger => EmotionLabel::Angry,
            InfantEmotion::Fear => EmotionLabel::Anxious,
            InfantEmotion::Comfort => EmotionLabel::Calm,
            InfantEmotion::Discomfort | InfantEmotion::Pain | InfantEmotion::Colic => {
                EmotionLabel::Anxious
            }
            InfantEmotion::Curiosity => EmotionLabel::Curious,
            InfantEmotion::Surprise
            | InfantEmotion::Disgust
            | InfantEmotion::Hunger
            | InfantEmotion::Attention
            | InfantEmotion::Neutral => EmotionLabel::Neutral,
        }
    }
}

/// Basic emotion of the enhanced multimodal model (Ekman set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BasicEmotion {
    Joy,
    Sadness,
    Anger,
    Fear,
    Surprise,
    Disgust,
    #[default]
    Neutral,
}

impl BasicEmotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            BasicEmotion::Joy => "joy",
            BasicEmotion::Sadness => "sadness",
            BasicEmotion::Anger => "anger",
            BasicEmotion::Fear => "fear",
            BasicEmotion::Surprise => "surprise",
            BasicEmotion::Disgust => "disgust",
            BasicEmotion::Neutral => "neutral",
        }
    }
}

impl fmt::Display for BasicEmotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<BasicEmotion> for EmotionLabel {
    fn from(basic: BasicEmotion) -> Self {
        match basic {
            BasicEmotion::Joy => EmotionLabel::Happy,
            BasicEmotion::Sadness => EmotionLabel::Sad,
            BasicEmotion::Anger => EmotionLabel::Angry,
            BasicEmotion::Fear => EmotionLabel::Anxious,
            BasicEmotion::Surprise => EmotionLabel::Curious,
            BasicEmotion::Disgust | BasicEmotion::Neutral => EmotionLabel::Neutral,
        }
    }
}

/// Compound emotion refining a [`BasicEmotion`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecondaryEmotion {
    Excitement,
    Frustration,
    Curiosity,
    Comfort,
    Anxiety,
    Pride,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lenient_known_labels() {
        assert_eq!(EmotionLabel::parse_lenient("happy"), EmotionLabel::Happy);
        assert_eq!(EmotionLabel::parse_lenient("ANXIOUS"), EmotionLabel::Anxious);
        assert_eq!(EmotionLabel::parse_lenient(" curious "), EmotionLabel::Curious);
    }

    #[test]
    fn test_parse_lenient_infant_aliases() {
        assert_eq!(EmotionLabel::parse_lenient("happiness"), EmotionLabel::Happy);
        assert_eq!(EmotionLabel::parse_lenient("sadness"), EmotionLabel::Sad);
        assert_eq!(EmotionLabel::parse_lenient("comfort"), EmotionLabel::Calm);
        assert_eq!(EmotionLabel::parse_lenient("joy"), EmotionLabel::Happy);
    }

    #[test]
    fn test_parse_lenient_unknown_is_neutral() {
        assert_eq!(EmotionLabel::parse_lenient("bewildered"), EmotionLabel::Neutral);
        assert_eq!(EmotionLabel::parse_lenient(""), EmotionLabel::Neutral);
    }

    #[test]
    fn test_infant_adapter_round_trip_for_core_labels() {
        for label in [
            EmotionLabel::Happy,
            EmotionLabel::Sad,
            EmotionLabel::Angry,
            EmotionLabel::Neutral,
            EmotionLabel::Curious,
        ] {
            let infant: InfantEmotion = label.into();
            assert_eq!(EmotionLabel::from(infant), label, "label {label}");
        }
    }

    #[test]
    fn test_adapter_collapses_comfort_labels() {
        assert_eq!(InfantEmotion::from(EmotionLabel::Excited), InfantEmotion::Comfort);
        assert_eq!(InfantEmotion::from(EmotionLabel::Calm), InfantEmotion::Comfort);
        assert_eq!(InfantEmotion::from(EmotionLabel::Anxious), InfantEmotion::Discomfort);
    }

    #[test]
    fn test_default_label_is_neutral() {
        assert_eq!(EmotionLabel::default(), EmotionLabel::Neutral);
        assert_eq!(BasicEmotion::default(), BasicEmotion::Neutral);
    }

    #[test]
    fn test_serde_wire_names_are_lowercase() {
        let json = serde_json::to_string(&EmotionLabel::Frustrated).unwrap();
        assert_eq!(json, "\"frustrated\"");
        let basic: BasicEmotion = serde_json::from_str("\"surprise\"").unwrap();
        assert_eq!(basic, BasicEmotion::Surprise);
    }

    #[test]
    fn test_label_deserialize_is_lenient() {
        let label: EmotionLabel = serde_json::from_str("\"Happiness\"").unwrap();
        assert_eq!(label, EmotionLabel::Happy);
        let label: EmotionLabel = serde_json::from_str("\"grumpy\"").unwrap();
        assert_eq!(label, EmotionLabel::Neutral);
        assert!(serde_json::from_str::<EmotionLabel>("3").is_err());
    }
}
