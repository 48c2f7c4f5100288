//! Four-modality emotion fusion
//!
//! Analyses text, voice, visual (face + body) and behavioural signals
//! independently, blends them with fixed modality weights, smooths the
//! result against the caller's recent history and adjusts it for the
//! child's age.
//!
//! Valence is -1.0..1.0. Arousal here is also -1.0 (drowsy) to 1.0
//! (agitated), unlike the 0..1 scale of the text/voice fusion.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use xiaoyu_common::{time, BasicEmotion, SecondaryEmotion};

use super::history::EmotionHistory;

// ============================================================================
// Input types
// ============================================================================

/// Prosodic and spectral features of a speech clip
///
/// Missing fields default to 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AudioFeatures {
    /// Fundamental frequency (Hz)
    pub pitch: f64,
    pub energy: f64,
    pub spectral_centroid: f64,
    pub zero_crossing_rate: f64,
    pub speech_rate: f64,
    pub pause_ratio: f64,
    pub volume_variability: f64,
    pub harmonics: f64,
    pub breathiness: f64,
    pub strain: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeDirection {
    pub x: f64,
    pub y: f64,
}

/// Facial expression features (FACS action units keyed "AU01", "AU02", ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FacialFeatures {
    pub action_units: HashMap<String, f64>,
    pub smile_intensity: f64,
    pub brow_raise: f64,
    pub eye_openness: f64,
    pub mouth_openness: f64,
    pub gaze_direction: GazeDirection,
    pub eye_contact: bool,
}

impl FacialFeatures {
    /// Activation of an action unit; absent units count as 0
    pub fn action_unit(&self, name: &str) -> f64 {
        self.action_units.get(name).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Posture {
    Upright,
    Slumped,
    Tense,
    Relaxed,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandGestures {
    pub frequency: f64,
    pub expressiveness: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BodyLanguageFeatures {
    pub posture: Posture,
    pub movement_level: f64,
    pub hand_gestures: HandGestures,
    pub personal_space: f64,
    pub proximity: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioInput {
    pub features: AudioFeatures,
    /// Clip length in seconds
    pub duration: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoInput {
    pub facial: FacialFeatures,
    pub body: BodyLanguageFeatures,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BehavioralInput {
    /// 0.0-1.0
    pub attention: f64,
    /// e.g. "playing", "crying", "sleeping"
    pub activity: String,
    /// Where the observation happened, e.g. "home"
    pub situation: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FusionContext {
    /// Age in years; 0 disables age adjustment
    pub age: f64,
    pub environment: String,
}

/// Everything observed about the child at one moment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultimodalInput {
    pub text: Option<String>,
    pub audio: Option<AudioInput>,
    pub video: Option<VideoInput>,
    pub behavioral: Option<BehavioralInput>,
    pub context: Option<FusionContext>,
}

// ============================================================================
// Output types
// ============================================================================

/// Weight each modality contributed (0 when absent)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModalityWeights {
    pub text: f64,
    pub voice: f64,
    pub visual: f64,
    pub behavioral: f64,
}

/// Fused emotional state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionFeatures {
    pub primary: BasicEmotion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<SecondaryEmotion>,
    /// 0.0-1.0
    pub intensity: f64,
    pub valence: f64,
    pub arousal: f64,
    pub confidence: f64,
    pub modality_weights: ModalityWeights,
    /// Unix epoch milliseconds
    pub timestamp: i64,
}

impl EmotionFeatures {
    /// Result used when no modality produced a reading
    pub fn neutral() -> Self {
        Self {
            primary: BasicEmotion::Neutral,
            secondary: None,
            intensity: 0.1,
            valence: 0.0,
            arousal: 0.0,
            confidence: 0.5,
            modality_weights: ModalityWeights::default(),
            timestamp: time::now_millis(),
        }
    }
}

/// What a single modality analyser concluded
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModalityReading {
    pub primary: BasicEmotion,
    pub secondary: Option<SecondaryEmotion>,
    pub intensity: f64,
    pub valence: f64,
    pub arousal: f64,
    pub confidence: f64,
}

/// Emotion pattern without a confidence attached
#[derive(Debug, Clone, Copy, PartialEq)]
struct Pattern {
    primary: BasicEmotion,
    secondary: Option<SecondaryEmotion>,
    intensity: f64,
    valence: f64,
    arousal: f64,
}

impl Pattern {
    const fn new(
        primary: BasicEmotion,
        secondary: Option<SecondaryEmotion>,
        intensity: f64,
        valence: f64,
        arousal: f64,
    ) -> Self {
        Self {
            primary,
            secondary,
            intensity,
            valence,
            arousal,
        }
    }

    const NEUTRAL: Pattern = Pattern::new(BasicEmotion::Neutral, None, 0.1, 0.0, 0.0);

    fn with_confidence(self, confidence: f64) -> ModalityReading {
        ModalityReading {
            primary: self.primary,
            secondary: self.secondary,
            intensity: self.intensity,
            valence: self.valence,
            arousal: self.arousal,
            confidence,
        }
    }
}

/// Reading of a modality that was present but recognised nothing
fn unrecognised(confidence: f64) -> ModalityReading {
    ModalityReading {
        primary: BasicEmotion::Neutral,
        secondary: None,
        intensity: 0.0,
        valence: 0.0,
        arousal: 0.0,
        confidence,
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Fixed weights of the enhanced fusion
#[derive(Debug, Clone, Copy)]
pub struct EnhancedWeights {
    pub modalities: ModalityWeights,
    /// Facial vs. body share of the visual reading
    pub facial: f64,
    pub body: f64,
    /// Current, previous and one-before-previous share in temporal smoothing
    pub smoothing: [f64; 3],
}

impl Default for EnhancedWeights {
    fn default() -> Self {
        Self {
            modalities: ModalityWeights {
                text: 0.25,
                voice: 0.35,
                visual: 0.30,
                behavioral: 0.10,
            },
            facial: 0.7,
            body: 0.3,
            smoothing: [0.5, 0.3, 0.2],
        }
    }
}

const CONFIDENCE_CEILING: f64 = 0.9;
const AGREEMENT_BONUS: f64 = 0.2;
const SMOOTHING_BONUS: f64 = 0.1;

/// Text keywords ordered as scanned; the strictly highest intensity wins
const TEXT_KEYWORDS: &[(&str, Pattern)] = &[
    ("开心", Pattern::new(BasicEmotion::Joy, None, 0.8, 0.8, 0.6)),
    ("高兴", Pattern::new(BasicEmotion::Joy, None, 0.7, 0.7, 0.5)),
    (
        "兴奋",
        Pattern::new(BasicEmotion::Joy, Some(SecondaryEmotion::Excitement), 0.9, 0.8, 0.9),
    ),
    (
        "好奇",
        Pattern::new(BasicEmotion::Surprise, Some(SecondaryEmotion::Curiosity), 0.6, 0.4, 0.7),
    ),
    ("喜欢", Pattern::new(BasicEmotion::Joy, None, 0.6, 0.7, 0.4)),
    ("哭", Pattern::new(BasicEmotion::Sadness, None, 0.8, -0.7, 0.6)),
    ("难过", Pattern::new(BasicEmotion::Sadness, None, 0.7, -0.6, 0.4)),
    ("生气", Pattern::new(BasicEmotion::Anger, None, 0.8, -0.6, 0.7)),
    ("害怕", Pattern::new(BasicEmotion::Fear, None, 0.7, -0.7, 0.8)),
    ("惊讶", Pattern::new(BasicEmotion::Surprise, None, 0.6, 0.0, 0.8)),
    (
        "不要",
        Pattern::new(BasicEmotion::Anger, Some(SecondaryEmotion::Frustration), 0.6, -0.4, 0.5),
    ),
    (
        "要",
        Pattern::new(BasicEmotion::Joy, Some(SecondaryEmotion::Excitement), 0.5, 0.4, 0.6),
    ),
    (
        "抱抱",
        Pattern::new(BasicEmotion::Joy, Some(SecondaryEmotion::Comfort), 0.7, 0.8, 0.3),
    ),
];

/// Valence/arousal associated with an observed activity
fn activity_dimensions(activity: &str) -> (f64, f64) {
    match activity {
        "playing" => (0.7, 0.8),
        "crying" => (-0.7, 0.6),
        "sleeping" => (0.2, -0.8),
        "eating" => (0.6, 0.3),
        "exploring" => (0.5, 0.9),
        _ => (0.0, 0.0),
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Stateless four-modality fusion engine
///
/// History lives with the caller (see [`EmotionHistory`]); the engine only
/// reads it for temporal smoothing.
#[derive(Debug, Clone, Default)]
pub struct EnhancedEmotionFusion {
    weights: EnhancedWeights,
}

impl EnhancedEmotionFusion {
    pub fn new(weights: EnhancedWeights) -> Self {
        Self { weights }
    }

    /// Run the full pipeline: per-modality analysis, weighted fusion,
    /// temporal smoothing against `history`, age adjustment
    ///
    /// The caller appends the returned value to the history.
    pub fn fuse(&self, input: &MultimodalInput, history: &EmotionHistory) -> EmotionFeatures {
        let text = input.text.as_deref().map(analyze_text);
        let voice = input.audio.as_ref().map(|a| analyze_voice(&a.features));
        let visual = input.video.as_ref().map(|v| self.analyze_visual(v));
        let behavioral = input.behavioral.as_ref().map(analyze_behavior);

        let fused = self.weighted_fusion(text, voice, visual, behavioral);
        let smoothed = self.temporal_smoothing(fused, history);
        let age = input.context.as_ref().map(|c| c.age).unwrap_or(0.0);
        let adjusted = adjust_for_age(smoothed, age);

        debug!(
            primary = adjusted.primary.as_str(),
            confidence = adjusted.confidence,
            valence = adjusted.valence,
            arousal = adjusted.arousal,
            history = history.len(),
            "Enhanced emotion fused"
        );

        adjusted
    }

    fn analyze_visual(&self, video: &VideoInput) -> ModalityReading {
        let facial = analyze_face(&video.facial);
        let body = analyze_body(&video.body);
        let (fw, bw) = (self.weights.facial, self.weights.body);

        ModalityReading {
            // The face decides the label; body language only shifts dimensions
            primary: facial.primary,
            secondary: None,
            intensity: facial.intensity * fw + body.intensity * bw,
            valence: facial.valence * fw + body.valence * bw,
            arousal: facial.arousal * fw + body.arousal * bw,
            confidence: 0.5,
        }
    }

    /// Blend the readings that are present
    pub fn weighted_fusion(
        &self,
        text: Option<ModalityReading>,
        voice: Option<ModalityReading>,
        visual: Option<ModalityReading>,
        behavioral: Option<ModalityReading>,
    ) -> EmotionFeatures {
        let w = self.weights.modalities;
        let readings: Vec<(f64, ModalityReading)> = [
            (w.text, text),
            (w.voice, voice),
            (w.visual, visual),
            (w.behavioral, behavioral),
        ]
        .into_iter()
        .filter_map(|(weight, reading)| reading.map(|r| (weight, r)))
        .collect();

        if readings.is_empty() {
            return EmotionFeatures::neutral();
        }

        let mut total_weight = 0.0;
        let mut valence = 0.0;
        let mut arousal = 0.0;
        let mut intensity = 0.0;
        let mut confidence = 0.0;
        let mut primary = BasicEmotion::Neutral;
        let mut secondary = None;

        for (weight, reading) in &readings {
            total_weight += weight;
            valence += reading.valence * weight;
            arousal += reading.arousal * weight;
            intensity += reading.intensity * weight;

            // First modality wins on equal confidence
            if reading.confidence > confidence {
                confidence = reading.confidence;
                primary = reading.primary;
                secondary = reading.secondary;
            }
        }

        let agreeing = readings.iter().filter(|(_, r)| r.primary == primary).count();
        if agreeing >= readings.len().div_ceil(2) {
            confidence = (confidence + AGREEMENT_BONUS).min(CONFIDENCE_CEILING);
        }

        let (intensity, valence, arousal) = if total_weight > 0.0 {
            (
                intensity / total_weight,
                valence / total_weight,
                arousal / total_weight,
            )
        } else {
            (0.3, 0.0, 0.0)
        };

        EmotionFeatures {
            primary,
            secondary,
            intensity,
            valence,
            arousal,
            confidence,
            modality_weights: ModalityWeights {
                text: if text.is_some() { w.text } else { 0.0 },
                voice: if voice.is_some() { w.voice } else { 0.0 },
                visual: if visual.is_some() { w.visual } else { 0.0 },
                behavioral: if behavioral.is_some() { w.behavioral } else { 0.0 },
            },
            timestamp: time::now_millis(),
        }
    }

    /// Pull valence/arousal toward the two most recent history entries
    pub fn temporal_smoothing(
        &self,
        emotion: EmotionFeatures,
        history: &EmotionHistory,
    ) -> EmotionFeatures {
        if history.is_empty() {
            return emotion;
        }

        let [current, previous, before] = self.weights.smoothing;
        let mut valence = emotion.valence * current;
        let mut arousal = emotion.arousal * current;
        let mut total = current;

        for (entry, weight) in history.recent().zip([previous, before]) {
            valence += entry.valence * weight;
            arousal += entry.arousal * weight;
            total += weight;
        }

        EmotionFeatures {
            valence: valence / total,
            arousal: arousal / total,
            confidence: (emotion.confidence + SMOOTHING_BONUS).min(CONFIDENCE_CEILING),
            ..emotion
        }
    }
}

// ============================================================================
// Per-modality analysers
// ============================================================================

/// Keyword analysis; confidence 0.7 on a match, 0.3 otherwise
pub fn analyze_text(text: &str) -> ModalityReading {
    let mut best: Option<Pattern> = None;
    for (keyword, pattern) in TEXT_KEYWORDS {
        let current = best.map(|p| p.intensity).unwrap_or(0.0);
        if text.contains(keyword) && pattern.intensity > current {
            best = Some(*pattern);
        }
    }

    match best {
        Some(pattern) => pattern.with_confidence(0.7),
        None => unrecognised(0.3),
    }
}

/// Acoustic pattern analysis; confidence 0.6 on a match, 0.2 otherwise
pub fn analyze_voice(features: &AudioFeatures) -> ModalityReading {
    let f = features;
    let candidates = [
        (
            f.pitch > 300.0 && f.energy > 0.7,
            (f.pitch / 500.0) * f.energy,
            Pattern::new(BasicEmotion::Joy, Some(SecondaryEmotion::Excitement), 0.8, 0.7, 0.9),
        ),
        (
            f.pitch < 200.0 && f.energy < 0.3,
            (1.0 - f.pitch / 500.0) * (1.0 - f.energy),
            Pattern::new(BasicEmotion::Sadness, None, 0.6, -0.6, -0.3),
        ),
        (
            f.volume_variability > 0.8,
            f.volume_variability,
            Pattern::new(BasicEmotion::Anger, Some(SecondaryEmotion::Frustration), 0.7, -0.5, 0.8),
        ),
        (
            f.breathiness > 0.6,
            f.breathiness,
            Pattern::new(BasicEmotion::Fear, Some(SecondaryEmotion::Anxiety), 0.6, -0.6, 0.7),
        ),
    ];

    let mut best: Option<(f64, Pattern)> = None;
    for (applies, score, pattern) in candidates {
        let current = best.map(|(s, _)| s).unwrap_or(0.0);
        if applies && score > current {
            best = Some((score, pattern));
        }
    }

    match best {
        Some((_, pattern)) => pattern.with_confidence(0.6),
        None => unrecognised(0.2),
    }
}

/// FACS rule cascade; first matching rule wins
fn analyze_face(features: &FacialFeatures) -> Pattern {
    if features.action_unit("AU06") + features.action_unit("AU12") > 0.5 {
        return Pattern::new(BasicEmotion::Joy, None, features.smile_intensity, 0.8, 0.6);
    }
    if features.action_unit("AU04") > 0.5 {
        return Pattern::new(BasicEmotion::Anger, None, features.brow_raise, -0.6, 0.7);
    }
    if features.action_unit("AU01") + features.action_unit("AU02") > 0.5 {
        return Pattern::new(BasicEmotion::Surprise, None, features.brow_raise, 0.1, 0.8);
    }
    if features.eye_openness < 0.3 && features.mouth_openness > 0.7 {
        return Pattern::new(BasicEmotion::Sadness, None, 0.8, -0.7, 0.6);
    }
    Pattern::NEUTRAL
}

fn analyze_body(features: &BodyLanguageFeatures) -> Pattern {
    if features.movement_level > 0.8 && features.hand_gestures.frequency > 0.7 {
        return Pattern::new(BasicEmotion::Joy, Some(SecondaryEmotion::Excitement), 0.7, 0.8, 0.9);
    }
    if features.posture == Posture::Slumped && features.movement_level < 0.2 {
        return Pattern::new(BasicEmotion::Sadness, None, 0.5, -0.5, -0.4);
    }
    if features.posture == Posture::Tense && features.personal_space > 0.8 {
        return Pattern::new(BasicEmotion::Fear, Some(SecondaryEmotion::Anxiety), 0.6, -0.6, 0.7);
    }
    Pattern::NEUTRAL
}

/// Attention level combined with the activity table; confidence 0.4
pub fn analyze_behavior(input: &BehavioralInput) -> ModalityReading {
    let attention = if input.attention > 0.8 {
        Pattern::new(BasicEmotion::Surprise, Some(SecondaryEmotion::Curiosity), 0.6, 0.4, 0.7)
    } else if input.attention < 0.2 {
        Pattern::new(BasicEmotion::Sadness, None, 0.4, -0.3, -0.5)
    } else {
        Pattern::new(BasicEmotion::Neutral, None, 0.2, 0.0, 0.0)
    };
    let (activity_valence, activity_arousal) = activity_dimensions(&input.activity);

    ModalityReading {
        primary: attention.primary,
        secondary: attention.secondary,
        intensity: attention.intensity.max(0.3),
        valence: (attention.valence + activity_valence) / 2.0,
        arousal: (attention.arousal + activity_arousal) / 2.0,
        confidence: 0.4,
    }
}

/// Infants (≤ 1 year) express more intensely but are harder to read;
/// toddlers (≤ 3 years) express more clearly
pub fn adjust_for_age(emotion: EmotionFeatures, age: f64) -> EmotionFeatures {
    if age <= 0.0 {
        emotion
    } else if age <= 1.0 {
        EmotionFeatures {
            intensity: (emotion.intensity * 1.2).min(1.0),
            confidence: emotion.confidence * 0.9,
            ..emotion
        }
    } else if age <= 3.0 {
        EmotionFeatures {
            confidence: (emotion.confidence * 1.1).min(1.0),
            ..emotion
        }
    } else {
        emotion
    }
}
