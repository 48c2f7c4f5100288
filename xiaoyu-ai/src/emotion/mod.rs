//! Emotion analysis
//!
//! - `classifier`: keyword classification of free text
//! - `fusion`: text + voice fusion with caregiver recommendations
//! - `enhanced`: four-modality fusion with temporal smoothing
//! - `history`: bounded per-session history and trends
//! - `suggestions`: caregiver suggestions for enhanced results

pub mod classifier;
pub mod enhanced;
pub mod fusion;
pub mod history;
pub mod suggestions;

pub use classifier::{EmotionClassifier, EmotionLexicon, EmotionObservation, LexiconEntry};
pub use enhanced::{EmotionFeatures, EnhancedEmotionFusion, MultimodalInput};
pub use fusion::{FusedEmotionResult, MultimodalFusion, VoiceEmotionObservation};
pub use history::{EmotionHistory, EmotionTrends, SessionHistories, DEFAULT_SESSION};
pub use suggestions::caregiver_suggestions;
