//! # Xiaoyu Common Library
//!
//! Shared code for the Xiaoyu companion services including:
//! - Emotion vocabulary (labels, infant labels, basic/secondary emotions)
//! - Configuration loading
//! - Error types
//! - Timestamp helpers

pub mod config;
pub mod emotion;
pub mod error;
pub mod time;

pub use emotion::{BasicEmotion, EmotionLabel, InfantEmotion, SecondaryEmotion};
pub use error::{Error, Result};
