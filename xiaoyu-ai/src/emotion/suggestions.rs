//! Caregiver suggestions for a fused emotional state

use xiaoyu_common::{BasicEmotion, SecondaryEmotion};

use super::enhanced::EmotionFeatures;

/// Most suggestions returned for one result
pub const MAX_SUGGESTIONS: usize = 5;

/// Build caregiver suggestions
///
/// Lines for the primary emotion come first, then an age-specific line
/// (only when the caller reported an age), then a line for very intense
/// emotions. The list is truncated to [`MAX_SUGGESTIONS`].
pub fn caregiver_suggestions(emotion: &EmotionFeatures, age: Option<f64>) -> Vec<String> {
    let mut lines: Vec<&str> = Vec::new();

    match emotion.primary {
        BasicEmotion::Joy => {
            lines.push("宝宝现在很开心，这是很好的互动时机！");
            lines.push("可以延续这种愉快的情绪，一起做喜欢的游戏");
            if emotion.secondary == Some(SecondaryEmotion::Excitement) {
                lines.push("宝宝很兴奋，注意观察是否需要适当平静下来");
            }
        }
        BasicEmotion::Sadness => {
            lines.push("宝宝需要安慰，给一个温暖的拥抱");
            lines.push("轻声安抚，了解宝宝不开心的原因");
            if emotion.intensity > 0.7 {
                lines.push("情绪比较强烈，耐心陪伴和安抚很重要");
            }
        }
        BasicEmotion::Anger => {
            lines.push("保持冷静，理解宝宝的情绪表达");
            lines.push("帮助宝宝用语言表达需求和感受");
            if emotion.secondary == Some(SecondaryEmotion::Frustration) {
                lines.push("宝宝可能遇到了困难，给予适当的帮助和引导");
            }
        }
        BasicEmotion::Fear => {
            lines.push("给予安全感，让知道你在身边");
            lines.push("耐心解释，帮助理解令他害怕的事物");
            if emotion.secondary == Some(SecondaryEmotion::Anxiety) {
                lines.push("创造平静的环境，减少刺激");
            }
        }
        BasicEmotion::Surprise => {
            lines.push("这是学习的好机会，探索新事物");
            if emotion.secondary == Some(SecondaryEmotion::Curiosity) {
                lines.push("鼓励宝宝的探索欲望，提供安全的探索环境");
            }
        }
        BasicEmotion::Neutral => {
            lines.push("宝宝现在比较平静，适合进行温和的活动");
            lines.push("观察宝宝是否想要互动或需要独处");
        }
        BasicEmotion::Disgust => {}
    }

    match age {
        Some(age) if age > 0.0 && age <= 1.0 => {
            lines.push("婴儿期主要通过感官体验世界，多用声音、触觉安抚");
        }
        Some(age) if age > 0.0 && age <= 3.0 => {
            lines.push("幼儿开始学习情绪表达，帮助认识和命名各种情绪");
        }
        _ => {}
    }

    if emotion.intensity > 0.8 {
        lines.push("情绪比较强烈，需要更多的耐心和理解");
    }

    lines
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(str::to_string)
        .collect()
}
