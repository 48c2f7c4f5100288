//! Keyword emotion classifier
//!
//! Maps free text to one of seven conversational labels by counting
//! dictionary keywords found as plain substrings of the input (no
//! tokenisation, case-sensitive). The label with the most hits wins; ties go
//! to the label declared first in the lexicon.

use serde::{Deserialize, Serialize};
use tracing::debug;
use xiaoyu_common::EmotionLabel;

/// Confidence reported when no keyword matched
const NO_MATCH_CONFIDENCE: f64 = 0.3;
/// Confidence added per matched keyword of the winning label
const CONFIDENCE_PER_MATCH: f64 = 0.25;
/// Upper bound for keyword-derived confidence
const MAX_CONFIDENCE: f64 = 0.95;

/// Emotion detected in a piece of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionObservation {
    #[serde(rename = "type")]
    pub label: EmotionLabel,
    /// 0.0-1.0
    pub confidence: f64,
    /// -1.0 (negative) to 1.0 (positive)
    pub valence: f64,
    /// 0.0 (calm) to 1.0 (agitated)
    pub arousal: f64,
    /// Matched keywords in first-seen order
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// One lexicon row: a label, its keywords and its fixed dimensions
#[derive(Debug, Clone)]
pub struct LexiconEntry {
    pub label: EmotionLabel,
    pub words: Vec<String>,
    pub valence: f64,
    pub arousal: f64,
    pub advice: String,
}

impl LexiconEntry {
    fn new(
        label: EmotionLabel,
        words: &[&str],
        valence: f64,
        arousal: f64,
        advice: &str,
    ) -> Self {
        Self {
            label,
            words: words.iter().map(|w| w.to_string()).collect(),
            valence,
            arousal,
            advice: advice.to_string(),
        }
    }
}

/// Read-only keyword dictionary, built once and shared
#[derive(Debug, Clone)]
pub struct EmotionLexicon {
    entries: Vec<LexiconEntry>,
}

impl EmotionLexicon {
    /// Build a lexicon from explicit entries
    ///
    /// Declaration order decides ties. A `Neutral` entry is appended when
    /// missing so the no-match result always has dimensions and advice.
    pub fn new(mut entries: Vec<LexiconEntry>) -> Self {
        if !entries.iter().any(|e| e.label == EmotionLabel::Neutral) {
            entries.push(Self::neutral_entry());
        }
        Self { entries }
    }

    fn neutral_entry() -> LexiconEntry {
        LexiconEntry::new(
            EmotionLabel::Neutral,
            &[],
            0.0,
            0.5,
            "今天的状态还不错。可以尝试做一些喜欢的事情，让心情更愉悦一些。",
        )
    }

    pub fn entries(&self) -> &[LexiconEntry] {
        &self.entries
    }

    /// Entry for `label`, falling back to the neutral entry
    pub fn entry(&self, label: EmotionLabel) -> &LexiconEntry {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .or_else(|| self.entries.iter().find(|e| e.label == EmotionLabel::Neutral))
            .unwrap_or(&self.entries[0])
    }
}

impl Default for EmotionLexicon {
    fn default() -> Self {
        Self::new(vec![
            LexiconEntry::new(
                EmotionLabel::Happy,
                &["开心", "高兴", "快乐", "哈哈", "棒", "好", "喜欢", "爱", "赞", "耶", "太好了"],
                0.8,
                0.6,
                "保持这种积极的心态，继续努力！可以和家人分享你的快乐哦~",
            ),
            LexiconEntry::new(
                EmotionLabel::Sad,
                &["难过", "伤心", "哭", "失望", "不开心", "郁闷", "沮丧", "悲伤"],
                -0.7,
                0.4,
                "遇到困难是正常的，不要灰心。深呼吸，休息一下，或者找人聊聊天会有帮助的。",
            ),
            LexiconEntry::new(
                EmotionLabel::Angry,
                &["生气", "愤怒", "讨厌", "烦", "恼火", "火大", "气死了"],
                -0.8,
                0.9,
                "感到生气时，先让自己冷静下来。可以数到10，或者去喝杯水。平静后再处理问题会更好。",
            ),
            LexiconEntry::new(
                EmotionLabel::Excited,
                &["兴奋", "激动", "太棒了", "超级", "amazing", "精彩"],
                0.9,
                0.95,
                "你的热情真棒！记得合理安排时间，保持这份激情的同时也要注意休息。",
            ),
            LexiconEntry::new(
                EmotionLabel::Calm,
                &["平静", "放松", "舒服", "安静", "淡定", "还好"],
                0.3,
                0.2,
                "平和的心态很好，继续保持。这是学习和思考的最佳状态。",
            ),
            LexiconEntry::new(
                EmotionLabel::Anxious,
                &["紧张", "担心", "焦虑", "害怕", "怕", "不安", "忧虑"],
                -0.5,
                0.8,
                "感到紧张是正常的。试着做几次深呼吸，把大任务分成小步骤，一步步来就不会那么害怕了。",
            ),
            Self::neutral_entry(),
        ])
    }
}

/// Stateless keyword classifier over an [`EmotionLexicon`]
#[derive(Debug, Clone, Default)]
pub struct EmotionClassifier {
    lexicon: EmotionLexicon,
}

impl EmotionClassifier {
    pub fn new(lexicon: EmotionLexicon) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &EmotionLexicon {
        &self.lexicon
    }

    /// Classify `text`; never fails
    pub fn classify(&self, text: &str) -> EmotionObservation {
        let mut keywords: Vec<String> = Vec::new();
        let mut best: Option<(&LexiconEntry, usize)> = None;

        for entry in self.lexicon.entries() {
            let mut score = 0;
            for word in &entry.words {
                if text.contains(word.as_str()) {
                    score += 1;
                    if !keywords.iter().any(|k| k == word) {
                        keywords.push(word.clone());
                    }
                }
            }
            // Strictly greater keeps the first-declared label on ties
            if score > best.map(|(_, s)| s).unwrap_or(0) {
                best = Some((entry, score));
            }
        }

        let observation = match best {
            Some((entry, score)) => EmotionObservation {
                label: entry.label,
                confidence: (score as f64 * CONFIDENCE_PER_MATCH).min(MAX_CONFIDENCE),
                valence: entry.valence,
                arousal: entry.arousal,
                keywords,
            },
            None => {
                let neutral = self.lexicon.entry(EmotionLabel::Neutral);
                EmotionObservation {
                    label: EmotionLabel::Neutral,
                    confidence: NO_MATCH_CONFIDENCE,
                    valence: neutral.valence,
                    arousal: neutral.arousal,
                    keywords: Vec::new(),
                }
            }
        };

        debug!(
            label = %observation.label,
            confidence = observation.confidence,
            keywords = observation.keywords.len(),
            "Text emotion classified"
        );

        observation
    }

    /// Fixed advice line for `label` (neutral advice for labels without one)
    pub fn advice(&self, label: EmotionLabel) -> &str {
        &self.lexicon.entry(label).advice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_scenario() {
        let classifier = EmotionClassifier::default();
        let result = classifier.classify("今天我很开心，哈哈");

        assert_eq!(result.label, EmotionLabel::Happy);
        assert_eq!(result.keywords, vec!["开心", "哈哈"]);
        assert!((result.confidence - 0.5).abs() < 1e-9);
        assert_eq!(result.valence, 0.8);
        assert_eq!(result.arousal, 0.6);
    }

    #[test]
    fn test_empty_text_is_neutral() {
        let classifier = EmotionClassifier::default();
        let result = classifier.classify("");

        assert_eq!(result.label, EmotionLabel::Neutral);
        assert_eq!(result.confidence, 0.3);
        assert!(result.keywords.is_empty());
        assert_eq!(result.valence, 0.0);
        assert_eq!(result.arousal, 0.5);
    }

    #[test]
    fn test_no_keyword_text_is_neutral() {
        let classifier = EmotionClassifier::default();
        let result = classifier.classify("今天去了图书馆");
        assert_eq!(result.label, EmotionLabel::Neutral);
        assert_eq!(result.confidence, 0.3);
        assert!(result.keywords.is_empty());
    }

    #[test]
    fn test_angry_detection() {
        let classifier = EmotionClassifier::default();
        let result = classifier.classify("我很生气");
        assert_eq!(result.label, EmotionLabel::Angry);
        assert_eq!(result.keywords, vec!["生气"]);
        assert!((result.confidence - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_tie_goes_to_first_declared_label() {
        let classifier = EmotionClassifier::default();
        // One happy keyword (开心) and one anxious keyword (担心)
        let result = classifier.classify("开心又担心");
        assert_eq!(result.label, EmotionLabel::Happy);
        assert_eq!(result.keywords, vec!["开心", "担心"]);
    }

    #[test]
    fn test_keywords_collected_across_labels() {
        let classifier = EmotionClassifier::default();
        // 不开心 is a sad keyword but also contains the happy keyword 开心
        let result = classifier.classify("我不开心");
        assert_eq!(result.label, EmotionLabel::Happy);
        assert_eq!(result.keywords, vec!["开心", "不开心"]);
    }

    #[test]
    fn test_confidence_capped() {
        let classifier = EmotionClassifier::default();
        let result = classifier.classify("开心高兴快乐哈哈棒好喜欢爱");
        assert_eq!(result.label, EmotionLabel::Happy);
        assert_eq!(result.confidence, 0.95);
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let classifier = EmotionClassifier::default();
        assert_eq!(classifier.classify("amazing").label, EmotionLabel::Excited);
        assert_eq!(classifier.classify("AMAZING").label, EmotionLabel::Neutral);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let classifier = EmotionClassifier::default();
        let text = "有点紧张，但是也很兴奋";
        assert_eq!(classifier.classify(text), classifier.classify(text));
    }

    #[test]
    fn test_confidence_bounds_over_samples() {
        let classifier = EmotionClassifier::default();
        for text in ["开心", "难过又伤心", "平静", "哈哈哈", "随便说说", "讨厌讨厌"] {
            let result = classifier.classify(text);
            assert!(result.confidence >= 0.25 && result.confidence <= 0.95);
        }
    }

    #[test]
    fn test_advice_lookup_with_fallback() {
        let classifier = EmotionClassifier::default();
        assert!(classifier.advice(EmotionLabel::Angry).starts_with("感到生气时"));
        // Labels outside the classifier set fall back to the neutral advice
        assert_eq!(
            classifier.advice(EmotionLabel::Tired),
            classifier.advice(EmotionLabel::Neutral)
        );
    }

    #[test]
    fn test_custom_lexicon_gets_neutral_entry() {
        let lexicon = EmotionLexicon::new(vec![LexiconEntry::new(
            EmotionLabel::Curious,
            &["为什么"],
            0.6,
            0.5,
            "一起找答案吧",
        )]);
        let classifier = EmotionClassifier::new(lexicon);
        assert_eq!(classifier.classify("为什么天是蓝的").label, EmotionLabel::Curious);
        assert_eq!(classifier.classify("嗯").label, EmotionLabel::Neutral);
    }
}
