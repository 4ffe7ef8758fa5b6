use serde::{Deserialize, Serialize};

/// Points awarded for each correct quiz answer, spelled word, or matched
/// pair. Flashcard runs report percent-known instead.
pub const POINTS_PER_CORRECT: u32 = 10;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActivityKind {
    Flashcards,
    Quiz,
    Spelling,
    WordMatch,
    Pronunciation,
}

impl std::str::FromStr for ActivityKind {
    type Err = UnknownActivityKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flashcards" => Ok(ActivityKind::Flashcards),
            "quiz" => Ok(ActivityKind::Quiz),
            "spelling" => Ok(ActivityKind::Spelling),
            "word_match" => Ok(ActivityKind::WordMatch),
            "pronunciation" => Ok(ActivityKind::Pronunciation),
            other => Err(UnknownActivityKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown activity kind: {0}")]
pub struct UnknownActivityKind(pub String);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    pub answer: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpellingWord {
    pub word: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WordPair {
    pub left: String,
    pub right: String,
}

/// Content for one activity, one variant per activity type, each carrying
/// only what its scoring needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivityContent {
    Flashcards { cards: Vec<Flashcard> },
    Quiz { questions: Vec<QuizQuestion> },
    Spelling { words: Vec<SpellingWord> },
    WordMatch { pairs: Vec<WordPair> },
    Pronunciation { prompts: Vec<String> },
}

impl ActivityContent {
    pub fn kind(&self) -> ActivityKind {
        match self {
            ActivityContent::Flashcards { .. } => ActivityKind::Flashcards,
            ActivityContent::Quiz { .. } => ActivityKind::Quiz,
            ActivityContent::Spelling { .. } => ActivityKind::Spelling,
            ActivityContent::WordMatch { .. } => ActivityKind::WordMatch,
            ActivityContent::Pronunciation { .. } => ActivityKind::Pronunciation,
        }
    }

    /// Number of playable items. Zero means the activity has no content yet
    /// and cannot be played.
    pub fn len(&self) -> usize {
        match self {
            ActivityContent::Flashcards { cards } => cards.len(),
            ActivityContent::Quiz { questions } => questions.len(),
            ActivityContent::Spelling { words } => words.len(),
            ActivityContent::WordMatch { pairs } => pairs.len(),
            ActivityContent::Pronunciation { prompts } => prompts.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Highest score reachable for this content: points for item-based
    /// activities, percent for flashcards and pronunciation.
    pub fn max_score(&self) -> u32 {
        match self {
            ActivityContent::Flashcards { .. } | ActivityContent::Pronunciation { .. } => 100,
            other => other.len() as u32 * POINTS_PER_CORRECT,
        }
    }
}

/// Score for item-based activities (quiz, spelling, word match).
pub fn points_score(correct_items: usize) -> u32 {
    correct_items as u32 * POINTS_PER_CORRECT
}

/// Flashcard result: percent of cards the learner marked as known,
/// rounded to the nearest whole percent. Zero cards scores zero.
pub fn percent_known(known: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((known as f64 / total as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz_content() -> ActivityContent {
        ActivityContent::Quiz {
            questions: vec![QuizQuestion {
                question: "Which word is a noun?".to_string(),
                options: vec![
                    "run".to_string(),
                    "table".to_string(),
                    "quickly".to_string(),
                    "blue".to_string(),
                ],
                answer: 1,
                explanation: Some("A noun names a thing.".to_string()),
            }],
        }
    }

    #[test]
    fn test_kind_and_len() {
        let content = quiz_content();
        assert_eq!(content.kind(), ActivityKind::Quiz);
        assert_eq!(content.len(), 1);
        assert!(!content.is_empty());
    }

    #[test]
    fn test_empty_content_is_unplayable() {
        let content = ActivityContent::Spelling { words: vec![] };
        assert!(content.is_empty());
        assert_eq!(content.max_score(), 0);
    }

    #[test]
    fn test_max_score_item_based() {
        let content = ActivityContent::WordMatch {
            pairs: vec![
                WordPair {
                    left: "big".to_string(),
                    right: "large".to_string(),
                },
                WordPair {
                    left: "small".to_string(),
                    right: "tiny".to_string(),
                },
            ],
        };
        assert_eq!(content.max_score(), 20);
    }

    #[test]
    fn test_max_score_percent_based() {
        let content = ActivityContent::Flashcards {
            cards: vec![Flashcard {
                front: "cat".to_string(),
                back: "a small domesticated feline".to_string(),
            }],
        };
        assert_eq!(content.max_score(), 100);
    }

    #[test]
    fn test_points_score() {
        assert_eq!(points_score(0), 0);
        assert_eq!(points_score(3), 30);
    }

    #[test]
    fn test_percent_known() {
        assert_eq!(percent_known(0, 0), 0);
        assert_eq!(percent_known(0, 4), 0);
        assert_eq!(percent_known(1, 3), 33);
        assert_eq!(percent_known(2, 3), 67);
        assert_eq!(percent_known(4, 4), 100);
    }

    #[test]
    fn test_content_json_round_trip() {
        let content = quiz_content();
        let json = serde_json::to_string(&content).unwrap();
        assert!(json.contains(r#""type":"quiz""#));
        let back: ActivityContent = serde_json::from_str(&json).unwrap();
        assert_eq!(content, back);
    }

    #[test]
    fn test_kind_display_for_reporting() {
        assert_eq!(ActivityKind::WordMatch.to_string(), "word_match");
        assert_eq!(ActivityKind::Pronunciation.to_string(), "pronunciation");
    }

    #[test]
    fn test_kind_display_parse_round_trip() {
        use std::str::FromStr;

        let kinds = [
            ActivityKind::Flashcards,
            ActivityKind::Quiz,
            ActivityKind::Spelling,
            ActivityKind::WordMatch,
            ActivityKind::Pronunciation,
        ];
        for kind in kinds {
            assert_eq!(ActivityKind::from_str(&kind.to_string()), Ok(kind));
        }
        assert!(ActivityKind::from_str("karaoke").is_err());
    }

    #[test]
    fn test_optional_fields_can_be_omitted_in_json() {
        let json = r#"{"type":"spelling","words":[{"word":"necessary"}]}"#;
        let content: ActivityContent = serde_json::from_str(json).unwrap();
        match content {
            ActivityContent::Spelling { words } => {
                assert_eq!(words[0].word, "necessary");
                assert_eq!(words[0].hint, None);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
