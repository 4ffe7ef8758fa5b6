use crate::scoring::{score, ScoringResult};
use serde::Serialize;
use std::fmt;

/// Qualitative band for a [0,1] score, using the thresholds shown to
/// learners next to their percentage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Average,
    NeedsWork,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            ScoreBand::Excellent
        } else if score >= 0.8 {
            ScoreBand::Good
        } else if score >= 0.7 {
            ScoreBand::Fair
        } else if score >= 0.6 {
            ScoreBand::Average
        } else {
            ScoreBand::NeedsWork
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScoreBand::Excellent => "excellent",
            ScoreBand::Good => "good",
            ScoreBand::Fair => "fair",
            ScoreBand::Average => "average",
            ScoreBand::NeedsWork => "needs work",
        };
        write!(f, "{label}")
    }
}

/// Live state of one pronunciation (or read-aloud typing) drill.
///
/// Recognition engines emit a stream of interim transcripts before settling
/// on a final one; each is re-scored as it arrives and the best result is
/// kept, so a flaky late transcript cannot erase an earlier good read.
#[derive(Debug)]
pub struct PronunciationDrill {
    prompt: String,
    best: Option<ScoringResult>,
    last: Option<ScoringResult>,
    last_transcript: Option<String>,
    attempts: usize,
}

impl PronunciationDrill {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            best: None,
            last: None,
            last_transcript: None,
            attempts: 0,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn last_transcript(&self) -> Option<&str> {
        self.last_transcript.as_deref()
    }

    pub fn last_result(&self) -> Option<&ScoringResult> {
        self.last.as_ref()
    }

    pub fn best_result(&self) -> Option<&ScoringResult> {
        self.best.as_ref()
    }

    /// Best score seen so far, 0.0 before any transcript arrived.
    pub fn best_score(&self) -> f64 {
        self.best.as_ref().map_or(0.0, |r| r.score)
    }

    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_score(self.best_score())
    }

    /// Score one observed transcript against the prompt and fold it into the
    /// drill state. Returns the result for this transcript.
    pub fn observe(&mut self, transcript: &str) -> ScoringResult {
        let result = score(&self.prompt, transcript);
        self.attempts += 1;
        self.last_transcript = Some(transcript.to_string());
        self.last = Some(result.clone());

        let improved = self.best.as_ref().map_or(true, |b| result.score > b.score);
        if improved {
            self.best = Some(result.clone());
        }

        result
    }

    pub fn passed(&self, threshold: f64) -> bool {
        self.attempts > 0 && self.best_score() >= threshold
    }

    /// Final score on the backend's 0-100 scale.
    pub fn final_score(&self) -> f64 {
        (self.best_score() * 100.0).round()
    }

    /// Start over on the same prompt.
    pub fn restart(&mut self) {
        self.best = None;
        self.last = None;
        self.last_transcript = None;
        self.attempts = 0;
    }
}
