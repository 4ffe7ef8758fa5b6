use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// Per-word judgement against the expected prompt
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenVerdict {
    pub token: String,
    pub outcome: Outcome,
}

/// Result of comparing an observed transcript against an expected prompt.
/// One verdict per expected token, in prompt order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub score: f64,
    pub verdicts: Vec<TokenVerdict>,
}

impl ScoringResult {
    pub fn matched(&self) -> usize {
        self.verdicts
            .iter()
            .filter(|v| v.outcome == Outcome::Correct)
            .count()
    }

    pub fn expected_len(&self) -> usize {
        self.verdicts.len()
    }

    pub fn is_perfect(&self) -> bool {
        !self.verdicts.is_empty() && self.matched() == self.verdicts.len()
    }
}

/// Lowercase, strip anything that is not alphanumeric or whitespace, and
/// split into words. Empty tokens are discarded, so punctuation-only input
/// normalizes to an empty sequence.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    cleaned.split_whitespace().map(str::to_string).collect()
}

/// Score an observed transcript against the expected prompt using greedy
/// monotonic subsequence matching.
///
/// Each expected token scans the observed tokens strictly after the last
/// match; a hit consumes that position, so repeated expected words need
/// repeated observed words and out-of-order words stay unmatched. Extra
/// observed words are never penalized. This is intentionally not
/// edit-distance alignment: interim ASR transcripts get re-scored on every
/// update, so the comparison has to stay cheap and tolerate insertions.
///
/// Total function: any input (including empty strings) yields a result,
/// with score 0.0 when the expected text has no tokens.
pub fn score(expected: &str, observed: &str) -> ScoringResult {
    let expected_tokens = tokenize(expected);
    let observed_tokens = tokenize(observed);

    let mut verdicts = Vec::with_capacity(expected_tokens.len());
    let mut last_matched: Option<usize> = None;
    let mut matched = 0;

    for token in &expected_tokens {
        let start = last_matched.map_or(0, |i| i + 1);
        let hit = observed_tokens
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, w)| *w == token)
            .map(|(i, _)| i);

        let outcome = match hit {
            Some(i) => {
                last_matched = Some(i);
                matched += 1;
                Outcome::Correct
            }
            None => Outcome::Incorrect,
        };

        verdicts.push(TokenVerdict {
            token: token.clone(),
            outcome,
        });
    }

    let score = if expected_tokens.is_empty() {
        0.0
    } else {
        matched as f64 / expected_tokens.len() as f64
    };

    ScoringResult { score, verdicts }
}
