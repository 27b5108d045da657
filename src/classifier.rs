use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Sentiment label assigned to a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown sentiment label: {0:?}")]
pub struct UnknownSentiment(pub String);

impl FromStr for Sentiment {
    type Err = UnknownSentiment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sentiment::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| UnknownSentiment(s.to_string()))
    }
}

/// How a keyword fragment has to appear in the text to count as a hit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Fragment may appear anywhere, even inside another word.
    #[default]
    Substring,
    /// Fragment must start at a word boundary.
    WordPrefix,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexiconError {
    #[error("keyword label {0:?} is not one of positive, negative")]
    UnsupportedLabel(String),
    #[error("empty keyword under label {0}")]
    EmptyKeyword(Sentiment),
}

/// Keyword lists used by the classifier.
///
/// Positive keywords are always checked before negative ones, so a text that
/// carries both is classified as positive.
#[derive(Debug, Clone)]
pub struct Lexicon {
    mode: MatchMode,
    positive: Vec<String>,
    negative: Vec<String>,
}

impl Lexicon {
    /// Build a lexicon from a `label -> fragments` mapping.
    pub fn new(
        mode: MatchMode,
        keywords: &BTreeMap<String, Vec<String>>,
    ) -> Result<Self, LexiconError> {
        let mut positive = Vec::new();
        let mut negative = Vec::new();

        for (label, fragments) in keywords {
            let (sentiment, target) = match label.parse::<Sentiment>() {
                Ok(Sentiment::Positive) => (Sentiment::Positive, &mut positive),
                Ok(Sentiment::Negative) => (Sentiment::Negative, &mut negative),
                _ => return Err(LexiconError::UnsupportedLabel(label.clone())),
            };
            for fragment in fragments {
                let fragment = fragment.trim().to_lowercase();
                if fragment.is_empty() {
                    return Err(LexiconError::EmptyKeyword(sentiment));
                }
                target.push(fragment);
            }
        }

        Ok(Self {
            mode,
            positive,
            negative,
        })
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn keywords(&self, sentiment: Sentiment) -> &[String] {
        match sentiment {
            Sentiment::Positive => &self.positive,
            Sentiment::Negative => &self.negative,
            Sentiment::Neutral => &[],
        }
    }

    /// Classify a piece of text. Total over all inputs, empty text is neutral.
    pub fn classify(&self, text: &str) -> Sentiment {
        let lowered = text.to_lowercase();

        if self.any_match(&lowered, &self.positive) {
            Sentiment::Positive
        } else if self.any_match(&lowered, &self.negative) {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }

    fn any_match(&self, text: &str, fragments: &[String]) -> bool {
        fragments.iter().any(|fragment| match self.mode {
            MatchMode::Substring => text.contains(fragment.as_str()),
            MatchMode::WordPrefix => word_starts(text)
                .any(|idx| text[idx..].starts_with(fragment.as_str())),
        })
    }
}

/// Byte offsets where a word can begin: the start of the text and every
/// character not preceded by a letter or digit.
fn word_starts(text: &str) -> impl Iterator<Item = usize> + '_ {
    let mut prev_alnum = false;
    text.char_indices().filter_map(move |(idx, c)| {
        let starts = !prev_alnum;
        prev_alnum = c.is_alphanumeric();
        starts.then_some(idx)
    })
}

const DEFAULT_POSITIVE: &[&str] = &["хорош", "люблю"];
const DEFAULT_NEGATIVE: &[&str] = &["плохо", "ненавиж"];

fn owned(fragments: &[&str]) -> Vec<String> {
    fragments.iter().map(|s| s.to_string()).collect()
}

/// Default keyword lists for a Russian-language deployment
pub fn default_keywords() -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([
        (Sentiment::Positive.to_string(), owned(DEFAULT_POSITIVE)),
        (Sentiment::Negative.to_string(), owned(DEFAULT_NEGATIVE)),
    ])
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            mode: MatchMode::default(),
            positive: owned(DEFAULT_POSITIVE),
            negative: owned(DEFAULT_NEGATIVE),
        }
    }
}
