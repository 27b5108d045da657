use crate::classifier::{Lexicon, Sentiment};
use crate::storage::ReviewStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ReviewStore>,
    pub lexicon: Arc<Lexicon>,
}

impl AppState {
    pub fn new(store: ReviewStore, lexicon: Lexicon) -> Self {
        Self {
            store: Arc::new(store),
            lexicon: Arc::new(lexicon),
        }
    }
}

/// Request to submit a new review
#[derive(Debug, Deserialize)]
pub struct SubmitReviewRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// Query parameters for listing reviews
#[derive(Debug, Deserialize)]
pub struct ListReviewsParams {
    pub sentiment: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub total_reviews: usize,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

pub const MSG_EMPTY_TEXT: &str = "Добавьте отзыв";
pub const MSG_INVALID_SENTIMENT: &str = "В запросе передан невалидный тип отзыва";
pub const MSG_STORAGE_FAILURE: &str = "Не удалось обратиться к хранилищу отзывов";

impl SubmitReviewRequest {
    /// Validate the request and hand back the review text.
    ///
    /// Whitespace-only text counts as empty; accepted text is kept verbatim.
    pub fn into_text(self) -> Result<String, String> {
        match self.text {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(MSG_EMPTY_TEXT.to_string()),
        }
    }
}

impl ListReviewsParams {
    /// Parse the optional filter. An empty value means no filter.
    pub fn sentiment_filter(&self) -> Result<Option<Sentiment>, String> {
        match self.sentiment.as_deref() {
            None | Some("") => Ok(None),
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|_| MSG_INVALID_SENTIMENT.to_string()),
        }
    }
}
