use crate::api::handlers::{run_blocking, AppError};
use crate::api::models::*;
use crate::storage::Review;
use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{SecondsFormat, Utc};
use tracing::{debug, info};

pub async fn submit_review_handler(
    State(state): State<AppState>,
    payload: Result<Json<SubmitReviewRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    // Validate
    let Json(request) = payload.map_err(|e| {
        debug!(error = %e, "Rejected review payload");
        AppError::InvalidInput(MSG_EMPTY_TEXT.to_string())
    })?;
    let text = request.into_text().map_err(AppError::InvalidInput)?;

    // Classify
    let sentiment = state.lexicon.classify(&text);
    let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

    // Store
    let id = {
        let store = state.store.clone();
        let text = text.clone();
        let created_at = created_at.clone();
        run_blocking(move || store.insert(&text, sentiment, &created_at)).await?
    };

    info!(id, %sentiment, "Review added");

    Ok((
        StatusCode::CREATED,
        Json(Review {
            id,
            text,
            sentiment,
            created_at,
        }),
    ))
}

pub async fn list_reviews_handler(
    State(state): State<AppState>,
    params: Result<Query<ListReviewsParams>, QueryRejection>,
) -> Result<Json<Vec<Review>>, AppError> {
    let Query(params) =
        params.map_err(|_| AppError::InvalidInput(MSG_INVALID_SENTIMENT.to_string()))?;
    let filter = params.sentiment_filter().map_err(AppError::InvalidInput)?;

    let store = state.store.clone();
    let reviews = run_blocking(move || store.list(filter)).await?;

    info!(filter = ?filter, found = reviews.len(), "Listed reviews");

    Ok(Json(reviews))
}
