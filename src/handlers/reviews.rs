use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Review;
use crate::services::validation;
use crate::state::AppState;

// POST /api/reviews
#[derive(Deserialize)]
pub struct CreateReview {
    pub booking_id: String,
    pub rating: i64,
    pub comment: String,
}

pub async fn create_review(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateReview>,
) -> Result<Json<Review>, AppError> {
    let db = state.db.lock().unwrap();

    let booking = queries::get_booking_by_id(&db, &payload.booking_id)?.ok_or_else(|| {
        AppError::ReferentialIntegrity(format!("booking {} does not exist", payload.booking_id))
    })?;
    let already_reviewed = queries::review_exists_for_booking(&db, &booking.id)?;

    // Listing and guest are denormalized from the booking itself.
    let review = Review {
        id: Uuid::new_v4().to_string(),
        booking_id: booking.id.clone(),
        listing_id: booking.listing_id.clone(),
        guest_id: booking.guest_id.clone(),
        rating: payload.rating,
        comment: payload.comment,
        created_at: Utc::now().naive_utc(),
    };

    validation::validate_review(&review, &booking, already_reviewed)
        .map_err(AppError::Validation)?;
    queries::create_review(&db, &review)?;
    Ok(Json(review))
}

// GET /api/reviews
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Review>>, AppError> {
    let db = state.db.lock().unwrap();
    let reviews = queries::list_reviews(&db)?;
    Ok(Json(reviews))
}
