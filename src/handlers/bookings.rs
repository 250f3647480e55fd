use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::queries::{self, BookingFilter};
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus};
use crate::services::validation;
use crate::state::AppState;

// GET /api/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
    pub check_in_from: Option<NaiveDate>,
    pub check_in_to: Option<NaiveDate>,
    pub limit: Option<i64>,
}

pub async fn get_bookings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let filter = BookingFilter {
        status: query.status,
        check_in_from: query.check_in_from,
        check_in_to: query.check_in_to,
    };

    let db = state.db.lock().unwrap();
    let bookings = queries::get_bookings(&db, &filter, query.limit.unwrap_or(100))?;
    Ok(Json(bookings))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let db = state.db.lock().unwrap();
    let booking = queries::get_booking_by_id(&db, &id)?
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;
    Ok(Json(booking))
}

// POST /api/bookings
#[derive(Deserialize)]
pub struct CreateBooking {
    pub listing_id: String,
    pub guest_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i64,
    pub special_requests: Option<String>,
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateBooking>,
) -> Result<Json<Booking>, AppError> {
    let db = state.db.lock().unwrap();

    let listing = queries::get_listing_by_id(&db, &payload.listing_id)?.ok_or_else(|| {
        AppError::ReferentialIntegrity(format!("listing {} does not exist", payload.listing_id))
    })?;
    let guest = queries::get_user_by_id(&db, &payload.guest_id)?.ok_or_else(|| {
        AppError::ReferentialIntegrity(format!("guest {} does not exist", payload.guest_id))
    })?;
    if !guest.is_guest {
        return Err(AppError::ReferentialIntegrity(format!(
            "user {} is not a guest",
            guest.id
        )));
    }

    let now = Utc::now().naive_utc();
    let candidate = Booking {
        id: Uuid::new_v4().to_string(),
        listing_id: payload.listing_id,
        guest_id: payload.guest_id,
        check_in: payload.check_in,
        check_out: payload.check_out,
        guests: payload.guests,
        total_price: 0.0,
        status: BookingStatus::Pending,
        special_requests: payload.special_requests,
        created_at: now,
        updated_at: now,
    };

    // The validation engine fills in the derived total price.
    let booking = validation::validate_booking(candidate, &listing, Utc::now().date_naive())
        .map_err(AppError::Validation)?;
    queries::create_booking(&db, &booking)?;
    Ok(Json(booking))
}

// POST /api/bookings/:id/confirm | /complete | /cancel
pub async fn confirm_booking(
    state: State<Arc<AppState>>,
    path: Path<String>,
) -> Result<Json<Booking>, AppError> {
    transition_booking(state, path, BookingStatus::Confirmed).await
}

pub async fn complete_booking(
    state: State<Arc<AppState>>,
    path: Path<String>,
) -> Result<Json<Booking>, AppError> {
    transition_booking(state, path, BookingStatus::Completed).await
}

pub async fn cancel_booking(
    state: State<Arc<AppState>>,
    path: Path<String>,
) -> Result<Json<Booking>, AppError> {
    transition_booking(state, path, BookingStatus::Canceled).await
}

async fn transition_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    next: BookingStatus,
) -> Result<Json<Booking>, AppError> {
    let db = state.db.lock().unwrap();
    let mut booking = queries::get_booking_by_id(&db, &id)?
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;

    booking.transition_to(next)?;
    queries::update_booking_status(&db, &id, &booking.status)?;
    Ok(Json(booking))
}
