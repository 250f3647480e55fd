use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One review per completed booking. Listing and guest are denormalized
/// from the booking and must agree with it (enforced by the validation
/// engine, backstopped by the UNIQUE constraint on booking_id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub booking_id: String,
    pub listing_id: String,
    pub guest_id: String,
    pub rating: i64,
    pub comment: String,
    pub created_at: NaiveDateTime,
}
