use chrono::NaiveDate;

use crate::errors::Violation;
use crate::models::{Booking, BookingStatus, Listing, PropertyType, Review};

/// Checks a listing against every field rule. No I/O, no persistence.
pub fn validate_listing(listing: &Listing) -> Result<(), Vec<Violation>> {
    let mut violations = vec![];

    if listing.price_per_night <= 0.0 {
        violations.push(Violation::new(
            "price_per_night",
            "nightly price must be greater than zero",
        ));
    }
    if listing.max_guests < 1 {
        violations.push(Violation::new(
            "max_guests",
            "guest capacity must be at least 1",
        ));
    }
    if listing.bedrooms < 0 {
        violations.push(Violation::new("bedrooms", "bedroom count cannot be negative"));
    }
    if listing.bathrooms < 0 {
        violations.push(Violation::new(
            "bathrooms",
            "bathroom count cannot be negative",
        ));
    }
    if !PropertyType::is_known_tag(listing.property_type.as_str()) {
        violations.push(Violation::new("property_type", "unrecognized property type"));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Checks a candidate booking against its listing and recomputes the
/// derived total price. Returns the fully-populated booking on success,
/// or every violated rule on failure.
pub fn validate_booking(
    mut booking: Booking,
    listing: &Listing,
    today: NaiveDate,
) -> Result<Booking, Vec<Violation>> {
    let mut violations = vec![];

    if booking.check_out <= booking.check_in {
        violations.push(Violation::new(
            "check_out",
            "check-out date must be after check-in date",
        ));
    }
    if booking.check_in < today {
        violations.push(Violation::new(
            "check_in",
            "check-in date cannot be in the past",
        ));
    }
    if booking.guests < 1 {
        violations.push(Violation::new("guests", "at least one guest is required"));
    } else if booking.guests > listing.max_guests {
        violations.push(Violation::new(
            "guests",
            format!(
                "guest count ({}) exceeds listing capacity ({})",
                booking.guests, listing.max_guests
            ),
        ));
    }
    if !listing.available {
        violations.push(Violation::new(
            "listing_id",
            "listing is not available for booking",
        ));
    }

    if violations.is_empty() {
        booking.total_price = total_price(listing.price_per_night, booking.nights());
        Ok(booking)
    } else {
        Err(violations)
    }
}

/// total = nightly price x whole nights, nights never below 1.
pub fn total_price(price_per_night: f64, nights: i64) -> f64 {
    price_per_night * nights.max(1) as f64
}

/// Checks a candidate review against its booking. `already_reviewed` is
/// the caller's in-memory uniqueness check; the UNIQUE constraint on
/// reviews.booking_id remains the authoritative guard at commit time.
pub fn validate_review(
    review: &Review,
    booking: &Booking,
    already_reviewed: bool,
) -> Result<(), Vec<Violation>> {
    let mut violations = vec![];

    if booking.status != BookingStatus::Completed {
        violations.push(Violation::new(
            "booking_id",
            "reviews can only be created for completed bookings",
        ));
    }
    if already_reviewed {
        violations.push(Violation::new(
            "booking_id",
            "a review already exists for this booking",
        ));
    }
    if !(1..=5).contains(&review.rating) {
        violations.push(Violation::new("rating", "rating must be between 1 and 5"));
    }
    if review.listing_id != booking.listing_id {
        violations.push(Violation::new(
            "listing_id",
            "review listing must match the booking's listing",
        ));
    }
    if review.guest_id != booking.guest_id {
        violations.push(Violation::new(
            "guest_id",
            "review guest must match the booking's guest",
        ));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeSet;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn make_listing() -> Listing {
        let now = Utc::now().naive_utc();
        Listing {
            id: "l-1".to_string(),
            host_id: "u-host".to_string(),
            title: "Sunny loft".to_string(),
            description: "A bright loft near the river.".to_string(),
            location: "Lisbon, PT".to_string(),
            property_type: PropertyType::Apartment,
            price_per_night: 100.0,
            bedrooms: 2,
            bathrooms: 1,
            max_guests: 4,
            amenities: BTreeSet::from(["WiFi".to_string(), "Kitchen".to_string()]),
            available: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn make_booking(check_in: &str, check_out: &str, guests: i64) -> Booking {
        let now = Utc::now().naive_utc();
        Booking {
            id: "b-1".to_string(),
            listing_id: "l-1".to_string(),
            guest_id: "u-guest".to_string(),
            check_in: date(check_in),
            check_out: date(check_out),
            guests,
            total_price: 0.0,
            status: BookingStatus::Pending,
            special_requests: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn make_review(rating: i64) -> Review {
        Review {
            id: "r-1".to_string(),
            booking_id: "b-1".to_string(),
            listing_id: "l-1".to_string(),
            guest_id: "u-guest".to_string(),
            rating,
            comment: "Great stay.".to_string(),
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_valid_listing() {
        assert!(validate_listing(&make_listing()).is_ok());
    }

    #[test]
    fn test_listing_bad_price_and_capacity_both_reported() {
        let mut listing = make_listing();
        listing.price_per_night = 0.0;
        listing.max_guests = 0;

        let violations = validate_listing(&listing).unwrap_err();
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().any(|v| v.field == "price_per_night"));
        assert!(violations.iter().any(|v| v.field == "max_guests"));
    }

    #[test]
    fn test_listing_negative_rooms() {
        let mut listing = make_listing();
        listing.bedrooms = -1;
        let violations = validate_listing(&listing).unwrap_err();
        assert_eq!(violations[0].field, "bedrooms");
    }

    #[test]
    fn test_valid_booking_computes_total_price() {
        let listing = make_listing();
        let booking = make_booking("2026-09-10", "2026-09-13", 2);

        let validated = validate_booking(booking, &listing, date("2026-09-01")).unwrap();
        assert_eq!(validated.total_price, 300.0);
    }

    #[test]
    fn test_booking_same_day_checkout_rejected() {
        let listing = make_listing();
        let booking = make_booking("2026-09-10", "2026-09-10", 2);

        let violations =
            validate_booking(booking, &listing, date("2026-09-01")).unwrap_err();
        assert!(violations
            .iter()
            .any(|v| v.field == "check_out" && v.reason.contains("after check-in")));
    }

    #[test]
    fn test_booking_past_check_in_rejected() {
        let listing = make_listing();
        let booking = make_booking("2026-09-10", "2026-09-13", 2);

        let violations =
            validate_booking(booking, &listing, date("2026-09-11")).unwrap_err();
        assert!(violations.iter().any(|v| v.field == "check_in"));
    }

    #[test]
    fn test_booking_over_capacity_rejected() {
        let listing = make_listing();
        let booking = make_booking("2026-09-10", "2026-09-13", 5);

        let violations =
            validate_booking(booking, &listing, date("2026-09-01")).unwrap_err();
        assert!(violations.iter().any(|v| v.field == "guests"));
    }

    #[test]
    fn test_booking_unavailable_listing_rejected() {
        let mut listing = make_listing();
        listing.available = false;
        let booking = make_booking("2026-09-10", "2026-09-13", 2);

        let violations =
            validate_booking(booking, &listing, date("2026-09-01")).unwrap_err();
        assert!(violations.iter().any(|v| v.field == "listing_id"));
    }

    #[test]
    fn test_booking_reports_all_violations_at_once() {
        let mut listing = make_listing();
        listing.available = false;
        // Reversed dates, zero guests, unavailable listing: three rules broken.
        let booking = make_booking("2026-09-13", "2026-09-10", 0);

        let violations =
            validate_booking(booking, &listing, date("2026-09-01")).unwrap_err();
        assert_eq!(violations.len(), 3);
    }

    #[test]
    fn test_review_against_completed_booking() {
        let mut booking = make_booking("2026-09-10", "2026-09-13", 2);
        booking.status = BookingStatus::Completed;

        assert!(validate_review(&make_review(5), &booking, false).is_ok());
    }

    #[test]
    fn test_review_against_pending_booking_rejected() {
        let booking = make_booking("2026-09-10", "2026-09-13", 2);

        let violations = validate_review(&make_review(5), &booking, false).unwrap_err();
        assert!(violations
            .iter()
            .any(|v| v.reason.contains("completed bookings")));
    }

    #[test]
    fn test_duplicate_review_rejected() {
        let mut booking = make_booking("2026-09-10", "2026-09-13", 2);
        booking.status = BookingStatus::Completed;

        let violations = validate_review(&make_review(5), &booking, true).unwrap_err();
        assert!(violations.iter().any(|v| v.reason.contains("already exists")));
    }

    #[test]
    fn test_review_rating_bounds() {
        let mut booking = make_booking("2026-09-10", "2026-09-13", 2);
        booking.status = BookingStatus::Completed;

        assert!(validate_review(&make_review(0), &booking, false).is_err());
        assert!(validate_review(&make_review(6), &booking, false).is_err());
        assert!(validate_review(&make_review(1), &booking, false).is_ok());
        assert!(validate_review(&make_review(5), &booking, false).is_ok());
    }

    #[test]
    fn test_review_denormalized_fields_must_match() {
        let mut booking = make_booking("2026-09-10", "2026-09-13", 2);
        booking.status = BookingStatus::Completed;

        let mut review = make_review(4);
        review.listing_id = "l-other".to_string();
        review.guest_id = "u-other".to_string();

        let violations = validate_review(&review, &booking, false).unwrap_err();
        assert_eq!(violations.len(), 2);
    }
}
