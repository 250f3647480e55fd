use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{Booking, BookingStatus, Listing, PropertyType, Review, User};

const DATE_FMT: &str = "%Y-%m-%d";
const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

// ── Users ──

pub fn create_user(conn: &Connection, user: &User) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO users (id, name, email, is_host, is_guest, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user.id,
            user.name,
            user.email,
            user.is_host as i32,
            user.is_guest as i32,
            user.created_at.format(DATETIME_FMT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_user_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<User>> {
    let result = conn.query_row(
        "SELECT id, name, email, is_host, is_guest, created_at FROM users WHERE id = ?1",
        params![id],
        |row| Ok(parse_user_row(row)),
    );

    match result {
        Ok(user) => Ok(Some(user?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_users(conn: &Connection) -> anyhow::Result<Vec<User>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, is_host, is_guest, created_at FROM users ORDER BY created_at",
    )?;
    let rows = stmt.query_map([], |row| Ok(parse_user_row(row)))?;

    let mut users = vec![];
    for row in rows {
        users.push(row??);
    }
    Ok(users)
}

fn parse_user_row(row: &rusqlite::Row) -> anyhow::Result<User> {
    let created_at_str: String = row.get(5)?;
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        is_host: row.get::<_, i32>(3)? != 0,
        is_guest: row.get::<_, i32>(4)? != 0,
        created_at: parse_datetime(&created_at_str),
    })
}

// ── Listings ──

const LISTING_COLS: &str = "id, host_id, title, description, location, property_type, \
     price_per_night, bedrooms, bathrooms, max_guests, amenities, available, created_at, updated_at";

pub fn create_listing(conn: &Connection, listing: &Listing) -> anyhow::Result<()> {
    let amenities_json = serde_json::to_string(&listing.amenities)?;
    conn.execute(
        "INSERT INTO listings (id, host_id, title, description, location, property_type,
                               price_per_night, bedrooms, bathrooms, max_guests, amenities,
                               available, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            listing.id,
            listing.host_id,
            listing.title,
            listing.description,
            listing.location,
            listing.property_type.as_str(),
            listing.price_per_night,
            listing.bedrooms,
            listing.bathrooms,
            listing.max_guests,
            amenities_json,
            listing.available as i32,
            listing.created_at.format(DATETIME_FMT).to_string(),
            listing.updated_at.format(DATETIME_FMT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn update_listing(conn: &Connection, listing: &Listing) -> anyhow::Result<bool> {
    let amenities_json = serde_json::to_string(&listing.amenities)?;
    let now = Utc::now().naive_utc().format(DATETIME_FMT).to_string();
    let count = conn.execute(
        "UPDATE listings SET title = ?1, description = ?2, location = ?3, property_type = ?4,
                             price_per_night = ?5, bedrooms = ?6, bathrooms = ?7, max_guests = ?8,
                             amenities = ?9, available = ?10, updated_at = ?11
         WHERE id = ?12",
        params![
            listing.title,
            listing.description,
            listing.location,
            listing.property_type.as_str(),
            listing.price_per_night,
            listing.bedrooms,
            listing.bathrooms,
            listing.max_guests,
            amenities_json,
            listing.available as i32,
            now,
            listing.id,
        ],
    )?;
    Ok(count > 0)
}

#[derive(Debug, Default)]
pub struct ListingFilter {
    pub location: Option<String>,
    pub property_type: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub available: Option<bool>,
}

pub fn get_listings(conn: &Connection, filter: &ListingFilter) -> anyhow::Result<Vec<Listing>> {
    let mut clauses: Vec<String> = vec![];
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = vec![];

    if let Some(location) = &filter.location {
        params_vec.push(Box::new(location.clone()));
        clauses.push(format!("location = ?{}", params_vec.len()));
    }
    if let Some(property_type) = &filter.property_type {
        params_vec.push(Box::new(property_type.clone()));
        clauses.push(format!("property_type = ?{}", params_vec.len()));
    }
    if let Some(min_price) = filter.min_price {
        params_vec.push(Box::new(min_price));
        clauses.push(format!("price_per_night >= ?{}", params_vec.len()));
    }
    if let Some(max_price) = filter.max_price {
        params_vec.push(Box::new(max_price));
        clauses.push(format!("price_per_night <= ?{}", params_vec.len()));
    }
    if let Some(available) = filter.available {
        params_vec.push(Box::new(available as i32));
        clauses.push(format!("available = ?{}", params_vec.len()));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };
    let sql = format!("SELECT {LISTING_COLS} FROM listings{where_sql} ORDER BY created_at DESC");

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_listing_row(row)))?;

    let mut listings = vec![];
    for row in rows {
        listings.push(row??);
    }
    Ok(listings)
}

pub fn get_listing_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Listing>> {
    let result = conn.query_row(
        &format!("SELECT {LISTING_COLS} FROM listings WHERE id = ?1"),
        params![id],
        |row| Ok(parse_listing_row(row)),
    );

    match result {
        Ok(listing) => Ok(Some(listing?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn average_rating(conn: &Connection, listing_id: &str) -> anyhow::Result<Option<f64>> {
    let avg: Option<f64> = conn.query_row(
        "SELECT AVG(rating) FROM reviews WHERE listing_id = ?1",
        params![listing_id],
        |row| row.get(0),
    )?;
    Ok(avg)
}

fn parse_listing_row(row: &rusqlite::Row) -> anyhow::Result<Listing> {
    let property_type_str: String = row.get(5)?;
    let amenities_json: String = row.get(10)?;
    let created_at_str: String = row.get(12)?;
    let updated_at_str: String = row.get(13)?;

    Ok(Listing {
        id: row.get(0)?,
        host_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        location: row.get(4)?,
        property_type: PropertyType::parse(&property_type_str),
        price_per_night: row.get(6)?,
        bedrooms: row.get(7)?,
        bathrooms: row.get(8)?,
        max_guests: row.get(9)?,
        amenities: serde_json::from_str(&amenities_json).unwrap_or_default(),
        available: row.get::<_, i32>(11)? != 0,
        created_at: parse_datetime(&created_at_str),
        updated_at: parse_datetime(&updated_at_str),
    })
}

// ── Bookings ──

const BOOKING_COLS: &str = "id, listing_id, guest_id, check_in, check_out, guests, \
     total_price, status, special_requests, created_at, updated_at";

pub fn create_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO bookings (id, listing_id, guest_id, check_in, check_out, guests,
                               total_price, status, special_requests, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            booking.id,
            booking.listing_id,
            booking.guest_id,
            booking.check_in.format(DATE_FMT).to_string(),
            booking.check_out.format(DATE_FMT).to_string(),
            booking.guests,
            booking.total_price,
            booking.status.as_str(),
            booking.special_requests,
            booking.created_at.format(DATETIME_FMT).to_string(),
            booking.updated_at.format(DATETIME_FMT).to_string(),
        ],
    )?;
    Ok(())
}

#[derive(Debug, Default)]
pub struct BookingFilter {
    pub status: Option<String>,
    pub check_in_from: Option<NaiveDate>,
    pub check_in_to: Option<NaiveDate>,
}

pub fn get_bookings(
    conn: &Connection,
    filter: &BookingFilter,
    limit: i64,
) -> anyhow::Result<Vec<Booking>> {
    let mut clauses: Vec<String> = vec![];
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = vec![];

    if let Some(status) = &filter.status {
        params_vec.push(Box::new(status.clone()));
        clauses.push(format!("status = ?{}", params_vec.len()));
    }
    if let Some(from) = filter.check_in_from {
        params_vec.push(Box::new(from.format(DATE_FMT).to_string()));
        clauses.push(format!("check_in >= ?{}", params_vec.len()));
    }
    if let Some(to) = filter.check_in_to {
        params_vec.push(Box::new(to.format(DATE_FMT).to_string()));
        clauses.push(format!("check_in <= ?{}", params_vec.len()));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };
    params_vec.push(Box::new(limit));
    let sql = format!(
        "SELECT {BOOKING_COLS} FROM bookings{where_sql} ORDER BY check_in DESC LIMIT ?{}",
        params_vec.len()
    );

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        &format!("SELECT {BOOKING_COLS} FROM bookings WHERE id = ?1"),
        params![id],
        |row| Ok(parse_booking_row(row)),
    );

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn update_booking_status(
    conn: &Connection,
    id: &str,
    status: &BookingStatus,
) -> anyhow::Result<bool> {
    let now = Utc::now().naive_utc().format(DATETIME_FMT).to_string();
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now, id],
    )?;
    Ok(count > 0)
}

/// Bookings eligible for a review: completed, with no review row yet.
pub fn get_reviewable_bookings(conn: &Connection) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLS} FROM bookings b
         WHERE b.status = 'completed'
           AND NOT EXISTS (SELECT 1 FROM reviews r WHERE r.booking_id = b.id)
         ORDER BY b.check_in"
    ))?;
    let rows = stmt.query_map([], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let check_in_str: String = row.get(3)?;
    let check_out_str: String = row.get(4)?;
    let status_str: String = row.get(7)?;
    let created_at_str: String = row.get(9)?;
    let updated_at_str: String = row.get(10)?;

    Ok(Booking {
        id: row.get(0)?,
        listing_id: row.get(1)?,
        guest_id: row.get(2)?,
        check_in: parse_date(&check_in_str),
        check_out: parse_date(&check_out_str),
        guests: row.get(5)?,
        total_price: row.get(6)?,
        status: BookingStatus::parse(&status_str),
        special_requests: row.get(8)?,
        created_at: parse_datetime(&created_at_str),
        updated_at: parse_datetime(&updated_at_str),
    })
}

// ── Reviews ──

pub fn create_review(conn: &Connection, review: &Review) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO reviews (id, booking_id, listing_id, guest_id, rating, comment, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            review.id,
            review.booking_id,
            review.listing_id,
            review.guest_id,
            review.rating,
            review.comment,
            review.created_at.format(DATETIME_FMT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn review_exists_for_booking(conn: &Connection, booking_id: &str) -> anyhow::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM reviews WHERE booking_id = ?1",
        params![booking_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn get_reviews_for_listing(conn: &Connection, listing_id: &str) -> anyhow::Result<Vec<Review>> {
    let mut stmt = conn.prepare(
        "SELECT id, booking_id, listing_id, guest_id, rating, comment, created_at
         FROM reviews WHERE listing_id = ?1 ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map(params![listing_id], |row| Ok(parse_review_row(row)))?;

    let mut reviews = vec![];
    for row in rows {
        reviews.push(row??);
    }
    Ok(reviews)
}

pub fn list_reviews(conn: &Connection) -> anyhow::Result<Vec<Review>> {
    let mut stmt = conn.prepare(
        "SELECT id, booking_id, listing_id, guest_id, rating, comment, created_at
         FROM reviews ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map([], |row| Ok(parse_review_row(row)))?;

    let mut reviews = vec![];
    for row in rows {
        reviews.push(row??);
    }
    Ok(reviews)
}

fn parse_review_row(row: &rusqlite::Row) -> anyhow::Result<Review> {
    let created_at_str: String = row.get(6)?;
    Ok(Review {
        id: row.get(0)?,
        booking_id: row.get(1)?,
        listing_id: row.get(2)?,
        guest_id: row.get(3)?,
        rating: row.get(4)?,
        comment: row.get(5)?,
        created_at: parse_datetime(&created_at_str),
    })
}

// ── Purge ──

/// Deletes every row, children before parents, so foreign keys are
/// never left dangling mid-purge.
pub fn purge_all(conn: &Connection) -> anyhow::Result<()> {
    conn.execute("DELETE FROM reviews", [])?;
    conn.execute("DELETE FROM bookings", [])?;
    conn.execute("DELETE FROM listings", [])?;
    conn.execute("DELETE FROM users", [])?;
    Ok(())
}

fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, DATE_FMT).unwrap_or_else(|_| Utc::now().date_naive())
}

fn parse_datetime(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, DATETIME_FMT).unwrap_or_else(|_| Utc::now().naive_utc())
}
