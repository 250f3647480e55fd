use std::collections::BTreeSet;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::queries::{self, ListingFilter};
use crate::errors::AppError;
use crate::models::{Listing, PropertyType, Review};
use crate::services::validation;
use crate::state::AppState;

// GET /api/listings
#[derive(Deserialize)]
pub struct ListingsQuery {
    pub location: Option<String>,
    pub property_type: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub available: Option<bool>,
}

pub async fn get_listings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListingsQuery>,
) -> Result<Json<Vec<Listing>>, AppError> {
    let filter = ListingFilter {
        location: query.location,
        property_type: query.property_type,
        min_price: query.min_price,
        max_price: query.max_price,
        available: query.available,
    };

    let db = state.db.lock().unwrap();
    let listings = queries::get_listings(&db, &filter)?;
    Ok(Json(listings))
}

// GET /api/listings/:id
#[derive(Serialize)]
pub struct ListingDetail {
    #[serde(flatten)]
    pub listing: Listing,
    pub average_rating: Option<f64>,
}

pub async fn get_listing(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ListingDetail>, AppError> {
    let db = state.db.lock().unwrap();
    let listing = queries::get_listing_by_id(&db, &id)?
        .ok_or_else(|| AppError::NotFound(format!("listing {id}")))?;
    let average_rating = queries::average_rating(&db, &id)?;

    Ok(Json(ListingDetail {
        listing,
        average_rating,
    }))
}

// POST /api/listings
#[derive(Deserialize)]
pub struct CreateListing {
    pub host_id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub property_type: PropertyType,
    pub price_per_night: f64,
    pub bedrooms: i64,
    pub bathrooms: i64,
    pub max_guests: i64,
    #[serde(default)]
    pub amenities: BTreeSet<String>,
}

pub async fn create_listing(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateListing>,
) -> Result<Json<Listing>, AppError> {
    let db = state.db.lock().unwrap();

    let host = queries::get_user_by_id(&db, &payload.host_id)?
        .ok_or_else(|| AppError::ReferentialIntegrity(format!("host {} does not exist", payload.host_id)))?;
    if !host.is_host {
        return Err(AppError::ReferentialIntegrity(format!(
            "user {} is not a host",
            host.id
        )));
    }

    let now = Utc::now().naive_utc();
    let listing = Listing {
        id: Uuid::new_v4().to_string(),
        host_id: payload.host_id,
        title: payload.title,
        description: payload.description,
        location: payload.location,
        property_type: payload.property_type,
        price_per_night: payload.price_per_night,
        bedrooms: payload.bedrooms,
        bathrooms: payload.bathrooms,
        max_guests: payload.max_guests,
        amenities: payload.amenities,
        available: true,
        created_at: now,
        updated_at: now,
    };

    validation::validate_listing(&listing).map_err(AppError::Validation)?;
    queries::create_listing(&db, &listing)?;
    Ok(Json(listing))
}

// PUT /api/listings/:id
#[derive(Deserialize)]
pub struct UpdateListing {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub property_type: Option<PropertyType>,
    pub price_per_night: Option<f64>,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<i64>,
    pub max_guests: Option<i64>,
    pub amenities: Option<BTreeSet<String>>,
    pub available: Option<bool>,
}

pub async fn update_listing(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateListing>,
) -> Result<Json<Listing>, AppError> {
    let db = state.db.lock().unwrap();
    let mut listing = queries::get_listing_by_id(&db, &id)?
        .ok_or_else(|| AppError::NotFound(format!("listing {id}")))?;

    if let Some(title) = payload.title {
        listing.title = title;
    }
    if let Some(description) = payload.description {
        listing.description = description;
    }
    if let Some(location) = payload.location {
        listing.location = location;
    }
    if let Some(property_type) = payload.property_type {
        listing.property_type = property_type;
    }
    if let Some(price) = payload.price_per_night {
        listing.price_per_night = price;
    }
    if let Some(bedrooms) = payload.bedrooms {
        listing.bedrooms = bedrooms;
    }
    if let Some(bathrooms) = payload.bathrooms {
        listing.bathrooms = bathrooms;
    }
    if let Some(max_guests) = payload.max_guests {
        listing.max_guests = max_guests;
    }
    if let Some(amenities) = payload.amenities {
        listing.amenities = amenities;
    }
    if let Some(available) = payload.available {
        listing.available = available;
    }

    validation::validate_listing(&listing).map_err(AppError::Validation)?;
    queries::update_listing(&db, &listing)?;

    // Re-read so the response carries the stored updated_at.
    let listing = queries::get_listing_by_id(&db, &id)?
        .ok_or_else(|| AppError::NotFound(format!("listing {id}")))?;
    Ok(Json(listing))
}

// GET /api/listings/:id/reviews
pub async fn get_listing_reviews(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Review>>, AppError> {
    let db = state.db.lock().unwrap();
    if queries::get_listing_by_id(&db, &id)?.is_none() {
        return Err(AppError::NotFound(format!("listing {id}")));
    }
    let reviews = queries::get_reviews_for_listing(&db, &id)?;
    Ok(Json(reviews))
}
