use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub host_id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub property_type: PropertyType,
    pub price_per_night: f64,
    pub bedrooms: i64,
    pub bathrooms: i64,
    pub max_guests: i64,
    pub amenities: BTreeSet<String>,
    pub available: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    House,
    Apartment,
    Villa,
    Condo,
    Other,
}

impl PropertyType {
    pub const ALL: [PropertyType; 5] = [
        PropertyType::House,
        PropertyType::Apartment,
        PropertyType::Villa,
        PropertyType::Condo,
        PropertyType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::House => "house",
            PropertyType::Apartment => "apartment",
            PropertyType::Villa => "villa",
            PropertyType::Condo => "condo",
            PropertyType::Other => "other",
        }
    }

    /// Unknown tags fold into `Other` so stored rows always round-trip.
    pub fn parse(s: &str) -> Self {
        match s {
            "house" => PropertyType::House,
            "apartment" => PropertyType::Apartment,
            "villa" => PropertyType::Villa,
            "condo" => PropertyType::Condo,
            _ => PropertyType::Other,
        }
    }

    pub fn is_known_tag(s: &str) -> bool {
        matches!(s, "house" | "apartment" | "villa" | "condo" | "other")
    }
}
