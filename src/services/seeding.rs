use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::queries;
use crate::models::{Booking, BookingStatus, Listing, PropertyType, Review, User};
use crate::services::validation;

/// How many times a single booking is resampled before it is skipped.
const MAX_BOOKING_ATTEMPTS: u32 = 5;

const FIRST_NAMES: &[&str] = &[
    "John", "Sarah", "Mike", "David", "Emma", "Alex", "Nina", "Omar", "Lucia", "Pavel",
    "Aisha", "Tom", "Ines", "Felix", "Maya", "Leo",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Wilson", "Davis", "Taylor", "Anderson", "Costa", "Novak",
    "Haddad", "Kim", "Moreau", "Berg",
];

const LOCATIONS: &[&str] = &[
    "New York, NY",
    "Los Angeles, CA",
    "Chicago, IL",
    "Miami, FL",
    "Austin, TX",
    "Denver, CO",
];

const TITLE_ADJECTIVES: &[&str] = &["Cozy", "Modern", "Luxury", "Charming", "Sunny", "Quiet"];
const TITLE_NOUNS: &[&str] = &["Apartment", "House", "Villa", "Loft", "Retreat", "Hideaway"];

const AMENITIES: &[&str] = &[
    "WiFi", "Kitchen", "Parking", "Pool", "Air conditioning", "Washer", "Balcony", "Gym",
];

const REVIEW_COMMENTS: &[&str] = &[
    "Great place to stay! Highly recommended.",
    "Clean and comfortable. Would book again.",
    "Amazing host and beautiful property.",
    "Perfect location and excellent amenities.",
    "Exactly as described, smooth check-in.",
];

const SPECIAL_REQUESTS: &[&str] = &[
    "Late check-in, arriving around 10pm.",
    "Traveling with a small dog.",
    "Could we get an extra set of towels?",
];

#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub users: usize,
    pub listings: usize,
    pub bookings: usize,
    pub reviews: usize,
    pub clear: bool,
    /// Fixed RNG seed for reproducible runs; fresh entropy when unset.
    pub rng_seed: Option<u64>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            users: 12,
            listings: 20,
            bookings: 50,
            reviews: 30,
            clear: false,
            rng_seed: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct SeedReport {
    pub users_created: usize,
    pub listings_created: usize,
    pub bookings_created: usize,
    pub bookings_skipped: usize,
    pub reviews_created: usize,
    pub review_shortfall: usize,
}

/// Randomness and clock for one seeding run. Passed explicitly through
/// the generation chain; there is no global generator state.
pub struct SeedContext {
    rng: StdRng,
    today: NaiveDate,
}

impl SeedContext {
    pub fn new(rng_seed: Option<u64>) -> Self {
        let rng = match rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            today: Utc::now().date_naive(),
        }
    }
}

/// Populates the database with a self-consistent synthetic dataset.
/// Every generated entity passes the validation engine before commit.
pub fn seed(conn: &Connection, config: &SeedConfig) -> anyhow::Result<SeedReport> {
    let mut ctx = SeedContext::new(config.rng_seed);
    let mut report = SeedReport::default();

    if config.clear {
        tracing::info!("clearing existing data");
        queries::purge_all(conn)?;
    }

    let users = seed_users(conn, &mut ctx, config.users)?;
    report.users_created = users.len();

    let listings = seed_listings(conn, &mut ctx, &users, config.listings)?;
    report.listings_created = listings.len();

    let (created, skipped) = seed_bookings(conn, &mut ctx, &users, &listings, config.bookings)?;
    report.bookings_created = created;
    report.bookings_skipped = skipped;

    let (created, shortfall) = seed_reviews(conn, &mut ctx, config.reviews)?;
    report.reviews_created = created;
    report.review_shortfall = shortfall;

    tracing::info!(
        users = report.users_created,
        listings = report.listings_created,
        bookings = report.bookings_created,
        reviews = report.reviews_created,
        "seeding complete"
    );

    Ok(report)
}

fn seed_users(conn: &Connection, ctx: &mut SeedContext, count: usize) -> anyhow::Result<Vec<User>> {
    let mut users = vec![];
    let now = Utc::now().naive_utc();

    for i in 0..count {
        let first = FIRST_NAMES.choose(&mut ctx.rng).copied().unwrap_or("Sam");
        let last = LAST_NAMES.choose(&mut ctx.rng).copied().unwrap_or("Lee");
        // Cycle host / guest / both so neither role pool can end up empty.
        let (is_host, is_guest) = match i % 3 {
            0 => (true, false),
            1 => (false, true),
            _ => (true, true),
        };

        let user = User {
            id: Uuid::new_v4().to_string(),
            name: format!("{first} {last}"),
            email: format!(
                "{}.{}.{}@example.com",
                first.to_lowercase(),
                last.to_lowercase(),
                i
            ),
            is_host,
            is_guest,
            created_at: now,
        };
        queries::create_user(conn, &user)?;
        users.push(user);
    }

    Ok(users)
}

fn seed_listings(
    conn: &Connection,
    ctx: &mut SeedContext,
    users: &[User],
    count: usize,
) -> anyhow::Result<Vec<Listing>> {
    let hosts: Vec<&User> = users.iter().filter(|u| u.is_host).collect();
    if hosts.is_empty() {
        anyhow::bail!("cannot seed listings without any host users");
    }

    let mut listings = vec![];
    let now = Utc::now().naive_utc();

    for i in 0..count {
        let host = hosts[ctx.rng.gen_range(0..hosts.len())];
        let adjective = TITLE_ADJECTIVES.choose(&mut ctx.rng).copied().unwrap_or("Cozy");
        let noun = TITLE_NOUNS.choose(&mut ctx.rng).copied().unwrap_or("Apartment");
        let amenity_count = ctx.rng.gen_range(2..=5);
        let amenities: BTreeSet<String> = AMENITIES
            .choose_multiple(&mut ctx.rng, amenity_count)
            .map(|a| a.to_string())
            .collect();

        let listing = Listing {
            id: Uuid::new_v4().to_string(),
            host_id: host.id.clone(),
            title: format!("{adjective} {noun} {}", i + 1),
            description: "A wonderful place to stay with all modern amenities.".to_string(),
            location: LOCATIONS
                .choose(&mut ctx.rng)
                .copied()
                .unwrap_or("New York, NY")
                .to_string(),
            property_type: *PropertyType::ALL
                .choose(&mut ctx.rng)
                .unwrap_or(&PropertyType::Apartment),
            price_per_night: ctx.rng.gen_range(50..=300) as f64,
            bedrooms: ctx.rng.gen_range(1..=4),
            bathrooms: ctx.rng.gen_range(1..=3),
            max_guests: ctx.rng.gen_range(2..=8),
            amenities,
            available: true,
            created_at: now,
            updated_at: now,
        };

        if let Err(violations) = validation::validate_listing(&listing) {
            // Generation ranges satisfy every rule, so this is a bug, not bad luck.
            anyhow::bail!("seeded listing failed validation: {violations:?}");
        }
        queries::create_listing(conn, &listing)?;
        listings.push(listing);
    }

    Ok(listings)
}

fn random_status(ctx: &mut SeedContext) -> BookingStatus {
    // Weighted so the completed pool stays large enough to feed reviews.
    match ctx.rng.gen_range(0..100) {
        0..=39 => BookingStatus::Completed,
        40..=64 => BookingStatus::Confirmed,
        65..=84 => BookingStatus::Pending,
        _ => BookingStatus::Canceled,
    }
}

fn seed_bookings(
    conn: &Connection,
    ctx: &mut SeedContext,
    users: &[User],
    listings: &[Listing],
    count: usize,
) -> anyhow::Result<(usize, usize)> {
    let guests: Vec<&User> = users.iter().filter(|u| u.is_guest).collect();
    if guests.is_empty() || listings.is_empty() {
        tracing::warn!("no guests or no listings, skipping booking generation");
        return Ok((0, count));
    }

    let mut created = 0;
    let mut skipped = 0;
    let now = Utc::now().naive_utc();

    'outer: for _ in 0..count {
        for _attempt in 0..MAX_BOOKING_ATTEMPTS {
            let listing = &listings[ctx.rng.gen_range(0..listings.len())];
            let guest = guests[ctx.rng.gen_range(0..guests.len())];
            if guest.id == listing.host_id {
                continue;
            }

            let check_in = ctx.today + Duration::days(ctx.rng.gen_range(1..=90));
            let check_out = check_in + Duration::days(ctx.rng.gen_range(1..=7));

            let candidate = Booking {
                id: Uuid::new_v4().to_string(),
                listing_id: listing.id.clone(),
                guest_id: guest.id.clone(),
                check_in,
                check_out,
                guests: ctx.rng.gen_range(1..=listing.max_guests),
                total_price: 0.0,
                status: random_status(ctx),
                special_requests: if ctx.rng.gen_bool(0.3) {
                    SPECIAL_REQUESTS.choose(&mut ctx.rng).map(|s| s.to_string())
                } else {
                    None
                },
                created_at: now,
                updated_at: now,
            };

            match validation::validate_booking(candidate, listing, ctx.today) {
                Ok(booking) => {
                    queries::create_booking(conn, &booking)?;
                    created += 1;
                    continue 'outer;
                }
                Err(violations) => {
                    tracing::debug!(?violations, "resampling booking after validation failure");
                }
            }
        }
        // Resampling exhausted: skip this unit, keep the batch going.
        tracing::warn!(
            attempts = MAX_BOOKING_ATTEMPTS,
            "could not generate a valid booking, skipping"
        );
        skipped += 1;
    }

    Ok((created, skipped))
}

fn seed_reviews(
    conn: &Connection,
    ctx: &mut SeedContext,
    count: usize,
) -> anyhow::Result<(usize, usize)> {
    let mut pool = queries::get_reviewable_bookings(conn)?;
    pool.shuffle(&mut ctx.rng);

    let mut created = 0;
    let now = Utc::now().naive_utc();

    for booking in pool.iter().take(count) {
        let review = Review {
            id: Uuid::new_v4().to_string(),
            booking_id: booking.id.clone(),
            listing_id: booking.listing_id.clone(),
            guest_id: booking.guest_id.clone(),
            rating: ctx.rng.gen_range(3..=5),
            comment: REVIEW_COMMENTS
                .choose(&mut ctx.rng)
                .copied()
                .unwrap_or("Great stay.")
                .to_string(),
            created_at: now,
        };

        if let Err(violations) = validation::validate_review(&review, booking, false) {
            anyhow::bail!("seeded review failed validation: {violations:?}");
        }
        queries::create_review(conn, &review)?;
        created += 1;
    }

    let shortfall = count.saturating_sub(created);
    if shortfall > 0 {
        tracing::info!(
            requested = count,
            created,
            shortfall,
            "review count capped by eligible completed bookings"
        );
    }

    Ok((created, shortfall))
}
