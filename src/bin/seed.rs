use clap::Parser;
use tracing_subscriber::EnvFilter;

use staybook::config::AppConfig;
use staybook::db;
use staybook::services::seeding::{self, SeedConfig};

/// Populate the database with internally consistent sample data.
#[derive(Parser, Debug)]
#[command(name = "seed")]
struct Args {
    /// Number of user accounts to create
    #[arg(long, default_value_t = 12)]
    users: usize,

    /// Number of listings to create
    #[arg(long, default_value_t = 20)]
    listings: usize,

    /// Number of bookings to create
    #[arg(long, default_value_t = 50)]
    bookings: usize,

    /// Number of reviews to create (capped by completed bookings)
    #[arg(long, default_value_t = 30)]
    reviews: usize,

    /// Clear existing data before seeding
    #[arg(long)]
    clear: bool,

    /// RNG seed for a reproducible dataset
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env();
    let conn = db::init_db(&config.database_url)?;

    let seed_config = SeedConfig {
        users: args.users,
        listings: args.listings,
        bookings: args.bookings,
        reviews: args.reviews,
        clear: args.clear,
        rng_seed: args.seed,
    };

    let report = seeding::seed(&conn, &seed_config)?;

    println!("Seeded {}:", config.database_url);
    println!("- {} users", report.users_created);
    println!("- {} listings", report.listings_created);
    println!(
        "- {} bookings ({} skipped)",
        report.bookings_created, report.bookings_skipped
    );
    println!("- {} reviews", report.reviews_created);
    if report.review_shortfall > 0 {
        println!(
            "  ({} fewer than requested: only {} completed bookings were eligible)",
            report.review_shortfall, report.reviews_created
        );
    }

    Ok(())
}
