pub mod booking;
pub mod listing;
pub mod review;
pub mod user;

pub use booking::{Booking, BookingStatus};
pub use listing::{Listing, PropertyType};
pub use review::Review;
pub use user::User;
