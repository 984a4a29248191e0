pub mod ratings_model;
pub mod ratings_service;

pub use ratings_model::{IssuerRatings, RatingOutcome, TaxIdOutcome};
pub use ratings_service::RatingService;
