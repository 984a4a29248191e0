//! Credit rating lookups for Russian bond issuers.
//!
//! Three agencies are consulted:
//! - ACRA, scraped from its search page by ISIN ([`AcraSource`])
//! - NRA and NKR, read from their published spreadsheets by taxpayer id
//!   ([`SpreadsheetSource`])
//!
//! Taxpayer ids come from the national ISIN registry
//! ([`RegistryTaxIdLookup`]). Every source can be wrapped in a run-lifetime
//! cache ([`CachedRatingSource`], [`CachedTaxIdLookup`]).

pub mod acra;
pub mod cache;
pub mod errors;
pub mod fetch;
pub mod source;
pub mod spreadsheet;
pub mod taxpayer;

pub use acra::AcraSource;
pub use cache::{CachedRatingSource, CachedTaxIdLookup};
pub use errors::{RatingError, Result};
pub use fetch::{FetchResponse, HttpFetch, ReqwestFetcher, BROWSER_USER_AGENT};
pub use source::{Rating, RatingSource, TaxIdLookup, NOT_RATED};
pub use spreadsheet::{DailyFile, RatingTable, SpreadsheetSource};
pub use taxpayer::RegistryTaxIdLookup;
