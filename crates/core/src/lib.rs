//! Bondscope Core - bond screening, valuation and rating reconciliation.
//!
//! The crate is transport-agnostic: the gateway and rating sources are
//! injected as traits from `bondscope-market-data` and `bondscope-ratings`.

pub mod bonds;
pub mod constants;
pub mod errors;
pub mod pipeline;
pub mod ratings;
pub mod report;
pub mod settings;
pub mod valuation;

pub use pipeline::{BondRow, BondScreener, ScreeningRun, SheetGroup};
pub use ratings::{IssuerRatings, RatingOutcome, RatingService, TaxIdOutcome};
pub use report::{build_report, Report, ReportCell, REPORT_HEADERS};
pub use settings::ScreenerSettings;
pub use valuation::{value_bond, BondValuation, YieldToMaturity};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
