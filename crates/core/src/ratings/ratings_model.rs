use std::fmt;

use serde::Serialize;

use bondscope_ratings::Rating;

use crate::constants::{
    LOOKUP_FAILED_LABEL, NOT_APPLICABLE_LABEL, NOT_RATED_LABEL, TAX_ID_FAILED_LABEL,
};

/// What one rating field of a report row ended up as.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum RatingOutcome {
    Rated(String),
    /// The source was asked and has no rating for the issuer.
    NotRated,
    /// The source was deliberately not asked.
    NotApplicable,
    /// The source failed; the message is kept for logs.
    LookupFailed(String),
    /// The issuer's taxpayer id could not be resolved.
    TaxIdFailed(String),
}

impl RatingOutcome {
    /// Text written to the report.
    pub fn label(&self) -> &str {
        match self {
            Self::Rated(grade) => grade,
            Self::NotRated => NOT_RATED_LABEL,
            Self::NotApplicable => NOT_APPLICABLE_LABEL,
            Self::LookupFailed(_) => LOOKUP_FAILED_LABEL,
            Self::TaxIdFailed(_) => TAX_ID_FAILED_LABEL,
        }
    }

    pub fn is_not_rated(&self) -> bool {
        matches!(self, Self::NotRated)
    }
}

impl From<Rating> for RatingOutcome {
    fn from(rating: Rating) -> Self {
        match rating {
            Rating::Grade(grade) => Self::Rated(grade),
            Rating::NotRated => Self::NotRated,
        }
    }
}

impl fmt::Display for RatingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum TaxIdOutcome {
    Found(String),
    /// The registry has no issuer page for the ISIN.
    Missing,
    NotApplicable,
    Failed(String),
}

impl TaxIdOutcome {
    pub fn label(&self) -> &str {
        match self {
            Self::Found(id) => id,
            Self::Missing | Self::NotApplicable => NOT_APPLICABLE_LABEL,
            Self::Failed(_) => TAX_ID_FAILED_LABEL,
        }
    }
}

/// The three agency ratings of an issuer plus the taxpayer id they hinge on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IssuerRatings {
    pub acra: RatingOutcome,
    pub nra: RatingOutcome,
    pub nkr: RatingOutcome,
    pub tax_id: TaxIdOutcome,
}

impl IssuerRatings {
    /// Ratings of an issuer that is never queried.
    pub fn not_applicable() -> Self {
        Self {
            acra: RatingOutcome::NotApplicable,
            nra: RatingOutcome::NotApplicable,
            nkr: RatingOutcome::NotApplicable,
            tax_id: TaxIdOutcome::NotApplicable,
        }
    }

    /// True when every agency answered and none rates the issuer.
    pub fn all_not_rated(&self) -> bool {
        self.acra.is_not_rated() && self.nra.is_not_rated() && self.nkr.is_not_rated()
    }
}
