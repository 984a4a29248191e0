//! Rating source traits.

use std::fmt;

use async_trait::async_trait;

use crate::errors::Result;

/// Display text for an entity a source does not rate.
pub const NOT_RATED: &str = "Не оценен";

/// Result of a successful lookup.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Rating {
    Grade(String),
    NotRated,
}

impl Rating {
    /// Wraps a raw cell or page value; blank text means not rated.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.trim().is_empty() {
            Self::NotRated
        } else {
            Self::Grade(text)
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grade(grade) => f.write_str(grade),
            Self::NotRated => f.write_str(NOT_RATED),
        }
    }
}

/// A credit rating provider.
///
/// `lookup` returns [`Rating::NotRated`] when the entity is simply absent and
/// an error only when the source itself could not be queried or parsed.
#[async_trait]
pub trait RatingSource: Send + Sync {
    fn id(&self) -> &'static str;

    async fn lookup(&self, key: &str) -> Result<Rating>;
}

/// Maps an ISIN to the issuer's taxpayer id.
///
/// `Ok(None)` means the issuer could not be found; errors are reserved for
/// failed requests.
#[async_trait]
pub trait TaxIdLookup: Send + Sync {
    async fn resolve(&self, isin: &str) -> Result<Option<String>>;
}
