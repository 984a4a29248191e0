use thiserror::Error;

/// Failure of a rating source itself, as opposed to an entity that simply
/// has no rating.
#[derive(Error, Debug)]
pub enum RatingError {
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("Request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Unexpected page layout from {source_id}: {message}")]
    Parse {
        source_id: &'static str,
        message: String,
    },

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RatingError {
    pub(crate) fn request(url: &str, err: impl std::fmt::Display) -> Self {
        Self::Request {
            url: url.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn parse(source_id: &'static str, message: impl Into<String>) -> Self {
        Self::Parse {
            source_id,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RatingError>;
