// Domain errors
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    /// Raised only under `SamplePolicy::FailFast`.
    #[error("Unparsable sample #{index} in series {series_id}: {reason}")]
    UnparsableSample {
        series_id: String,
        index: usize,
        reason: String,
    },

    #[error("Invalid decimal pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Unknown locale tag: {0}")]
    UnknownLocale(String),
}
