use thiserror::Error;

/// Admission engine error types
#[derive(Error, Debug)]
pub enum AdmissionError {
    #[error("failed to parse condition document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid pattern in field `{field}`: {pattern}: {source}")]
    InvalidPattern {
        field: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("field `{field}` may not start with `*`: {pattern} (did you mean a glob field?)")]
    LeadingGlobInRegexField { field: &'static str, pattern: String },

    #[error("invalid JA3 fingerprint in field `{field}`: {pattern} (expected 32 lowercase hex characters)")]
    InvalidJa3 { field: &'static str, pattern: String },

    #[error("GeoIP error: {0}")]
    GeoIp(String),

    #[error("ledger error: {0}")]
    Ledger(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<sled::Error> for AdmissionError {
    fn from(e: sled::Error) -> Self {
        AdmissionError::Ledger(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AdmissionError>;
