use thiserror::Error;

/// Errors surfaced while parsing a match-specification string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid specification `{input}`: {reason}")]
pub struct InvalidSpecification {
    pub input: String,
    pub reason: String,
}

/// Errors surfaced while reading or parsing repodata.
#[derive(Debug, Error)]
pub enum InvalidRepodata {
    #[error("repodata_version {found} is not supported (expected 1)")]
    UnsupportedVersion { found: u64 },
    #[error("malformed repodata JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}
