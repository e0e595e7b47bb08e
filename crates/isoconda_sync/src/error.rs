use std::path::PathBuf;

use thiserror::Error;

use isoconda_channel::ChannelError;
use isoconda_resolver::ResolveError;
use isoconda_types::{InvalidRepodata, InvalidSpecification};

/// Errors surfaced by the `isoconda_sync` crate: config loading, diffing, and
/// the patch-instructions merge/write step, plus every error the crates it
/// composes can produce.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to read config file `{path}`: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file `{path}`: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to write patch instructions for subdir `{subdir}`: {source}")]
    PatchWrite {
        subdir: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Specification(#[from] InvalidSpecification),

    #[error(transparent)]
    Repodata(#[from] InvalidRepodata),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}
