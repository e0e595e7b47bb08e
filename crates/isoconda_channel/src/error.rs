use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("channel subdir `{subdir}` is unreachable: {source}")]
    Unavailable {
        subdir: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    InvalidRepodata(#[from] isoconda_types::InvalidRepodata),
}
