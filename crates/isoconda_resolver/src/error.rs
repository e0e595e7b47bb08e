use thiserror::Error;

use isoconda_channel::ChannelError;
use isoconda_types::InvalidSpecification;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Specification(#[from] InvalidSpecification),
    #[error(transparent)]
    Channel(#[from] ChannelError),
    #[error("unsatisfied requirements: {missing:?}")]
    UnsatisfiedRequirements { missing: Vec<String> },
}
