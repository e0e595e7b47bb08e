//! Core value types for a Conda channel mirror: package records, match
//! specifications, the repodata/patch-instructions data model, and Conda's
//! version ordering.

mod error;
mod patches;
mod platform;
mod record;
mod repo_data;
mod spec;
mod version;

pub use error::{InvalidRepodata, InvalidSpecification};
pub use patches::{PackageRecordPatch, PatchInstructions};
pub use platform::Subdir;
pub use record::PackageRecord;
pub use repo_data::{ChannelInfo, RepoData};
pub use spec::Specification;
pub use version::Version;

/// Configuration threaded explicitly through construction rather than kept
/// as process-wide state.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentConfig {
    pub subdirs: Vec<Subdir>,
    pub latest: bool,
}
