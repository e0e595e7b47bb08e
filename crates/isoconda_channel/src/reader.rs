use isoconda_types::{PackageRecord, PatchInstructions, Specification, Subdir};

use crate::error::ChannelError;

/// Queryable view over a Conda channel: exactly the four operations the
/// resolver needs.
pub trait ChannelReader {
    /// Every record in `subdirs` whose name matches `spec.name()` and that
    /// `spec` considers a match. Order is not guaranteed but the result is
    /// always finite.
    fn query(&self, spec: &Specification, subdirs: &[Subdir]) -> Result<Vec<PackageRecord>, ChannelError>;

    /// Every record in `subdirs`, equivalent to an unconstrained query.
    fn iter(&self, subdirs: &[Subdir]) -> Result<Vec<PackageRecord>, ChannelError>;

    /// The set of subdirs this channel contains.
    fn find_subdirs(&self) -> Result<Vec<Subdir>, ChannelError>;

    /// The patch instructions recorded for `subdir`, or empty ones if none
    /// exist.
    fn read_instructions(&self, subdir: &Subdir) -> Result<PatchInstructions, ChannelError>;
}
