//! Ties the resolver and channel crates into the two operations a mirror
//! maintainer actually runs: planning a resolution (optionally diffed
//! against an existing local channel) and writing the resulting removal set
//! into patch instructions. Bulk downloading, sha256 verification, and the
//! final `repodata.json` rewrite are out of scope and live in whatever
//! caller wraps this crate.

mod config;
mod diff;
mod error;
mod patch;
mod sync;

pub use config::{CliOverrides, FileConfig};
pub use diff::{compute as diff_channels, ChannelDiff};
pub use error::SyncError;
pub use patch::{filenames_by_subdir, merge_removals, write_instructions};
pub use sync::{apply_patch, plan, PlanOutcome};
