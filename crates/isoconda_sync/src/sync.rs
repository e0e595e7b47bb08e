//! Orchestrates the resolver and diff engine into the two operations the CLI
//! exposes: `plan` (resolve, optionally diff against a reference channel) and
//! `patch` (append a removal set to each affected subdir's instructions).

use std::path::Path;
use std::time::Instant;

use isoconda_channel::ChannelReader;
use isoconda_resolver::{resolve, ResolveRequest};
use isoconda_types::PackageRecord;
use tracing::info;

use crate::config::FileConfig;
use crate::diff::{self, ChannelDiff};
use crate::error::SyncError;
use crate::patch;

/// The outcome of a `plan` run: the resolved record set, plus a diff against
/// a reference channel if one was supplied.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub records: Vec<PackageRecord>,
    pub diff: Option<ChannelDiff>,
}

/// Runs the resolver against `channel`, and if `reference` is present,
/// computes the add/remove/unchanged diff against it. Writes nothing.
pub fn plan(
    channel: &dyn ChannelReader,
    reference: Option<&dyn ChannelReader>,
    config: &FileConfig,
) -> Result<PlanOutcome, SyncError> {
    let started = Instant::now();
    let environment = config.environment_config();
    let request = ResolveRequest {
        requirements: &config.requirements,
        exclusions: &config.exclusions,
        disposables: &config.disposables,
        config: &environment,
    };
    let records = resolve(channel, &request)?;

    let diff = match reference {
        Some(reference) => {
            let subdirs = if environment.subdirs.is_empty() { reference.find_subdirs()? } else { environment.subdirs.clone() };
            let local = reference.iter(&subdirs)?;
            Some(diff::compute(&records, &local))
        }
        None => None,
    };

    info!(
        elapsed_ms = started.elapsed().as_millis(),
        resolved = records.len(),
        added = diff.as_ref().map(|d| d.to_add.len()),
        removed = diff.as_ref().map(|d| d.to_remove.len()),
        unchanged = diff.as_ref().map(|d| d.unchanged.len()),
        "plan complete"
    );

    Ok(PlanOutcome { records, diff })
}

/// Appends `removed` to each affected subdir's patch instructions under
/// `channel_root`, preserving every other field untouched.
pub fn apply_patch(channel: &dyn ChannelReader, channel_root: &Path, removed: &[PackageRecord]) -> Result<(), SyncError> {
    let grouped = patch::filenames_by_subdir(removed);
    for (subdir, filenames) in grouped {
        let instructions = patch::merge_removals(channel, &subdir, filenames)?;
        patch::write_instructions(channel_root, &subdir, &instructions)?;
    }
    Ok(())
}
