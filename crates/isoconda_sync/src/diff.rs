//! Computes add/remove/unchanged sets between a resolved package set and a
//! reference channel, using the channel-independent identity key so records
//! from two differently-named channels compare equal.

use fxhash::FxHashSet;
use isoconda_types::PackageRecord;
use tracing::debug;

/// The result of comparing a freshly resolved set of records (`upstream`)
/// against what a reference channel already holds (`local`).
#[derive(Debug, Clone, Default)]
pub struct ChannelDiff {
    /// Present upstream, absent locally: needs to be fetched and added.
    pub to_add: Vec<PackageRecord>,
    /// Present locally, absent upstream: needs to be removed from the mirror.
    pub to_remove: Vec<PackageRecord>,
    /// Present in both: no action needed. Exposed for progress reporting by
    /// the (out-of-scope) downloader, not consumed by the core itself.
    pub unchanged: Vec<PackageRecord>,
}

/// Computes the diff in O(n+m) using a hash set keyed on the channel-
/// independent identity (subdir, name, version, build_number, build).
pub fn compute<'u, 'l>(
    upstream: impl IntoIterator<Item = &'u PackageRecord>,
    local: impl IntoIterator<Item = &'l PackageRecord>,
) -> ChannelDiff {
    let local: Vec<&PackageRecord> = local.into_iter().collect();
    let local_keys: FxHashSet<_> = local.iter().map(|r| r.identity_key()).collect();

    let mut to_add = Vec::new();
    let mut unchanged = Vec::new();
    let mut upstream_keys = FxHashSet::default();

    for record in upstream {
        upstream_keys.insert(record.identity_key());
        if local_keys.contains(&record.identity_key()) {
            unchanged.push(record.clone());
        } else {
            to_add.push(record.clone());
        }
    }

    let to_remove: Vec<PackageRecord> = local
        .into_iter()
        .filter(|r| !upstream_keys.contains(&r.identity_key()))
        .cloned()
        .collect();

    debug!(
        added = to_add.len(),
        removed = to_remove.len(),
        unchanged = unchanged.len(),
        "computed channel diff"
    );

    ChannelDiff { to_add, to_remove, unchanged }
}
