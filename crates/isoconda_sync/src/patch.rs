//! Reads each affected subdir's upstream [`PatchInstructions`], appends the
//! filenames being removed, and writes the result back. Every field besides
//! `remove` passes through untouched.

use std::path::Path;

use fxhash::FxHashMap;
use isoconda_channel::ChannelReader;
use isoconda_types::{PackageRecord, PatchInstructions, Subdir};
use tracing::info;

use crate::error::SyncError;

/// Groups records by subdir, keeping only their filenames.
pub fn filenames_by_subdir<'a>(records: impl IntoIterator<Item = &'a PackageRecord>) -> FxHashMap<Subdir, Vec<String>> {
    let mut grouped: FxHashMap<Subdir, Vec<String>> = FxHashMap::default();
    for record in records {
        grouped.entry(Subdir::new(record.subdir.clone())).or_default().push(record.filename.clone());
    }
    grouped
}

/// Reads the current patch instructions for `subdir` through `channel`,
/// merges `removed_filenames` in (append-only), and returns the updated
/// instructions. Does not write anything; the caller decides where the
/// result is persisted.
pub fn merge_removals(
    channel: &dyn ChannelReader,
    subdir: &Subdir,
    removed_filenames: impl IntoIterator<Item = String>,
) -> Result<PatchInstructions, SyncError> {
    let mut instructions = channel.read_instructions(subdir)?;
    let before = instructions.remove.len();
    instructions.merge_removals(removed_filenames);
    info!(
        subdir = subdir.as_str(),
        added = instructions.remove.len() - before,
        total = instructions.remove.len(),
        "merged patch removals"
    );
    Ok(instructions)
}

/// Writes `instructions` as `patch_instructions.json` under
/// `channel_root/<subdir>/`, creating the subdir directory if needed.
pub fn write_instructions(channel_root: &Path, subdir: &Subdir, instructions: &PatchInstructions) -> Result<(), SyncError> {
    let dir = channel_root.join(subdir.as_str());
    fs_err::create_dir_all(&dir).map_err(|source| SyncError::PatchWrite { subdir: subdir.as_str().to_string(), source })?;
    let path = dir.join("patch_instructions.json");
    let json = serde_json::to_string_pretty(instructions).expect("PatchInstructions serialization is infallible");
    fs_err::write(&path, json).map_err(|source| SyncError::PatchWrite { subdir: subdir.as_str().to_string(), source })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use isoconda_channel::InMemoryChannelReader;
    use isoconda_types::Version;

    fn record(name: &str, subdir: &str) -> PackageRecord {
        PackageRecord {
            name: name.to_string(),
            version: Version::parse("1.0"),
            build: "0".to_string(),
            build_number: 0,
            subdir: subdir.to_string(),
            filename: format!("{name}-1.0-0.conda"),
            url: String::new(),
            sha256: String::new(),
            size: 0,
            depends: Vec::new(),
            timestamp: None,
        }
    }

    #[test]
    fn groups_filenames_by_their_own_subdir() {
        let records = vec![record("a", "noarch"), record("b", "linux-64")];
        let grouped = filenames_by_subdir(&records);
        assert_eq!(grouped[&Subdir::new("noarch")], vec!["a-1.0-0.conda".to_string()]);
        assert_eq!(grouped[&Subdir::new("linux-64")], vec!["b-1.0-0.conda".to_string()]);
    }

    #[test]
    fn merge_preserves_other_fields() {
        let mut channel = InMemoryChannelReader::new();
        let mut existing = PatchInstructions::empty();
        existing.version = Some(1);
        existing.remove.insert("old-1.0-0.conda".to_string());
        channel.set_instructions("noarch", existing);

        let subdir = Subdir::new("noarch");
        let merged = merge_removals(&channel, &subdir, ["new-1.0-0.conda".to_string()]).unwrap();

        assert_eq!(merged.version, Some(1));
        assert!(merged.remove.contains("old-1.0-0.conda"));
        assert!(merged.remove.contains("new-1.0-0.conda"));
        assert_eq!(merged.remove.len(), 2);
    }

    #[test]
    fn write_then_read_round_trips_through_a_local_channel() {
        use isoconda_channel::LocalChannelReader;

        let tmp = tempfile::tempdir().unwrap();
        let subdir = Subdir::new("noarch");
        let mut instructions = PatchInstructions::empty();
        instructions.remove.insert("a-1.0-0.conda".to_string());

        write_instructions(tmp.path(), &subdir, &instructions).unwrap();

        let reader = LocalChannelReader::new(tmp.path());
        let read_back = reader.read_instructions(&subdir).unwrap();
        assert_eq!(read_back.remove, instructions.remove);
    }
}
