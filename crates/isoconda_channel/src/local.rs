use std::cell::RefCell;
use std::path::{Path, PathBuf};

use fxhash::FxHashMap;
use isoconda_types::{PackageRecord, PatchInstructions, RepoData, Specification, Subdir};
use tracing::debug;

use crate::error::ChannelError;
use crate::reader::ChannelReader;

/// A channel rooted at a directory on disk, one subdirectory per platform
/// partition, each holding a `repodata.json` and optional
/// `patch_instructions.json`.
///
/// Query results are cached per subdir for the lifetime of the reader, as
/// permitted by the resolver's single-run caching contract.
pub struct LocalChannelReader {
    root: PathBuf,
    cache: RefCell<FxHashMap<Subdir, Vec<PackageRecord>>>,
}

impl LocalChannelReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalChannelReader {
            root: root.into(),
            cache: RefCell::new(FxHashMap::default()),
        }
    }

    fn load_subdir(&self, subdir: &Subdir) -> Result<Vec<PackageRecord>, ChannelError> {
        if let Some(cached) = self.cache.borrow().get(subdir) {
            return Ok(cached.clone());
        }
        let path = self.root.join(subdir.as_str()).join("repodata.json");
        let bytes = fs_err::read(&path).map_err(|source| ChannelError::Unavailable {
            subdir: subdir.as_str().to_string(),
            source,
        })?;
        let repo_data = RepoData::from_json(&bytes, subdir.as_str())?;
        let records: Vec<_> = repo_data.all_records().cloned().collect();
        debug!(subdir = subdir.as_str(), count = records.len(), "loaded subdir repodata");
        self.cache.borrow_mut().insert(subdir.clone(), records.clone());
        Ok(records)
    }

    fn subdir_path(&self, subdir: &Subdir) -> PathBuf {
        self.root.join(subdir.as_str())
    }
}

impl ChannelReader for LocalChannelReader {
    fn query(&self, spec: &Specification, subdirs: &[Subdir]) -> Result<Vec<PackageRecord>, ChannelError> {
        let mut matches = Vec::new();
        for subdir in subdirs {
            for record in self.load_subdir(subdir)? {
                if record.name == spec.name() && spec.matches(&record) {
                    matches.push(record);
                }
            }
        }
        Ok(matches)
    }

    fn iter(&self, subdirs: &[Subdir]) -> Result<Vec<PackageRecord>, ChannelError> {
        let mut all = Vec::new();
        for subdir in subdirs {
            all.extend(self.load_subdir(subdir)?);
        }
        Ok(all)
    }

    fn find_subdirs(&self) -> Result<Vec<Subdir>, ChannelError> {
        let mut subdirs = Vec::new();
        let entries = match fs_err::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(source) => {
                return Err(ChannelError::Unavailable {
                    subdir: self.root.display().to_string(),
                    source,
                })
            }
        };
        for entry in entries {
            let entry = entry.map_err(|source| ChannelError::Unavailable {
                subdir: self.root.display().to_string(),
                source,
            })?;
            if entry.path().join("repodata.json").is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    subdirs.push(Subdir::new(name));
                }
            }
        }
        Ok(subdirs)
    }

    fn read_instructions(&self, subdir: &Subdir) -> Result<PatchInstructions, ChannelError> {
        let path = self.subdir_path(subdir).join("patch_instructions.json");
        if !Path::new(&path).is_file() {
            return Ok(PatchInstructions::empty());
        }
        let bytes = fs_err::read(&path).map_err(|source| ChannelError::Unavailable {
            subdir: subdir.as_str().to_string(),
            source,
        })?;
        Ok(PatchInstructions::from_json(&bytes)?)
    }
}
