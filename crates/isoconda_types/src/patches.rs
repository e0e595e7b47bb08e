use fxhash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::error::InvalidRepodata;

/// Field-level overrides applied to one package record by a patch.
///
/// Every field is `None` by default, meaning "leave as-is"; a `Some` value
/// replaces the corresponding field on the record it targets.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageRecordPatch {
    #[serde(default)]
    pub depends: Option<Vec<String>>,
    #[serde(default)]
    pub build_number: Option<u64>,
    #[serde(default)]
    pub sha256: Option<String>,
}

/// A per-subdir patch overlay: the same shape `repodata.json` post-processing
/// reads to adjust an upstream index without re-uploading it.
///
/// The resolver core only ever appends filenames to `remove`; every other
/// field is produced upstream and must be preserved byte-for-byte when
/// merging.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatchInstructions {
    #[serde(default)]
    pub packages: FxHashMap<String, PackageRecordPatch>,
    #[serde(default, rename = "packages.conda")]
    pub conda_packages: FxHashMap<String, PackageRecordPatch>,
    #[serde(default)]
    pub remove: FxHashSet<String>,
    #[serde(default)]
    pub revoke: FxHashSet<String>,
    #[serde(default, rename = "patch_instructions_version")]
    pub version: Option<u64>,
}

impl PatchInstructions {
    /// The instructions a subdir has when no `patch_instructions.json` exists.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, InvalidRepodata> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Appends `filenames` to `remove`, leaving every other field untouched.
    /// This is the only mutation the core is allowed to perform on patch
    /// instructions it read from upstream.
    pub fn merge_removals(&mut self, filenames: impl IntoIterator<Item = String>) {
        self.remove.extend(filenames);
    }
}
