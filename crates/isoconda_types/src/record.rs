use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::version::Version;

/// One installable artifact entry from a channel's repodata.
///
/// Identity (and therefore `Hash`/`Eq`) is the channel-independent key
/// `(subdir, name, version, build_number, build)` — the channel a record was
/// fetched from never participates in equality, so the same package mirrored
/// from two different channels compares equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageRecord {
    pub name: String,
    pub version: Version,
    pub build: String,
    pub build_number: u64,
    pub subdir: String,
    pub filename: String,
    pub url: String,
    pub sha256: String,
    pub size: u64,
    pub depends: Vec<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl PackageRecord {
    /// The channel-independent identity key used for hashing, equality, and
    /// cross-channel diffing.
    pub fn identity_key(&self) -> (&str, &str, &Version, u64, &str) {
        (&self.subdir, &self.name, &self.version, self.build_number, &self.build)
    }
}

impl PartialEq for PackageRecord {
    fn eq(&self, other: &Self) -> bool {
        self.identity_key() == other.identity_key()
    }
}

impl Eq for PackageRecord {}

impl Hash for PackageRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity_key().hash(state);
    }
}

impl fmt::Display for PackageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.name, self.version, self.build)
    }
}
