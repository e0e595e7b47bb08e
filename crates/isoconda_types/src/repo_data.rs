use fxhash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::InvalidRepodata;
use crate::record::PackageRecord;
use crate::version::Version;

/// The `info` block of a subdir's repodata.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChannelInfo {
    pub subdir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPackageRecord {
    name: String,
    version: String,
    build: String,
    #[serde(default)]
    build_number: u64,
    #[serde(default)]
    subdir: Option<String>,
    #[serde(default)]
    depends: Vec<String>,
    #[serde(default)]
    sha256: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    timestamp: Option<i64>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRepoData {
    #[serde(default)]
    info: Option<ChannelInfo>,
    #[serde(default)]
    packages: FxHashMap<String, RawPackageRecord>,
    #[serde(default, rename = "packages.conda")]
    conda_packages: FxHashMap<String, RawPackageRecord>,
    #[serde(default)]
    removed: FxHashSet<String>,
    #[serde(default, rename = "repodata_version")]
    repodata_version: Option<u64>,
}

/// The decoded contents of one subdir's `repodata.json`.
#[derive(Debug, Clone, Default)]
pub struct RepoData {
    pub info: Option<ChannelInfo>,
    pub packages: FxHashMap<String, PackageRecord>,
    pub conda_packages: FxHashMap<String, PackageRecord>,
    pub removed: FxHashSet<String>,
    pub repodata_version: Option<u64>,
}

fn materialize(
    filename: &str,
    raw: RawPackageRecord,
    fallback_subdir: &str,
    base_url: Option<&str>,
) -> Result<PackageRecord, InvalidRepodata> {
    let subdir = raw.subdir.unwrap_or_else(|| fallback_subdir.to_string());
    let url = raw.url.unwrap_or_else(|| match base_url {
        Some(base) => format!("{}/{}/{}", base.trim_end_matches('/'), subdir, filename),
        None => format!("{subdir}/{filename}"),
    });
    Ok(PackageRecord {
        name: raw.name,
        version: Version::parse(&raw.version),
        build: raw.build,
        build_number: raw.build_number,
        subdir,
        filename: filename.to_string(),
        url,
        sha256: raw.sha256,
        size: raw.size,
        depends: raw.depends,
        timestamp: raw.timestamp,
    })
}

impl RepoData {
    /// Parses a `repodata.json` document. `fallback_subdir` is used for any
    /// record that omits its own `subdir` field, matching how conda derives
    /// it from the enclosing channel directory.
    pub fn from_json(bytes: &[u8], fallback_subdir: &str) -> Result<Self, InvalidRepodata> {
        let raw: RawRepoData = serde_json::from_slice(bytes)?;
        if let Some(version) = raw.repodata_version {
            if version != 1 {
                return Err(InvalidRepodata::UnsupportedVersion { found: version });
            }
        }
        let base_url = raw.info.as_ref().and_then(|i| i.base_url.as_deref());
        let packages = raw
            .packages
            .into_iter()
            .map(|(filename, rec)| {
                let record = materialize(&filename, rec, fallback_subdir, base_url)?;
                Ok((filename, record))
            })
            .collect::<Result<_, InvalidRepodata>>()?;
        let conda_packages = raw
            .conda_packages
            .into_iter()
            .map(|(filename, rec)| {
                let record = materialize(&filename, rec, fallback_subdir, base_url)?;
                Ok((filename, record))
            })
            .collect::<Result<_, InvalidRepodata>>()?;
        Ok(RepoData {
            info: raw.info,
            packages,
            conda_packages,
            removed: raw.removed,
            repodata_version: raw.repodata_version,
        })
    }

    /// Iterates every record from both `packages` and `packages.conda`.
    ///
    /// The two keys are treated as equal sources (see the duplicate-handling
    /// note on [`crate::PatchInstructions`]): when the same identity key
    /// appears in both maps, the `packages.conda` entry wins, matching the
    /// preference conda's own index builder gives the newer package format.
    pub fn all_records(&self) -> impl Iterator<Item = &PackageRecord> {
        let mut by_identity: FxHashMap<_, &PackageRecord> = FxHashMap::default();
        for record in self.packages.values() {
            by_identity.insert(record.identity_key(), record);
        }
        for record in self.conda_packages.values() {
            by_identity.insert(record.identity_key(), record);
        }
        by_identity.into_values().collect::<Vec<_>>().into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_repodata() {
        let json = br#"{
            "info": {"subdir": "noarch"},
            "repodata_version": 1,
            "packages": {
                "a-1.0-0.tar.bz2": {
                    "name": "a",
                    "version": "1.0",
                    "build": "0",
                    "build_number": 0,
                    "depends": ["b >=1.0"]
                }
            },
            "packages.conda": {},
            "removed": []
        }"#;
        let repo = RepoData::from_json(json, "noarch").unwrap();
        assert_eq!(repo.packages.len(), 1);
        let record = &repo.packages["a-1.0-0.tar.bz2"];
        assert_eq!(record.name, "a");
        assert_eq!(record.subdir, "noarch");
        assert_eq!(record.depends, vec!["b >=1.0".to_string()]);
        assert_eq!(record.url, "noarch/a-1.0-0.tar.bz2");
    }

    #[test]
    fn rejects_unsupported_repodata_version() {
        let json = br#"{"repodata_version": 2, "packages": {}, "packages.conda": {}}"#;
        let err = RepoData::from_json(json, "noarch").unwrap_err();
        assert!(matches!(err, InvalidRepodata::UnsupportedVersion { found: 2 }));
    }

    #[test]
    fn duplicate_identity_prefers_conda_package() {
        let json = br#"{
            "packages": {
                "a-1.0-0.tar.bz2": {"name": "a", "version": "1.0", "build": "0", "build_number": 0, "sha256": "old"}
            },
            "packages.conda": {
                "a-1.0-0.conda": {"name": "a", "version": "1.0", "build": "0", "build_number": 0, "sha256": "new"}
            }
        }"#;
        let repo = RepoData::from_json(json, "noarch").unwrap();
        let records: Vec<_> = repo.all_records().collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sha256, "new");
    }
}
