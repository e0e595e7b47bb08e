//! Layered configuration: an optional TOML file provides defaults, CLI flags
//! override them. No process-wide state; everything lives in a value struct
//! threaded explicitly through `sync::plan`/`sync::patch`.

use std::path::Path;

use serde::Deserialize;

use isoconda_types::{EnvironmentConfig, Subdir};

use crate::error::SyncError;

/// The on-disk shape of an `isoconda.toml` config file. Every field is
/// optional so a file can set only what it wants to pin; CLI flags layered
/// on top always win (see `FileConfig::merge_cli_overrides`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub exclusions: Vec<String>,
    #[serde(default)]
    pub disposables: Vec<String>,
    #[serde(default)]
    pub subdirs: Vec<String>,
    #[serde(default)]
    pub latest: bool,
}

impl FileConfig {
    /// Loads a config file; a missing path is not an error; the caller is
    /// expected to have already decided the file is optional.
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let contents = fs_err::read_to_string(path).map_err(|source| SyncError::ConfigIo { path: path.to_path_buf(), source })?;
        toml::from_str(&contents).map_err(|source| SyncError::ConfigParse { path: path.to_path_buf(), source })
    }

    /// CLI-supplied lists extend (rather than replace) the file's lists;
    /// scalar CLI overrides (channel, reference, latest) take precedence when
    /// present.
    pub fn merge_cli_overrides(mut self, overrides: CliOverrides) -> Self {
        if let Some(channel) = overrides.channel {
            self.channel = Some(channel);
        }
        if let Some(reference) = overrides.reference {
            self.reference = Some(reference);
        }
        self.requirements.extend(overrides.requirements);
        self.exclusions.extend(overrides.exclusions);
        self.disposables.extend(overrides.disposables);
        self.subdirs.extend(overrides.subdirs);
        self.latest = self.latest || overrides.latest;
        self
    }

    pub fn environment_config(&self) -> EnvironmentConfig {
        EnvironmentConfig {
            subdirs: self.subdirs.iter().map(|s| Subdir::new(s.clone())).collect(),
            latest: self.latest,
        }
    }
}

/// The subset of config a CLI invocation can override, gathered from `clap`
/// arguments before being merged onto a (possibly absent) file config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub channel: Option<String>,
    pub reference: Option<String>,
    pub requirements: Vec<String>,
    pub exclusions: Vec<String>,
    pub disposables: Vec<String>,
    pub subdirs: Vec<String>,
    pub latest: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn cli_overrides_extend_file_lists_and_replace_scalars() {
        let file = FileConfig {
            channel: Some("/mirror".to_string()),
            requirements: vec!["a".to_string()],
            latest: false,
            ..FileConfig::default()
        };
        let overrides = CliOverrides {
            channel: Some("/other-mirror".to_string()),
            requirements: vec!["b >=2".to_string()],
            latest: true,
            ..CliOverrides::default()
        };
        let merged = file.merge_cli_overrides(overrides);
        assert_eq!(merged.channel.as_deref(), Some("/other-mirror"));
        assert_eq!(merged.requirements, vec!["a".to_string(), "b >=2".to_string()]);
        assert!(merged.latest);
    }

    #[test]
    fn loads_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"channel = "/mirror"
requirements = ["a >=2"]
subdirs = ["noarch"]
latest = true"#)
            .unwrap();
        let config = FileConfig::load(file.path()).unwrap();
        assert_eq!(config.channel.as_deref(), Some("/mirror"));
        assert_eq!(config.requirements, vec!["a >=2".to_string()]);
        assert!(config.latest);
    }

    #[test]
    fn missing_file_surfaces_config_io_error() {
        let err = FileConfig::load(Path::new("/nonexistent/isoconda.toml")).unwrap_err();
        assert!(matches!(err, SyncError::ConfigIo { .. }));
    }
}
