use fxhash::FxHashMap;
use isoconda_types::{PackageRecord, PatchInstructions, Specification, Subdir};

use crate::error::ChannelError;
use crate::reader::ChannelReader;

/// An in-process channel, keyed by subdir, used in tests and for a
/// previously-resolved reference channel kept only in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryChannelReader {
    records: FxHashMap<Subdir, Vec<PackageRecord>>,
    instructions: FxHashMap<Subdir, PatchInstructions>,
}

impl InMemoryChannelReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(subdir: impl Into<Subdir>, records: Vec<PackageRecord>) -> Self {
        let mut reader = Self::new();
        reader.insert(subdir, records);
        reader
    }

    pub fn insert(&mut self, subdir: impl Into<Subdir>, records: Vec<PackageRecord>) {
        self.records.entry(subdir.into()).or_default().extend(records);
    }

    pub fn set_instructions(&mut self, subdir: impl Into<Subdir>, instructions: PatchInstructions) {
        self.instructions.insert(subdir.into(), instructions);
    }
}

impl ChannelReader for InMemoryChannelReader {
    fn query(&self, spec: &Specification, subdirs: &[Subdir]) -> Result<Vec<PackageRecord>, ChannelError> {
        Ok(subdirs
            .iter()
            .filter_map(|subdir| self.records.get(subdir))
            .flatten()
            .filter(|record| record.name == spec.name() && spec.matches(record))
            .cloned()
            .collect())
    }

    fn iter(&self, subdirs: &[Subdir]) -> Result<Vec<PackageRecord>, ChannelError> {
        Ok(subdirs
            .iter()
            .filter_map(|subdir| self.records.get(subdir))
            .flatten()
            .cloned()
            .collect())
    }

    fn find_subdirs(&self) -> Result<Vec<Subdir>, ChannelError> {
        Ok(self.records.keys().cloned().collect())
    }

    fn read_instructions(&self, subdir: &Subdir) -> Result<PatchInstructions, ChannelError> {
        Ok(self.instructions.get(subdir).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isoconda_types::Version;

    fn record(name: &str, version: &str) -> PackageRecord {
        PackageRecord {
            name: name.to_string(),
            version: Version::parse(version),
            build: "0".to_string(),
            build_number: 0,
            subdir: "noarch".to_string(),
            filename: format!("{name}-{version}-0.conda"),
            url: String::new(),
            sha256: String::new(),
            size: 0,
            depends: Vec::new(),
            timestamp: None,
        }
    }

    #[test]
    fn query_filters_by_name_and_spec() {
        let mut reader = InMemoryChannelReader::new();
        reader.insert("noarch", vec![record("a", "1.0"), record("a", "2.0"), record("b", "1.0")]);
        let spec = Specification::parse("a >=2").unwrap();
        let matches = reader.query(&spec, &[Subdir::new("noarch")]).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].version.as_str(), "2.0");
    }

    #[test]
    fn missing_instructions_default_to_empty() {
        let reader = InMemoryChannelReader::new();
        let instructions = reader.read_instructions(&Subdir::new("noarch")).unwrap();
        assert!(instructions.remove.is_empty());
    }
}
