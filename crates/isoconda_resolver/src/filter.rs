//! Composable predicate filters wrapping every channel query.

use fxhash::FxHashMap;
use isoconda_types::{PackageRecord, Specification};

/// A filter narrows a stream of candidate records down further. Filters are
/// applied in the order they were pushed onto a [`FilterChain`].
pub trait Filter {
    fn apply(&self, records: Vec<PackageRecord>) -> Vec<PackageRecord>;
}

/// Keeps `r` iff every spec in `specs[r.name]` matches `r`. A name absent
/// from `specs` imposes no constraint (vacuous truth).
pub struct Inclusion<'a> {
    specs: &'a FxHashMap<String, Vec<Specification>>,
}

impl<'a> Inclusion<'a> {
    pub fn new(specs: &'a FxHashMap<String, Vec<Specification>>) -> Self {
        Inclusion { specs }
    }
}

impl Filter for Inclusion<'_> {
    fn apply(&self, records: Vec<PackageRecord>) -> Vec<PackageRecord> {
        records
            .into_iter()
            .filter(|r| match self.specs.get(&r.name) {
                Some(group) => group.iter().all(|s| s.matches(r)),
                None => true,
            })
            .collect()
    }
}

/// Keeps `r` iff no spec in `specs[r.name]` matches `r`.
pub struct Exclusion<'a> {
    specs: &'a FxHashMap<String, Vec<Specification>>,
}

impl<'a> Exclusion<'a> {
    pub fn new(specs: &'a FxHashMap<String, Vec<Specification>>) -> Self {
        Exclusion { specs }
    }
}

impl Filter for Exclusion<'_> {
    fn apply(&self, records: Vec<PackageRecord>) -> Vec<PackageRecord> {
        records
            .into_iter()
            .filter(|r| match self.specs.get(&r.name) {
                Some(group) => !group.iter().any(|s| s.matches(r)),
                None => true,
            })
            .collect()
    }
}

/// Keeps `r` iff it holds the greatest version within its name group, or its
/// name has a pin in `pins` that `r` matches.
pub struct LatestVersion<'a> {
    pins: &'a FxHashMap<String, Vec<Specification>>,
}

impl<'a> LatestVersion<'a> {
    pub fn new(pins: &'a FxHashMap<String, Vec<Specification>>) -> Self {
        LatestVersion { pins }
    }

    fn is_pinned(&self, r: &PackageRecord) -> bool {
        self.pins
            .get(&r.name)
            .is_some_and(|group| group.iter().any(|s| s.matches(r)))
    }
}

impl Filter for LatestVersion<'_> {
    fn apply(&self, records: Vec<PackageRecord>) -> Vec<PackageRecord> {
        let mut max_version: FxHashMap<&str, &isoconda_types::Version> = FxHashMap::default();
        for r in &records {
            max_version
                .entry(r.name.as_str())
                .and_modify(|v| {
                    if r.version > **v {
                        *v = &r.version;
                    }
                })
                .or_insert(&r.version);
        }
        records
            .into_iter()
            .filter(|r| self.is_pinned(r) || Some(&r.version) == max_version.get(r.name.as_str()).copied())
            .collect()
    }
}

/// Keeps `r` iff it has the maximum `timestamp` among records sharing
/// `(name, version, depends)`, or its name has a pin it matches.
pub struct LatestBuild<'a> {
    pins: &'a FxHashMap<String, Vec<Specification>>,
}

impl<'a> LatestBuild<'a> {
    pub fn new(pins: &'a FxHashMap<String, Vec<Specification>>) -> Self {
        LatestBuild { pins }
    }

    fn is_pinned(&self, r: &PackageRecord) -> bool {
        self.pins
            .get(&r.name)
            .is_some_and(|group| group.iter().any(|s| s.matches(r)))
    }
}

impl Filter for LatestBuild<'_> {
    fn apply(&self, records: Vec<PackageRecord>) -> Vec<PackageRecord> {
        let key = |r: &PackageRecord| (r.name.clone(), r.version.to_string(), r.depends.clone());
        let mut max_timestamp: FxHashMap<(String, String, Vec<String>), i64> = FxHashMap::default();
        for r in &records {
            let ts = r.timestamp.unwrap_or(0);
            max_timestamp
                .entry(key(r))
                .and_modify(|existing| {
                    if ts > *existing {
                        *existing = ts;
                    }
                })
                .or_insert(ts);
        }
        records
            .into_iter()
            .filter(|r| {
                self.is_pinned(r) || r.timestamp.unwrap_or(0) == max_timestamp[&key(r)]
            })
            .collect()
    }
}

/// An ordered, composable sequence of filters applied to every candidate
/// query result before it reaches the dependency graph.
#[derive(Default)]
pub struct FilterChain<'a> {
    filters: Vec<Box<dyn Filter + 'a>>,
}

impl<'a> FilterChain<'a> {
    pub fn new() -> Self {
        FilterChain { filters: Vec::new() }
    }

    pub fn push(mut self, filter: impl Filter + 'a) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn apply(&self, records: Vec<PackageRecord>) -> Vec<PackageRecord> {
        self.filters.iter().fold(records, |acc, filter| filter.apply(acc))
    }
}
