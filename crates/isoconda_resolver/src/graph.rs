//! A bipartite directed graph of specifications and package records.
//!
//! Node set is the disjoint union of specification canonical strings and
//! package-record identities. Edges strictly alternate: spec → record means
//! "record is a candidate that satisfies spec"; record → spec means "spec is
//! a dependency of record". No spec→spec or record→record edge ever exists.

use fxhash::{FxHashMap, FxHashSet};
use isoconda_types::{PackageRecord, Specification, Version};

/// The identity of a record node: the channel-independent key from
/// [`PackageRecord::identity_key`], owned so it can live as a map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub subdir: String,
    pub name: String,
    pub version: Version,
    pub build_number: u64,
    pub build: String,
}

impl From<&PackageRecord> for RecordKey {
    fn from(record: &PackageRecord) -> Self {
        RecordKey {
            subdir: record.subdir.clone(),
            name: record.name.clone(),
            version: record.version.clone(),
            build_number: record.build_number,
            build: record.build.clone(),
        }
    }
}

/// A single node in the graph: either a specification (identified by its
/// canonical string) or a package record (identified by its identity key).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeId {
    Spec(String),
    Record(RecordKey),
}

impl NodeId {
    pub fn spec(canonical: impl Into<String>) -> Self {
        NodeId::Spec(canonical.into())
    }

    pub fn record(record: &PackageRecord) -> Self {
        NodeId::Record(RecordKey::from(record))
    }

    pub fn is_spec(&self) -> bool {
        matches!(self, NodeId::Spec(_))
    }

    pub fn is_record(&self) -> bool {
        matches!(self, NodeId::Record(_))
    }
}

struct SpecEntry {
    spec: Specification,
    root: bool,
}

struct RecordEntry {
    record: PackageRecord,
}

/// The bipartite spec/record graph the resolver builds and prunes.
#[derive(Default)]
pub struct DependencyGraph {
    specs: FxHashMap<String, SpecEntry>,
    records: FxHashMap<RecordKey, RecordEntry>,
    forward: FxHashMap<NodeId, FxHashSet<NodeId>>,
    reverse: FxHashMap<NodeId, FxHashSet<NodeId>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_adjacency(&mut self, node: &NodeId) {
        self.forward.entry(node.clone()).or_default();
        self.reverse.entry(node.clone()).or_default();
    }

    /// Adds `spec` as a root requirement. Idempotent; re-adding an existing
    /// non-root spec promotes it to root.
    pub fn add_root(&mut self, spec: Specification) -> NodeId {
        let id = NodeId::spec(spec.to_string());
        self.ensure_adjacency(&id);
        self.specs
            .entry(spec.to_string())
            .and_modify(|e| e.root = true)
            .or_insert(SpecEntry { spec, root: true });
        id
    }

    /// Adds `spec` as a non-root node. A no-op if the spec is already
    /// present (root or not) — it never demotes an existing root.
    pub fn add_spec(&mut self, spec: Specification) -> NodeId {
        let id = NodeId::spec(spec.to_string());
        self.ensure_adjacency(&id);
        self.specs.entry(spec.to_string()).or_insert(SpecEntry { spec, root: false });
        id
    }

    /// Adds a record node. A no-op if the identity key is already present.
    pub fn add_record(&mut self, record: PackageRecord) -> NodeId {
        let key = RecordKey::from(&record);
        let id = NodeId::Record(key.clone());
        self.ensure_adjacency(&id);
        self.records.entry(key).or_insert(RecordEntry { record });
        id
    }

    /// Links `spec` → `record`: the record is a candidate satisfying the spec.
    pub fn link_candidate(&mut self, spec_id: &NodeId, record_id: &NodeId) {
        debug_assert!(spec_id.is_spec() && record_id.is_record());
        self.forward.entry(spec_id.clone()).or_default().insert(record_id.clone());
        self.reverse.entry(record_id.clone()).or_default().insert(spec_id.clone());
    }

    /// Links `record` → `spec`: the spec is a dependency of the record.
    pub fn link_dependency(&mut self, record_id: &NodeId, spec_id: &NodeId) {
        debug_assert!(record_id.is_record() && spec_id.is_spec());
        self.forward.entry(record_id.clone()).or_default().insert(spec_id.clone());
        self.reverse.entry(spec_id.clone()).or_default().insert(record_id.clone());
    }

    pub fn predecessors(&self, node: &NodeId) -> impl Iterator<Item = &NodeId> {
        self.reverse.get(node).into_iter().flatten()
    }

    pub fn successors(&self, node: &NodeId) -> impl Iterator<Item = &NodeId> {
        self.forward.get(node).into_iter().flatten()
    }

    pub fn out_degree(&self, node: &NodeId) -> usize {
        self.forward.get(node).map_or(0, FxHashSet::len)
    }

    pub fn in_degree(&self, node: &NodeId) -> usize {
        self.reverse.get(node).map_or(0, FxHashSet::len)
    }

    pub fn contains(&self, node: &NodeId) -> bool {
        match node {
            NodeId::Spec(key) => self.specs.contains_key(key),
            NodeId::Record(key) => self.records.contains_key(key),
        }
    }

    pub fn is_root(&self, node: &NodeId) -> bool {
        match node {
            NodeId::Spec(key) => self.specs.get(key).is_some_and(|e| e.root),
            NodeId::Record(_) => false,
        }
    }

    pub fn spec(&self, node: &NodeId) -> Option<&Specification> {
        match node {
            NodeId::Spec(key) => self.specs.get(key).map(|e| &e.spec),
            NodeId::Record(_) => None,
        }
    }

    pub fn record(&self, node: &NodeId) -> Option<&PackageRecord> {
        match node {
            NodeId::Record(key) => self.records.get(key).map(|e| &e.record),
            NodeId::Spec(_) => None,
        }
    }

    /// Removes `node` and all its incident edges. A no-op if the node is
    /// already absent, so repeated pruning can call this freely.
    pub fn remove(&mut self, node: &NodeId) {
        if !self.contains(node) {
            return;
        }
        match node {
            NodeId::Spec(key) => {
                self.specs.remove(key);
            }
            NodeId::Record(key) => {
                self.records.remove(key);
            }
        }
        if let Some(successors) = self.forward.remove(node) {
            for s in successors {
                if let Some(set) = self.reverse.get_mut(&s) {
                    set.remove(node);
                }
            }
        }
        if let Some(predecessors) = self.reverse.remove(node) {
            for p in predecessors {
                if let Some(set) = self.forward.get_mut(&p) {
                    set.remove(node);
                }
            }
        }
    }

    /// All spec nodes, in insertion order is not guaranteed here; callers
    /// needing deterministic order should sort by canonical string.
    pub fn spec_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.specs.keys().cloned().map(NodeId::Spec)
    }

    pub fn record_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.records.keys().cloned().map(NodeId::Record)
    }

    pub fn root_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.specs
            .iter()
            .filter(|(_, e)| e.root)
            .map(|(k, _)| NodeId::Spec(k.clone()))
    }
}
