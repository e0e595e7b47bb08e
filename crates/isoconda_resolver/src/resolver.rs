//! The core fix-point expansion and two-pass pruning algorithm.

use std::collections::VecDeque;

use fxhash::{FxHashMap, FxHashSet};
use isoconda_channel::ChannelReader;
use isoconda_types::{EnvironmentConfig, PackageRecord, Specification, Subdir};
use itertools::Itertools;
use tracing::{debug, info, instrument};

use crate::error::ResolveError;
use crate::filter::{Exclusion, FilterChain, Inclusion, LatestBuild, LatestVersion};
use crate::graph::{DependencyGraph, NodeId};

/// The inputs to one resolution run.
pub struct ResolveRequest<'a> {
    pub requirements: &'a [String],
    pub exclusions: &'a [String],
    pub disposables: &'a [String],
    pub config: &'a EnvironmentConfig,
}

fn group_by_name(strings: &[String]) -> Result<FxHashMap<String, Vec<Specification>>, ResolveError> {
    let mut groups: FxHashMap<String, Vec<Specification>> = FxHashMap::default();
    for s in strings {
        let spec = Specification::parse(s)?;
        groups.entry(spec.name().to_string()).or_default().push(spec);
    }
    Ok(groups)
}

fn is_disposable(record: &PackageRecord, disposables: &FxHashMap<String, Vec<Specification>>) -> bool {
    disposables
        .get(&record.name)
        .is_some_and(|group| group.iter().any(|s| s.matches(record)))
}

/// Runs the fix-point expansion, the two pruning passes, and root
/// verification/extraction, and returns the resulting package records.
#[instrument(skip_all)]
pub fn resolve(channel: &dyn ChannelReader, request: &ResolveRequest<'_>) -> Result<Vec<PackageRecord>, ResolveError> {
    let requirements = group_by_name(request.requirements)?;
    let exclusions = group_by_name(request.exclusions)?;
    let disposables = group_by_name(request.disposables)?;
    let subdirs: &[Subdir] = &request.config.subdirs;

    let mut graph = DependencyGraph::new();
    let mut processed: FxHashSet<String> = FxHashSet::default();
    let mut queue: VecDeque<Specification> = VecDeque::new();
    let mut seen_in_queue: FxHashSet<String> = FxHashSet::default();

    for group in requirements.values() {
        for spec in group {
            graph.add_root(spec.clone());
            if seen_in_queue.insert(spec.to_string()) {
                queue.push_back(spec.clone());
            }
        }
    }

    while let Some(s) = queue.pop_front() {
        let canonical = s.to_string();
        if processed.contains(&canonical) {
            continue;
        }
        processed.insert(canonical.clone());
        let spec_id = graph.add_spec(s.clone());

        let raw = channel.query(&s, subdirs)?;
        // chain order follows spec §4.3's table exactly: Inclusion and
        // Exclusion narrow the candidate set before the Latest filters ever
        // see it, so a pinned-out version can never be "latest"-selected and
        // then rejected, which would wrongly starve a satisfiable spec.
        let mut chain = FilterChain::new()
            .push(Inclusion::new(&requirements))
            .push(Exclusion::new(&exclusions));
        if request.config.latest {
            chain = chain.push(LatestVersion::new(&requirements)).push(LatestBuild::new(&requirements));
        }
        let candidates = chain.apply(raw);

        for record in candidates {
            let record_id = graph.add_record(record.clone());
            graph.link_candidate(&spec_id, &record_id);

            for dep in &record.depends {
                let dep_spec = Specification::parse(dep)?;
                let dep_canonical = dep_spec.to_string();
                let dep_id = graph.add_spec(dep_spec.clone());
                graph.link_dependency(&record_id, &dep_id);
                if !processed.contains(&dep_canonical) && seen_in_queue.insert(dep_canonical) {
                    queue.push_back(dep_spec);
                }
            }
        }
    }

    debug!(
        specs = graph.spec_nodes().count(),
        records = graph.record_nodes().count(),
        "graph constructed, pruning"
    );

    let pass2_seeds = prune_unsatisfied(&mut graph);
    prune_orphans(&mut graph, pass2_seeds);

    // sorted so `UnsatisfiedRequirements` reports a stable order regardless
    // of the graph's underlying hash-map iteration order.
    let missing: Vec<String> = graph
        .root_nodes()
        .filter(|root| graph.out_degree(root) == 0)
        .filter_map(|root| graph.spec(&root).map(|s| s.to_string()))
        .sorted()
        .collect();
    if !missing.is_empty() {
        return Err(ResolveError::UnsatisfiedRequirements { missing });
    }

    let result: Vec<PackageRecord> = graph
        .record_nodes()
        .filter_map(|node| graph.record(&node).cloned())
        .filter(|record| !is_disposable(record, &disposables))
        .collect();

    info!(count = result.len(), "resolution complete");
    Ok(result)
}

/// Pass 1: removes every non-root spec with zero outgoing candidate edges,
/// cascading through the record predecessors it orphans and any spec that
/// becomes unsatisfied as a result. Root specs are never removed, only left
/// in place for root verification to detect.
fn prune_unsatisfied(graph: &mut DependencyGraph) -> FxHashSet<NodeId> {
    let mut pass2_seeds = FxHashSet::new();
    let mut handled_roots: FxHashSet<NodeId> = FxHashSet::default();
    let mut worklist: VecDeque<NodeId> = graph.spec_nodes().filter(|s| graph.out_degree(s) == 0).collect();

    while let Some(s) = worklist.pop_front() {
        if !graph.contains(&s) || graph.out_degree(&s) != 0 {
            continue;
        }
        let is_root = graph.is_root(&s);
        if is_root {
            if !handled_roots.insert(s.clone()) {
                continue;
            }
        }

        let predecessors: Vec<NodeId> = graph.predecessors(&s).cloned().collect();
        if !is_root {
            graph.remove(&s);
        }

        for p in predecessors {
            if !graph.contains(&p) {
                continue;
            }
            let successors_of_p: Vec<NodeId> = graph.successors(&p).cloned().collect();
            let predecessors_of_p: Vec<NodeId> = graph.predecessors(&p).cloned().collect();
            graph.remove(&p);

            for q in successors_of_p {
                if graph.contains(&q) && graph.in_degree(&q) == 0 && !graph.is_root(&q) {
                    pass2_seeds.insert(q);
                }
            }
            for g in predecessors_of_p {
                if graph.contains(&g) && graph.out_degree(&g) == 0 {
                    worklist.push_back(g);
                }
            }
        }
    }

    pass2_seeds
}

/// Pass 2: removes every non-root spec with zero record predecessors and
/// every record with zero spec predecessors, cascading through successors
/// until the graph reaches a fixed point. `seeds` are the specs Pass 1 found
/// newly orphaned while it cascaded; a fresh full scan is still taken so Pass
/// 2 is correct even when called on its own.
fn prune_orphans(graph: &mut DependencyGraph, seeds: FxHashSet<NodeId>) {
    let mut worklist: VecDeque<NodeId> = seeds
        .into_iter()
        .chain(graph.spec_nodes().filter(|s| !graph.is_root(s) && graph.in_degree(s) == 0))
        .chain(graph.record_nodes().filter(|r| graph.in_degree(r) == 0))
        .collect();

    while let Some(node) = worklist.pop_front() {
        if !graph.contains(&node) {
            continue;
        }
        let is_orphan = match &node {
            NodeId::Spec(_) => !graph.is_root(&node) && graph.in_degree(&node) == 0,
            NodeId::Record(_) => graph.in_degree(&node) == 0,
        };
        if !is_orphan {
            continue;
        }
        let successors: Vec<NodeId> = graph.successors(&node).cloned().collect();
        graph.remove(&node);
        for s in successors {
            if graph.contains(&s) {
                worklist.push_back(s);
            }
        }
    }
}
