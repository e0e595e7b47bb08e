//! The dependency resolution core: a bipartite spec/record graph, composable
//! query filters, and the fix-point expansion + two-pass pruning algorithm
//! that turns a set of requirements into the closed set of records needed to
//! satisfy them.

mod error;
mod filter;
mod graph;
mod resolver;

pub use error::ResolveError;
pub use filter::{Exclusion, Filter, FilterChain, Inclusion, LatestBuild, LatestVersion};
pub use graph::{DependencyGraph, NodeId, RecordKey};
pub use resolver::{resolve, ResolveRequest};
