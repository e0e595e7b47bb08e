//! The seven literal end-to-end scenarios, each restricted to subdir
//! `"noarch"`.

use isoconda_channel::InMemoryChannelReader;
use isoconda_resolver::{resolve, ResolveError, ResolveRequest};
use isoconda_types::{EnvironmentConfig, PackageRecord, Subdir, Version};

fn record(name: &str, version: &str, build: &str, depends: Vec<&str>) -> PackageRecord {
    PackageRecord {
        name: name.to_string(),
        version: Version::parse(version),
        build: build.to_string(),
        build_number: 0,
        subdir: "noarch".to_string(),
        filename: format!("{name}-{version}-{build}.conda"),
        url: String::new(),
        sha256: String::new(),
        size: 0,
        depends: depends.into_iter().map(str::to_string).collect(),
        timestamp: None,
    }
}

fn config() -> EnvironmentConfig {
    EnvironmentConfig {
        subdirs: vec![Subdir::new("noarch")],
        latest: false,
    }
}

fn names(records: &[PackageRecord]) -> Vec<String> {
    let mut names: Vec<String> = records.iter().map(|r| format!("{}-{}", r.name, r.version)).collect();
    names.sort();
    names
}

#[test]
fn simple_pin() {
    let mut channel = InMemoryChannelReader::new();
    channel.insert(
        "noarch",
        vec![record("a", "1", "0", vec![]), record("a", "2", "0", vec![]), record("a", "3", "0", vec![])],
    );
    let requirements = vec!["a >=2".to_string()];
    let cfg = config();
    let request = ResolveRequest {
        requirements: &requirements,
        exclusions: &[],
        disposables: &[],
        config: &cfg,
    };
    let result = resolve(&channel, &request).unwrap();
    assert_eq!(names(&result), vec!["a-2", "a-3"]);
}

#[test]
fn exact_build() {
    let mut channel = InMemoryChannelReader::new();
    channel.insert("noarch", vec![record("a", "3", "0", vec![]), record("a", "3", "b001_0", vec![])]);
    let requirements = vec!["a 3.0 b001_0".to_string()];
    let cfg = config();
    let request = ResolveRequest {
        requirements: &requirements,
        exclusions: &[],
        disposables: &[],
        config: &cfg,
    };
    let result = resolve(&channel, &request).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].build, "b001_0");
}

#[test]
fn transitive_pin() {
    let mut channel = InMemoryChannelReader::new();
    channel.insert(
        "noarch",
        vec![
            record("a", "1", "0", vec!["b >=1,<2"]),
            record("a", "2", "0", vec!["b >=2,<3"]),
            record("a", "3", "0", vec!["b >=3"]),
            record("b", "1", "0", vec![]),
            record("b", "2", "0", vec![]),
            record("b", "3", "0", vec![]),
        ],
    );
    let requirements = vec!["a".to_string(), "b >=2".to_string()];
    let cfg = config();
    let request = ResolveRequest {
        requirements: &requirements,
        exclusions: &[],
        disposables: &[],
        config: &cfg,
    };
    let result = resolve(&channel, &request).unwrap();
    assert_eq!(names(&result), vec!["a-2", "a-3", "b-2", "b-3"]);
}

#[test]
fn unsatisfiable_dependency_partial() {
    let mut channel = InMemoryChannelReader::new();
    channel.insert(
        "noarch",
        vec![
            record("a", "1", "0", vec!["b"]),
            record("a", "2", "0", vec!["c"]),
            record("c", "1", "0", vec![]),
        ],
    );
    let requirements = vec!["a".to_string()];
    let cfg = config();
    let request = ResolveRequest {
        requirements: &requirements,
        exclusions: &[],
        disposables: &[],
        config: &cfg,
    };
    let result = resolve(&channel, &request).unwrap();
    assert_eq!(names(&result), vec!["a-2", "c-1"]);
}

#[test]
fn unsatisfiable_dependency_total_failure() {
    let mut channel = InMemoryChannelReader::new();
    channel.insert(
        "noarch",
        vec![record("a", "1", "0", vec!["b"]), record("a", "2", "0", vec!["c"])],
    );
    let requirements = vec!["a".to_string()];
    let cfg = config();
    let request = ResolveRequest {
        requirements: &requirements,
        exclusions: &[],
        disposables: &[],
        config: &cfg,
    };
    let err = resolve(&channel, &request).unwrap_err();
    match err {
        ResolveError::UnsatisfiedRequirements { missing } => assert_eq!(missing, vec!["a".to_string()]),
        other => panic!("expected UnsatisfiedRequirements, got {other:?}"),
    }
}

#[test]
fn cycle_is_tolerated() {
    let mut channel = InMemoryChannelReader::new();
    channel.insert("noarch", vec![record("a", "1", "0", vec!["b"]), record("b", "1", "0", vec!["a"])]);
    let requirements = vec!["a".to_string()];
    let cfg = config();
    let request = ResolveRequest {
        requirements: &requirements,
        exclusions: &[],
        disposables: &[],
        config: &cfg,
    };
    let result = resolve(&channel, &request).unwrap();
    assert_eq!(names(&result), vec!["a-1", "b-1"]);
}

#[test]
fn exclusion_removes_matching_records() {
    let mut channel = InMemoryChannelReader::new();
    channel.insert(
        "noarch",
        vec![record("a", "1", "0", vec![]), record("a", "2", "0", vec![]), record("a", "3", "0", vec![])],
    );
    let requirements = vec!["a".to_string()];
    let exclusions = vec!["a <2".to_string()];
    let cfg = config();
    let request = ResolveRequest {
        requirements: &requirements,
        exclusions: &exclusions,
        disposables: &[],
        config: &cfg,
    };
    let result = resolve(&channel, &request).unwrap();
    assert_eq!(names(&result), vec!["a-2", "a-3"]);
}

#[test]
fn disposable_participates_but_is_not_emitted() {
    let mut channel = InMemoryChannelReader::new();
    channel.insert("noarch", vec![record("a", "1", "0", vec!["b"]), record("b", "1", "0", vec![])]);
    let requirements = vec!["a".to_string()];
    let disposables = vec!["b".to_string()];
    let cfg = config();
    let request = ResolveRequest {
        requirements: &requirements,
        exclusions: &[],
        disposables: &disposables,
        config: &cfg,
    };
    let result = resolve(&channel, &request).unwrap();
    assert_eq!(names(&result), vec!["a-1"]);
}

#[test]
fn empty_requirements_yield_empty_result() {
    let channel = InMemoryChannelReader::new();
    let cfg = config();
    let request = ResolveRequest {
        requirements: &[],
        exclusions: &[],
        disposables: &[],
        config: &cfg,
    };
    let result = resolve(&channel, &request).unwrap();
    assert!(result.is_empty());
}

/// Inclusion/Exclusion must narrow the candidate set before LatestVersion
/// picks a winner: a requirement that rules out the channel's newest release
/// must still resolve to the newest release it *does* allow, not fail.
#[test]
fn latest_mode_respects_requirement_bound_ahead_of_latest_selection() {
    let mut channel = InMemoryChannelReader::new();
    channel.insert(
        "noarch",
        vec![record("a", "1", "0", vec![]), record("a", "2", "0", vec![]), record("a", "3", "0", vec![])],
    );
    let requirements = vec!["a <3".to_string()];
    let cfg = EnvironmentConfig {
        subdirs: vec![Subdir::new("noarch")],
        latest: true,
    };
    let request = ResolveRequest {
        requirements: &requirements,
        exclusions: &[],
        disposables: &[],
        config: &cfg,
    };
    let result = resolve(&channel, &request).unwrap();
    assert_eq!(names(&result), vec!["a-2"]);
}
