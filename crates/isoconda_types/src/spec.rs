//! Match-specification parsing: `name [version-constraint[,constraint...]] [build]`.
//!
//! Version constraints accept the comparison operators `==`, `!=`, `>=`,
//! `<=`, `>`, `<`, a bare version (exact match), and a trailing `.*` glob
//! (`startswith`). Examples: `a >=2`, `a 3.0 b001_0`, `a <2`, `a >=1.0,<2.0`.

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::combinator::{eof, map, opt, rest};
use nom::sequence::terminated;
use nom::IResult;
use nom::Parser;

use crate::error::InvalidSpecification;
use crate::record::PackageRecord;
use crate::version::Version;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum RangeOperator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone)]
enum Constraint {
    Comparison(RangeOperator, Version),
    StartsWith(String),
}

impl Constraint {
    fn matches(&self, version: &Version) -> bool {
        match self {
            Constraint::Comparison(op, bound) => {
                use std::cmp::Ordering::*;
                let ord = version.cmp(bound);
                match op {
                    RangeOperator::Eq => ord == Equal,
                    RangeOperator::Ne => ord != Equal,
                    RangeOperator::Lt => ord == Less,
                    RangeOperator::Le => ord != Greater,
                    RangeOperator::Gt => ord == Greater,
                    RangeOperator::Ge => ord != Less,
                }
            }
            Constraint::StartsWith(prefix) => version
                .as_str()
                .to_ascii_lowercase()
                .starts_with(&prefix.to_ascii_lowercase()),
        }
    }
}

fn operator(input: &str) -> IResult<&str, RangeOperator> {
    alt((
        map(tag("=="), |_| RangeOperator::Eq),
        map(tag("!="), |_| RangeOperator::Ne),
        map(tag(">="), |_| RangeOperator::Ge),
        map(tag("<="), |_| RangeOperator::Le),
        map(tag(">"), |_| RangeOperator::Gt),
        map(tag("<"), |_| RangeOperator::Lt),
        map(tag("="), |_| RangeOperator::Eq),
    ))
    .parse(input)
}

fn constraint(input: &str) -> IResult<&str, Constraint> {
    let (remainder, op) = opt(operator).parse(input)?;
    let (remainder, body) = terminated(rest, eof).parse(remainder)?;
    if body.starts_with(['<', '>', '=', '!']) {
        // a second comparator immediately after the first (`>>2`, `=>2`) is
        // not a version body, just a malformed constraint.
        return Err(nom::Err::Failure(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Tag,
        )));
    }
    if let Some(stripped) = body.strip_suffix(".*") {
        if op.is_some() {
            return Err(nom::Err::Failure(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Tag,
            )));
        }
        return Ok((remainder, Constraint::StartsWith(stripped.to_string())));
    }
    let op = op.unwrap_or(RangeOperator::Eq);
    Ok((remainder, Constraint::Comparison(op, Version::parse(body))))
}

fn parse_version_field(field: &str) -> Result<Vec<Constraint>, InvalidSpecification> {
    field
        .split(',')
        .map(|piece| {
            let piece = piece.trim();
            if piece.is_empty() {
                return Err(InvalidSpecification {
                    input: field.to_string(),
                    reason: "empty version constraint".to_string(),
                });
            }
            constraint(piece)
                .map(|(_, c)| c)
                .map_err(|_| InvalidSpecification {
                    input: field.to_string(),
                    reason: format!("malformed version constraint `{piece}`"),
                })
        })
        .collect()
}

fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// A parsed match-specification: predicate over [`PackageRecord`] plus a
/// canonical string form used for equality.
#[derive(Debug, Clone)]
pub struct Specification {
    name: String,
    constraints: Vec<Constraint>,
    build: Option<String>,
    canonical: String,
}

impl Specification {
    /// Parses a match-spec string of the form `name [version] [build]`.
    pub fn parse(input: &str) -> Result<Self, InvalidSpecification> {
        let trimmed = input.trim();
        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        let Some((&name, rest)) = tokens.split_first() else {
            return Err(InvalidSpecification {
                input: input.to_string(),
                reason: "empty specification".to_string(),
            });
        };
        if !valid_name(name) {
            return Err(InvalidSpecification {
                input: input.to_string(),
                reason: format!("invalid package name `{name}`"),
            });
        }
        if rest.len() > 2 {
            return Err(InvalidSpecification {
                input: input.to_string(),
                reason: "too many fields (expected name [version] [build])".to_string(),
            });
        }
        let constraints = match rest.first() {
            Some(version_field) => parse_version_field(version_field)?,
            None => Vec::new(),
        };
        let build = rest.get(1).map(|b| b.to_string());

        let mut canonical = name.to_ascii_lowercase();
        if let Some(version_field) = rest.first() {
            canonical.push(' ');
            canonical.push_str(version_field);
        }
        if let Some(build) = &build {
            canonical.push(' ');
            canonical.push_str(build);
        }

        Ok(Specification {
            name: name.to_ascii_lowercase(),
            constraints,
            build,
            canonical,
        })
    }

    /// An unconstrained match on just a package name (equivalent to `name`).
    pub fn name_only(name: &str) -> Result<Self, InvalidSpecification> {
        Specification::parse(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether `record` satisfies this specification.
    pub fn matches(&self, record: &PackageRecord) -> bool {
        if record.name.to_ascii_lowercase() != self.name {
            return false;
        }
        if !self.constraints.iter().all(|c| c.matches(&record.version)) {
            return false;
        }
        if let Some(build) = &self.build {
            if &record.build != build {
                return false;
            }
        }
        true
    }
}

impl PartialEq for Specification {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Specification {}

impl std::hash::Hash for Specification {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl std::fmt::Display for Specification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, version: &str, build: &str) -> PackageRecord {
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
            depends: Vec::new(),
            timestamp: None,
        }
    }

    #[test]
    fn bare_name_matches_anything() {
        let spec = Specification::parse("a").unwrap();
        assert!(spec.matches(&record("a", "1.0", "0")));
        assert!(spec.matches(&record("a", "999", "xyz")));
        assert!(!spec.matches(&record("b", "1.0", "0")));
    }

    #[test]
    fn gte_constraint() {
        let spec = Specification::parse("a >=2").unwrap();
        assert!(!spec.matches(&record("a", "1", "0")));
        assert!(spec.matches(&record("a", "2", "0")));
        assert!(spec.matches(&record("a", "3", "0")));
    }

    #[test]
    fn exact_build_and_version() {
        let spec = Specification::parse("a 3.0 b001_0").unwrap();
        assert!(spec.matches(&record("a", "3.0", "b001_0")));
        assert!(!spec.matches(&record("a", "3.0", "b002_0")));
        assert!(!spec.matches(&record("a", "3.1", "b001_0")));
    }

    #[test]
    fn lt_constraint() {
        let spec = Specification::parse("a <2").unwrap();
        assert!(spec.matches(&record("a", "1", "0")));
        assert!(!spec.matches(&record("a", "2", "0")));
    }

    #[test]
    fn canonical_equality() {
        let a = Specification::parse("a >=2").unwrap();
        let b = Specification::parse("a >=2").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(Specification::parse("").is_err());
        assert!(Specification::parse("a b c d").is_err());
        assert!(Specification::parse("a >>2").is_err());
        assert!(Specification::parse("a =>2").is_err());
    }

    #[test]
    fn comma_separated_range() {
        let spec = Specification::parse("a >=1.0,<2.0").unwrap();
        assert!(!spec.matches(&record("a", "0.9", "0")));
        assert!(spec.matches(&record("a", "1.5", "0")));
        assert!(!spec.matches(&record("a", "2.0", "0")));
    }

    #[test]
    fn glob_startswith() {
        let spec = Specification::parse("a 1.2.*").unwrap();
        assert!(spec.matches(&record("a", "1.2.3", "0")));
        assert!(!spec.matches(&record("a", "1.3.0", "0")));
    }
}
