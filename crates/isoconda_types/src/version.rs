//! Conda-style version ordering.
//!
//! Grammar: an optional `!`-terminated epoch, then `.`-separated segments,
//! each segment further split into runs of digits and runs of non-digits.
//! Comparison is component-wise with `"dev" < "_" < identifier < number <
//! "post"`, case-insensitive, missing trailing segments pad as `0`.

use std::cmp::Ordering;
use std::fmt;

use itertools::{EitherOrBoth, Itertools};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A single token within a dot-separated version segment.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
enum Component {
    Dev,
    Underscore,
    Iden(String),
    Numeral(u64),
    Post,
}

impl Component {
    fn rank(&self) -> u8 {
        match self {
            Component::Dev => 0,
            Component::Underscore => 1,
            Component::Iden(_) => 2,
            Component::Numeral(_) => 3,
            Component::Post => 4,
        }
    }
}

impl Ord for Component {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank()).then_with(|| match (self, other) {
            (Component::Iden(a), Component::Iden(b)) => a.cmp(b),
            (Component::Numeral(a), Component::Numeral(b)) => a.cmp(b),
            _ => Ordering::Equal,
        })
    }
}

impl PartialOrd for Component {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The tokens of a single dot-separated segment. Most segments (`"0"`,
/// `"post1"`, `"dev0"`) hold one or two tokens, so four inline slots avoid a
/// heap allocation for the overwhelming majority of real version strings.
type Tokens = SmallVec<[Component; 4]>;

fn tokenize_segment(segment: &str) -> Tokens {
    let lowered = segment.to_ascii_lowercase();
    if lowered.is_empty() {
        return Tokens::from_elem(Component::Numeral(0), 1);
    }
    let mut tokens = Tokens::new();
    let mut chars = lowered.chars().peekable();
    let mut run = String::new();
    let mut run_is_digit = chars.peek().is_some_and(char::is_ascii_digit);
    while let Some(&c) = chars.peek() {
        let is_digit = c.is_ascii_digit();
        if is_digit != run_is_digit && !run.is_empty() {
            tokens.push(finish_run(&run, run_is_digit));
            run.clear();
        }
        run_is_digit = is_digit;
        run.push(c);
        chars.next();
    }
    if !run.is_empty() {
        tokens.push(finish_run(&run, run_is_digit));
    }
    if tokens.is_empty() {
        tokens.push(Component::Numeral(0));
    }
    tokens
}

fn finish_run(run: &str, is_digit: bool) -> Component {
    if is_digit {
        Component::Numeral(run.parse().unwrap_or(u64::MAX))
    } else if run == "dev" {
        Component::Dev
    } else if run == "post" {
        Component::Post
    } else if run == "_" {
        Component::Underscore
    } else {
        Component::Iden(run.to_string())
    }
}

/// A parsed, orderable Conda version string.
#[derive(Debug, Clone, Eq)]
pub struct Version {
    source: String,
    epoch: u64,
    segments: Vec<Tokens>,
}

impl Version {
    /// Parses a version string. Never fails: any input that contains no
    /// recognizable structure is treated as a single opaque segment, which
    /// still orders consistently (it just won't compare meaningfully against
    /// structured versions of different shape).
    pub fn parse(input: &str) -> Self {
        let (epoch, rest) = match input.split_once('!') {
            Some((epoch_str, rest)) => (epoch_str.parse().unwrap_or(0), rest),
            None => (0, input),
        };
        let segments = rest.split('.').map(tokenize_segment).collect();
        Version {
            source: input.to_string(),
            epoch,
            segments,
        }
    }

    /// The original, unnormalized source string.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Compares two equal-length runs of tokens, treating an absent token on
/// either side as `Numeral(0)` (a missing trailing segment pads as zero).
fn compare_tokens(a: &[Component], b: &[Component]) -> Ordering {
    let zero = Component::Numeral(0);
    for pair in a.iter().zip_longest(b.iter()) {
        let (left, right) = match pair {
            EitherOrBoth::Both(l, r) => (l, r),
            EitherOrBoth::Left(l) => (l, &zero),
            EitherOrBoth::Right(r) => (&zero, r),
        };
        let ord = left.cmp(right);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl std::hash::Hash for Version {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.epoch.hash(state);
        for segment in &self.segments {
            for component in segment {
                if !matches!(component, Component::Numeral(0)) {
                    component.hash(state);
                }
            }
        }
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.epoch != other.epoch {
            return self.epoch.cmp(&other.epoch);
        }
        let zero_segment: Tokens = Tokens::from_elem(Component::Numeral(0), 1);
        for pair in self.segments.iter().zip_longest(other.segments.iter()) {
            let (a, b) = match pair {
                EitherOrBoth::Both(a, b) => (a, b),
                EitherOrBoth::Left(a) => (a, &zero_segment),
                EitherOrBoth::Right(b) => (&zero_segment, b),
            };
            let ord = compare_tokens(a, b);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Version::parse(&s))
    }
}

impl From<&str> for Version {
    fn from(value: &str) -> Self {
        Version::parse(value)
    }
}

impl From<String> for Version {
    fn from(value: String) -> Self {
        Version::parse(&value)
    }
}
