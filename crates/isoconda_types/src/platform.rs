use std::fmt;

use serde::{Deserialize, Serialize};

/// A platform partition of a channel, e.g. `"noarch"`, `"linux-64"`,
/// `"win-64"`. Kept as a thin string newtype rather than a closed enum: a
/// mirror must tolerate subdirs it has never seen before.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Subdir(String);

impl Subdir {
    pub fn new(name: impl Into<String>) -> Self {
        Subdir(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub const NOARCH: &'static str = "noarch";
}

impl fmt::Display for Subdir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Subdir {
    fn from(value: &str) -> Self {
        Subdir::new(value)
    }
}

impl From<String> for Subdir {
    fn from(value: String) -> Self {
        Subdir::new(value)
    }
}

impl std::borrow::Borrow<str> for Subdir {
    fn borrow(&self) -> &str {
        &self.0
    }
}
