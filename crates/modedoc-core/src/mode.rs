//! The active mode
//!
//! A mode selects which content survives a transform run and which
//! short-code dictionary is consulted. It is chosen once by the host and
//! passed by value into every entry point.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Target language variant of a document
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Python edition
    #[default]
    Python,
    /// R edition
    R,
}

impl Mode {
    /// Every supported mode
    pub const ALL: [Mode; 2] = [Mode::Python, Mode::R];

    /// Canonical name, as used in `class` attributes and directive names
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Python => "python",
            Mode::R => "r",
        }
    }

    /// Check whether a classification attribute selects this mode
    ///
    /// Comparison is exact; a missing attribute never matches.
    pub fn matches_class(self, class: Option<&str>) -> bool {
        class == Some(self.as_str())
    }

    /// Look up the mode whose canonical name is `tag`
    pub fn from_tag(tag: &str) -> Option<Mode> {
        Mode::ALL.into_iter().find(|m| m.as_str() == tag)
    }

    fn expected() -> String {
        Mode::ALL
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(Mode::Python),
            "r" => Ok(Mode::R),
            _ => Err(CoreError::UnknownMode(s.to_string(), Mode::expected())),
        }
    }
}
