//! SELinux policy variants and the module this crate manages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Name of the policy module shipped by Pulp.
pub const DEFAULT_MODULE: &str = "pulp";

/// A policy configuration profile with its own module store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyVariant {
    /// Multi-level security policy.
    Mls,
    /// Strict policy.
    Strict,
    /// Targeted policy (the default on most hosts).
    Targeted,
}

impl PolicyVariant {
    /// Every variant, in the order cleanup walks them.
    pub const ALL: [PolicyVariant; 3] = [Self::Mls, Self::Strict, Self::Targeted];

    /// Store name passed to `semodule -s`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mls => "mls",
            Self::Strict => "strict",
            Self::Targeted => "targeted",
        }
    }
}

impl fmt::Display for PolicyVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown variant name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown policy variant '{0}' (expected mls, strict or targeted)")]
pub struct UnknownVariant(pub String);

impl FromStr for PolicyVariant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mls" => Ok(Self::Mls),
            "strict" => Ok(Self::Strict),
            "targeted" => Ok(Self::Targeted),
            _ => Err(UnknownVariant(s.to_owned())),
        }
    }
}
