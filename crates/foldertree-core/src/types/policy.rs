//! Folder delete policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What happens to the descendants of a deleted folder.
///
/// Videos are never deleted by either policy; only their `folder_id`
/// changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// Descendant folders are deleted with the target. Videos anywhere in
    /// the removed subtree have their folder cleared.
    Cascade,
    /// Direct children are reparented to the deleted folder's parent.
    /// Videos in the deleted folder follow them to that parent.
    #[default]
    Promote,
}

impl fmt::Display for DeletePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cascade => write!(f, "cascade"),
            Self::Promote => write!(f, "promote"),
        }
    }
}

impl FromStr for DeletePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cascade" => Ok(Self::Cascade),
            "promote" => Ok(Self::Promote),
            other => Err(format!("unknown delete policy '{other}'")),
        }
    }
}
