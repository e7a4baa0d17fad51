//! Access policy records

use serde::Serialize;

/// One `path {}` rule inside a policy body.
///
/// Old-style single-word levels are expanded into the classic capability
/// sets at parse time; `capabilities` is always the expanded form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathCapabilities {
    pub path: String,
    pub capabilities: Vec<String>,
}

/// Expand an old-style policy level into its capability set
pub fn expand_policy_level(level: &str) -> Option<Vec<String>> {
    let caps: &[&str] = match level {
        "deny" => &["deny"],
        "read" => &["read", "list"],
        "write" => &["create", "read", "update", "delete", "list"],
        "sudo" => &["create", "read", "update", "delete", "list", "sudo"],
        _ => return None,
    };

    Some(caps.iter().map(|c| (*c).to_string()).collect())
}

/// An access policy. Identity is (name, environment).
///
/// `raw` is the pretty-printed body text; that text, not the parsed
/// rules, is what gets shipped to the remote policy engine. The parsed
/// rules exist for documentation and validation only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Policy {
    pub environment: String,
    pub application: Option<String>,
    pub name: String,
    pub raw: String,
    pub paths: Vec<PathCapabilities>,
}

impl Policy {
    pub fn same_identity(&self, other: &Policy) -> bool {
        self.name == other.name && self.environment == other.environment
    }
}

/// Append-only policy collection; duplicates are rejected at insert
#[derive(Debug, Default, Serialize)]
pub struct Policies(Vec<Policy>);

impl Policies {
    /// Insert unless an equal identity already exists; returns whether the
    /// insert happened
    pub fn add(&mut self, policy: Policy) -> bool {
        if self.0.iter().any(|p| p.same_identity(&policy)) {
            return false;
        }

        self.0.push(policy);
        true
    }

    pub fn find(&self, environment: &str, name: &str) -> Option<&Policy> {
        self.0
            .iter()
            .find(|p| p.environment == environment && p.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Policy> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
