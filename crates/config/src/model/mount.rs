//! Secret backend mount records

use crate::document::Literal;
use serde::Serialize;
use std::collections::BTreeMap;

/// A named free-form data block, used for mount/auth `config {}` and
/// `role {}` bodies
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedData {
    pub name: String,
    pub data: BTreeMap<String, Literal>,
}

/// A secret backend mount. Identity is the name alone.
///
/// A later stanza reusing the name may only add roles; everything else is
/// immutable after the first definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mount {
    pub environment: String,
    pub name: String,
    pub backend: String,
    pub path: Option<String>,
    pub description: Option<String>,
    pub default_lease_ttl: Option<String>,
    pub max_lease_ttl: Option<String>,
    pub config: Vec<NamedData>,
    pub roles: Vec<NamedData>,
}

impl Mount {
    /// The mount point this record manages, defaulting to the name
    pub fn mount_point(&self) -> &str {
        self.path.as_deref().unwrap_or(&self.name)
    }
}

/// Mount collection keyed by name
#[derive(Debug, Default, Serialize)]
pub struct Mounts(Vec<Mount>);

impl Mounts {
    pub fn add(&mut self, mount: Mount) -> bool {
        if self.find(&mount.name).is_some() {
            return false;
        }

        self.0.push(mount);
        true
    }

    pub fn find(&self, name: &str) -> Option<&Mount> {
        self.0.iter().find(|m| m.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Mount> {
        self.0.iter_mut().find(|m| m.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mount> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
