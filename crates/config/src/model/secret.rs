//! Secret records and the deduplicated secret list

use crate::document::Literal;
use serde::Serialize;
use std::collections::BTreeMap;

/// A single secret leaf.
///
/// `application` is optional; environment-scoped secrets carry none.
/// Identity is (application + environment when application-scoped, path,
/// key); environment-scoped secrets dedup on (path, key) alone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Secret {
    pub environment: String,
    pub application: Option<String>,
    pub path: String,
    pub key: String,
    pub data: BTreeMap<String, Literal>,
}

impl Secret {
    /// Identity predicate used for dedup
    pub fn same_identity(&self, other: &Secret) -> bool {
        if let (Some(a), Some(b)) = (&self.application, &other.application) {
            if a != b || self.environment != other.environment {
                return false;
            }
        }

        self.path == other.path && self.key == other.key
    }

    /// The path of this secret in the remote hierarchy
    pub fn remote_path(&self) -> String {
        match &self.application {
            Some(app) => format!("secret/{}/{}/{}", self.environment, app, self.path),
            None => format!("secret/{}/{}", self.environment, self.path),
        }
    }
}

/// Append-only secret collection; duplicates are rejected at insert
#[derive(Debug, Default, Serialize)]
pub struct SecretList(Vec<Secret>);

impl SecretList {
    /// Insert unless an equal identity already exists. Returns whether the
    /// insert happened, so the call site can warn on duplicates.
    pub fn add(&mut self, secret: Secret) -> bool {
        if self.0.iter().any(|s| s.same_identity(&secret)) {
            return false;
        }

        self.0.push(secret);
        true
    }

    pub fn get(&self, secret: &Secret) -> Option<&Secret> {
        self.0.iter().find(|s| s.same_identity(secret))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Secret> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Secret> {
        self.0.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Order by environment, application, path for stable output
    pub fn sort(&mut self) {
        self.0.sort_by(|a, b| {
            (&a.environment, &a.application, &a.path).cmp(&(
                &b.environment,
                &b.application,
                &b.path,
            ))
        });
    }
}

impl IntoIterator for SecretList {
    type Item = Secret;
    type IntoIter = std::vec::IntoIter<Secret>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<Secret> for SecretList {
    fn from_iter<I: IntoIterator<Item = Secret>>(iter: I) -> Self {
        let mut list = SecretList::default();
        for secret in iter {
            list.add(secret);
        }
        list
    }
}
