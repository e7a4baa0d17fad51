//! Auth backend records

use super::mount::NamedData;
use serde::Serialize;

/// An auth backend. Identity is the name alone; the same immutability
/// rule as [`super::Mount`] applies: config is fixed after the first
/// definition, roles accumulate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthBackend {
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

/// Auth backend collection keyed by name
#[derive(Debug, Default, Serialize)]
pub struct AuthBackends(Vec<AuthBackend>);

impl AuthBackends {
    pub fn add(&mut self, auth: AuthBackend) -> bool {
        if self.find(&auth.name).is_some() {
            return false;
        }

        self.0.push(auth);
        true
    }

    pub fn find(&self, name: &str) -> Option<&AuthBackend> {
        self.0.iter().find(|a| a.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut AuthBackend> {
        self.0.iter_mut().find(|a| a.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AuthBackend> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
