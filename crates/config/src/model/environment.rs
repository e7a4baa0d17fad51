//! Environment records

use serde::Serialize;

/// A named environment. Identity is the name alone; the application list
/// holds keys into [`super::Applications`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Environment {
    pub name: String,
    pub applications: Vec<String>,
}

impl Environment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            applications: Vec::new(),
        }
    }

    /// Record an application key, keeping the list free of duplicates
    pub fn add_application(&mut self, name: &str) {
        if !self.applications.iter().any(|a| a == name) {
            self.applications.push(name.to_string());
        }
    }
}

/// Identity-keyed environment collection with get-or-set insertion
#[derive(Debug, Default, Serialize)]
pub struct Environments(Vec<Environment>);

impl Environments {
    /// Return the environment with this name, inserting a fresh record on
    /// first sight. Later stanzas for the same name keep mutating the one
    /// shared record.
    pub fn get_or_set(&mut self, name: &str) -> &mut Environment {
        let idx = match self.0.iter().position(|e| e.name == name) {
            Some(idx) => idx,
            None => {
                self.0.push(Environment::new(name));
                self.0.len() - 1
            }
        };

        &mut self.0[idx]
    }

    pub fn find(&self, name: &str) -> Option<&Environment> {
        self.0.iter().find(|e| e.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Environment> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
