//! Application records

use serde::Serialize;

/// An application within an environment. Identity is (name, environment).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Application {
    pub environment: String,
    pub name: String,
}

impl Application {
    pub fn new(environment: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            name: name.into(),
        }
    }
}

/// Identity-keyed application collection with get-or-set insertion
#[derive(Debug, Default, Serialize)]
pub struct Applications(Vec<Application>);

impl Applications {
    pub fn get_or_set(&mut self, environment: &str, name: &str) -> &mut Application {
        let idx = match self
            .0
            .iter()
            .position(|a| a.environment == environment && a.name == name)
        {
            Some(idx) => idx,
            None => {
                self.0.push(Application::new(environment, name));
                self.0.len() - 1
            }
        };

        &mut self.0[idx]
    }

    pub fn find(&self, environment: &str, name: &str) -> Option<&Application> {
        self.0
            .iter()
            .find(|a| a.environment == environment && a.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Application> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
