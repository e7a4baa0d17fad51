//! High-level configuration loading with a builder API.

use crate::context::CompileContext;
use crate::parser::Config;
use crate::renderer::Renderer;
use crate::scanner::Scanner;
use hashictl_core::constants::DEFAULT_MAX_RENDER_DEPTH;
use hashictl_core::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Builder that assembles a renderer, scanner, and compile context and
/// runs a full compile pass.
pub struct ConfigLoader {
    environment: String,
    application: Option<String>,
    variables: Vec<String>,
    variable_files: Vec<PathBuf>,
    max_render_depth: usize,
}

impl ConfigLoader {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            application: None,
            variables: Vec::new(),
            variable_files: Vec::new(),
            max_render_depth: DEFAULT_MAX_RENDER_DEPTH,
        }
    }

    #[must_use]
    pub fn with_application(mut self, application: impl Into<String>) -> Self {
        self.application = Some(application.into());
        self
    }

    /// Add one `key=value` template variable
    #[must_use]
    pub fn with_variable(mut self, pair: impl Into<String>) -> Self {
        self.variables.push(pair.into());
        self
    }

    #[must_use]
    pub fn with_variables(mut self, pairs: impl IntoIterator<Item = String>) -> Self {
        self.variables.extend(pairs);
        self
    }

    #[must_use]
    pub fn with_variable_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.variable_files.push(path.into());
        self
    }

    #[must_use]
    pub fn with_variable_files(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.variable_files.extend(paths);
        self
    }

    #[must_use]
    pub fn with_max_render_depth(mut self, depth: usize) -> Self {
        self.max_render_depth = depth;
        self
    }

    /// Compile everything under `root` (a file or a directory) into a
    /// fresh [`Config`].
    pub fn load(&self, root: &Path) -> Result<Config> {
        debug!(root = %root.display(), environment = %self.environment, "loading configuration");

        let renderer = Renderer::new(&self.variables, &self.variable_files)?
            .with_max_depth(self.max_render_depth);

        let mut context = CompileContext::new(&self.environment);
        if let Some(app) = &self.application {
            context = context.with_application(app);
        }

        let scanner = Scanner::new(&renderer, &context);

        let mut config = Config::new();
        scanner.scan(root, &mut config)?;
        config.secrets.sort();

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_a_directory_end_to_end() {
        let dir = tempfile::tempdir().expect("tempdir");

        fs::write(
            dir.path().join("vars.var.hcl"),
            "consul_domain = \"acme\"\n",
        )
        .expect("write");
        fs::write(
            dir.path().join("api.hcl"),
            "environment \"*\" {\n  application \"api\" {\n    kv \"upstream\" {\n      value = \"[[ service \"postgres\" ]]\"\n    }\n  }\n}\n",
        )
        .expect("write");

        let config = ConfigLoader::new("prod")
            .with_variable_file(dir.path().join("vars.var.hcl"))
            .load(dir.path())
            .expect("load");

        assert!(config.environments.find("prod").is_some());

        let kvs: Vec<_> = config.consul_kvs.iter().collect();
        assert_eq!(kvs.len(), 1);
        assert_eq!(kvs[0].value, b"postgres.service.acme");
    }

    #[test]
    fn variable_pairs_override_file_values() {
        let dir = tempfile::tempdir().expect("tempdir");

        fs::write(dir.path().join("vars.var.hcl"), "owner = \"file\"\n").expect("write");
        fs::write(
            dir.path().join("app.hcl"),
            "environment \"prod\" {\n  kv \"owner\" {\n    value = \"[[ lookup \"owner\" ]]\"\n  }\n}\n",
        )
        .expect("write");

        let config = ConfigLoader::new("prod")
            .with_variable_file(dir.path().join("vars.var.hcl"))
            .with_variable("owner=cli")
            .load(dir.path())
            .expect("load");

        let kvs: Vec<_> = config.consul_kvs.iter().collect();
        assert_eq!(kvs[0].value, b"cli");
    }
}
