//! Directory scanner: feeds every eligible file through the renderer and
//! parser into the merge model.
//!
//! Per-file errors are wrapped with the path relative to the scan root
//! and aggregated; a scan never stops at the first failing file.

use crate::context::CompileContext;
use crate::parser::Config;
use crate::renderer::Renderer;
use crate::variables;
use hashictl_core::constants::{CONFIG_EXTENSION, TEMPLATE_EXTENSION, VARIABLE_FILE_SUFFIX};
use hashictl_core::{Error, Result};
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

pub struct Scanner<'a> {
    renderer: &'a Renderer,
    context: &'a CompileContext,
}

impl<'a> Scanner<'a> {
    pub fn new(renderer: &'a Renderer, context: &'a CompileContext) -> Self {
        Self { renderer, context }
    }

    /// Process a single file, or walk a directory tree (symlinks
    /// followed), merging every eligible file into `config`.
    pub fn scan(&self, root: &Path, config: &mut Config) -> Result<()> {
        let meta = std::fs::metadata(root).map_err(|e| Error::file_system(root, "stat", e))?;

        if meta.is_file() {
            let base = root.parent().unwrap_or_else(|| Path::new(""));
            return self
                .process_file(root, base, config)
                .map_err(|err| Error::in_file(file_name(root), err));
        }

        let mut errors = Vec::new();

        for entry in WalkDir::new(root).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    errors.push(Error::configuration(format!(
                        "failed to walk '{}': {e}",
                        root.display()
                    )));
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !self.should_process(path) {
                continue;
            }

            if let Err(err) = self.process_file(path, root, config) {
                let rel = path.strip_prefix(root).unwrap_or(path);
                errors.push(Error::in_file(rel.display().to_string(), err));
            }
        }

        Error::aggregate_result(errors)
    }

    fn should_process(&self, path: &Path) -> bool {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        if ext != CONFIG_EXTENSION && ext != TEMPLATE_EXTENSION {
            debug!(path = %path.display(), "ignoring file, not a configuration extension");
            return false;
        }

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if name.ends_with(VARIABLE_FILE_SUFFIX) {
            debug!(path = %path.display(), "skipping variable file");
            return false;
        }

        // files already consumed as variable sources have a different
        // syntax and must not be parsed as configuration
        if let Ok(abs) = variables::absolute_path(path) {
            if self
                .renderer
                .consumed_variable_files()
                .iter()
                .any(|f| *f == abs)
            {
                debug!(path = %path.display(), "skipping consumed variable file");
                return false;
            }
        }

        true
    }

    fn process_file(&self, path: &Path, root: &Path, config: &mut Config) -> Result<()> {
        debug!(path = %path.display(), "processing file");

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::file_system(path, "read", e))?;

        let rel = path
            .strip_prefix(root)
            .unwrap_or(path)
            .display()
            .to_string();

        let rendered = self.renderer.render(&content, &rel)?;
        config.process_content(&rendered, &rel, self.context)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scan_dir(dir: &Path, environment: &str) -> (Config, Result<()>) {
        let renderer = Renderer::new(&[], &[]).expect("renderer");
        let ctx = CompileContext::new(environment);
        let scanner = Scanner::new(&renderer, &ctx);

        let mut config = Config::new();
        let result = scanner.scan(dir, &mut config);
        (config, result)
    }

    #[test]
    fn scans_directory_and_skips_variable_files() {
        let dir = tempfile::tempdir().expect("tempdir");

        fs::write(
            dir.path().join("app.hcl"),
            "environment \"prod\" {\n  application \"api\" {\n    secret \"db\" {\n      username = \"app\"\n    }\n  }\n}\n",
        )
        .expect("write");
        fs::write(dir.path().join("vars.var.hcl"), "this is not valid { config")
            .expect("write");
        fs::write(dir.path().join("notes.txt"), "ignored").expect("write");

        let (config, result) = scan_dir(dir.path(), "prod");
        result.expect("scan should succeed");

        assert_eq!(config.secrets.len(), 1);
        assert!(config.applications.find("prod", "api").is_some());
    }

    #[test]
    fn failing_file_does_not_stop_its_siblings() {
        let dir = tempfile::tempdir().expect("tempdir");

        fs::write(dir.path().join("bad.hcl"), "environment \"prod\" {").expect("write");
        fs::write(
            dir.path().join("good.hcl"),
            "environment \"prod\" {\n  secret \"token\" {\n    value = \"t\"\n  }\n}\n",
        )
        .expect("write");

        let (config, result) = scan_dir(dir.path(), "prod");

        let err = result.unwrap_err();
        assert!(err.to_string().contains("bad.hcl"), "got: {err}");

        // the good sibling was still merged
        assert_eq!(config.secrets.len(), 1);
    }

    #[test]
    fn single_file_root_is_processed_directly() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("single.hcl");
        fs::write(
            &file,
            "environment \"prod\" {\n  secret \"token\" {\n    value = \"t\"\n  }\n}\n",
        )
        .expect("write");

        let (config, result) = scan_dir(&file, "prod");
        result.expect("scan should succeed");
        assert_eq!(config.secrets.len(), 1);
    }

    #[test]
    fn consumed_variable_file_is_not_parsed_as_configuration() {
        let dir = tempfile::tempdir().expect("tempdir");

        // a plain .hcl file used as a variable source
        let vars = dir.path().join("globals.hcl");
        fs::write(&vars, "consul_domain = \"acme\"\n").expect("write");
        fs::write(
            dir.path().join("app.hcl"),
            "environment \"prod\" {\n  kv \"domain\" {\n    value = \"[[ lookup \"consul_domain\" ]]\"\n  }\n}\n",
        )
        .expect("write");

        let renderer = Renderer::new(&[], &[vars]).expect("renderer");
        let ctx = CompileContext::new("prod");
        let scanner = Scanner::new(&renderer, &ctx);

        let mut config = Config::new();
        scanner.scan(dir.path(), &mut config).expect("scan");

        let kvs: Vec<_> = config.consul_kvs.iter().collect();
        assert_eq!(kvs.len(), 1);
        assert_eq!(kvs[0].value, b"acme");
    }
}
