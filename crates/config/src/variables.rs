//! Template variable sources: `key=value` pairs and variable files.
//!
//! Variable files are plain data, not configuration; the scanner skips
//! them by absolute path once they have been consumed here.

use hashictl_core::{Error, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Parse `key=value` pairs supplied on the command line
pub fn parse_variable_pairs(pairs: &[String]) -> Result<Map<String, Value>> {
    let mut out = Map::new();

    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(Error::configuration(format!(
                "variable pair '{pair}' is not valid, expected key=value"
            )));
        };

        out.insert(key.to_string(), Value::String(value.to_string()));
    }

    Ok(out)
}

/// Load a variable file, dispatching on its extension
pub fn load_variable_file(path: &Path) -> Result<Map<String, Value>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::file_system(path, "read", e))?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    match ext {
        "hcl" => hcl::from_str(&content).map_err(|e| {
            Error::parse(path.display().to_string(), format!("variable file: {e}"))
        }),
        "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| {
            Error::parse(path.display().to_string(), format!("variable file: {e}"))
        }),
        "json" => serde_json::from_str(&content).map_err(|e| {
            Error::parse(path.display().to_string(), format!("variable file: {e}"))
        }),
        other => Err(Error::configuration(format!(
            "variable file extension '{other}' is not supported (hcl, yaml, yml, json)"
        ))),
    }
}

/// Canonical absolute path, used for consumed-file bookkeeping
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    let cwd = std::env::current_dir().map_err(|e| Error::file_system(path, "resolve", e))?;
    Ok(cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn pairs_parse_and_reject_malformed_input() {
        let vars =
            parse_variable_pairs(&["a=1".to_string(), "b=x=y".to_string()]).expect("pairs");
        assert_eq!(vars["a"], Value::String("1".into()));
        assert_eq!(vars["b"], Value::String("x=y".into()));

        let err = parse_variable_pairs(&["broken".to_string()]).unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn loads_hcl_yaml_and_json_files() {
        let dir = tempfile::tempdir().expect("tempdir");

        let hcl_path = dir.path().join("vars.var.hcl");
        let mut f = std::fs::File::create(&hcl_path).expect("create");
        writeln!(f, "consul_domain = \"acme\"").expect("write");
        drop(f);
        // extension dispatch sees the final .hcl
        let vars = load_variable_file(&hcl_path).expect("hcl vars");
        assert_eq!(vars["consul_domain"], Value::String("acme".into()));

        let yaml_path = dir.path().join("vars.yaml");
        std::fs::write(&yaml_path, "region: eu-west-1\n").expect("write yaml");
        let vars = load_variable_file(&yaml_path).expect("yaml vars");
        assert_eq!(vars["region"], Value::String("eu-west-1".into()));

        let json_path = dir.path().join("vars.json");
        std::fs::write(&json_path, "{\"count\": 3}\n").expect("write json");
        let vars = load_variable_file(&json_path).expect("json vars");
        assert_eq!(vars["count"], Value::Number(3.into()));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("vars.toml");
        std::fs::write(&path, "a = 1\n").expect("write");

        let err = load_variable_file(&path).unwrap_err();
        assert!(err.to_string().contains("toml"));
    }
}
