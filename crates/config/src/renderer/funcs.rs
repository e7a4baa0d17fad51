//! The template function table.
//!
//! Every function takes string arguments and produces a string
//! substitution; the renderer re-scans output for macro text, so
//! functions are free to emit further macros (`service` does, to pick up
//! the consul domain).

use super::Renderer;
use base64::Engine;
use hashictl_core::constants::PLUGIN_TIMEOUT_SECS;
use hashictl_core::{Error, Result};
use serde_json::Value;
use std::fmt::Write as _;
use std::io::Read;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

pub(super) fn call(r: &Renderer, name: &str, args: &[String], file: &str) -> Result<String> {
    match name {
        "lookup" => {
            let key = arg(args, 0, name, file)?;
            lookup(r, key).ok_or_else(|| Error::missing_variable(key))
        }
        "lookup_default" => {
            let key = arg(args, 0, name, file)?;
            let def = arg(args, 1, name, file)?;
            Ok(lookup(r, key).unwrap_or_else(|| def.to_string()))
        }
        "lookup_map" => {
            let key = arg(args, 0, name, file)?;
            let sub = arg(args, 1, name, file)?;
            lookup_map(r, key, sub)
                .ok_or_else(|| Error::missing_variable(format!("{key}.{sub}")))
        }
        "lookup_map_default" => {
            let key = arg(args, 0, name, file)?;
            let sub = arg(args, 1, name, file)?;
            let def = arg(args, 2, name, file)?;
            Ok(lookup_map(r, key, sub).unwrap_or_else(|| def.to_string()))
        }

        "service" => {
            let service = arg(args, 0, name, file)?;
            Ok(format!(
                "{service}.service.[[ lookup_default \"consul_domain\" \"consul\" ]]"
            ))
        }
        "service_with_tag" => {
            let service = arg(args, 0, name, file)?;
            let tag = arg(args, 1, name, file)?;
            Ok(format!(
                "{tag}.{service}.service.[[ lookup_default \"consul_domain\" \"consul\" ]]"
            ))
        }

        "grant_credentials" => {
            let db = arg(args, 0, name, file)?;
            let role = arg(args, 1, name, file)?;
            Ok(format!(
                "\npath \"{db}/creds/{role}\" {{\n  capabilities = [\"read\"]\n}}"
            ))
        }
        "grant_credentials_policy" => {
            let db = arg(args, 0, name, file)?;
            let role = arg(args, 1, name, file)?;
            Ok(format!(
                "\npolicy \"{db}-{role}\" {{\n  [[ grant_credentials \"{db}\" \"{role}\" ]]\n}}"
            ))
        }
        "github_assign_team_policy" => {
            let team = arg(args, 0, name, file)?;
            let policy = arg(args, 1, name, file)?;
            Ok(format!(
                "\nsecret \"/auth/github/map/teams/{team}\" {{\n  value = \"{policy}\"\n}}"
            ))
        }
        "ldap_assign_group_policy" => {
            let group = arg(args, 0, name, file)?;
            let policy = arg(args, 1, name, file)?;
            Ok(format!(
                "\nsecret \"/auth/ldap/groups/{group}\" {{\n  value = \"{policy}\"\n}}"
            ))
        }

        "scratch_set" => {
            let key = arg(args, 0, name, file)?;
            let value = arg(args, 1, name, file)?;
            r.scratch.borrow_mut().set(key, value);
            Ok(String::new())
        }
        "scratch_get" => {
            let key = arg(args, 0, name, file)?;
            Ok(r.scratch.borrow().get(key).unwrap_or("").to_string())
        }

        "base64_encode" => {
            let s = arg(args, 0, name, file)?;
            Ok(base64::engine::general_purpose::STANDARD.encode(s))
        }
        "base64_decode" => {
            let s = arg(args, 0, name, file)?;
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(s)
                .map_err(|e| Error::template(file, format!("base64_decode: {e}")))?;
            String::from_utf8(bytes)
                .map_err(|e| Error::template(file, format!("base64_decode: {e}")))
        }

        "replace_all" => {
            let from = arg(args, 0, name, file)?;
            let to = arg(args, 1, name, file)?;
            let s = arg(args, 2, name, file)?;
            Ok(s.replace(from, to))
        }
        "split" => {
            let sep = arg(args, 0, name, file)?;
            let s = arg(args, 1, name, file)?;
            let items: Vec<Value> = s.split(sep).map(|p| Value::String(p.to_string())).collect();
            serde_json::to_string(&items)
                .map_err(|e| Error::json("split: failed to encode list", e))
        }
        "join" => {
            let sep = arg(args, 0, name, file)?;
            let s = arg(args, 1, name, file)?;
            let items: Vec<String> = serde_json::from_str(s).map_err(|e| {
                Error::template(file, format!("join: expected a list literal: {e}"))
            })?;
            Ok(items.join(sep))
        }
        "trim_space" => Ok(arg(args, 0, name, file)?.trim().to_string()),
        "to_lower" => Ok(arg(args, 0, name, file)?.to_lowercase()),
        "to_upper" => Ok(arg(args, 0, name, file)?.to_uppercase()),
        "to_title" => Ok(to_title(arg(args, 0, name, file)?)),

        "regex_match" => {
            let pattern = arg(args, 0, name, file)?;
            let s = arg(args, 1, name, file)?;
            let re = regex::Regex::new(pattern)
                .map_err(|e| Error::template(file, format!("regex_match: {e}")))?;
            Ok(re.is_match(s).to_string())
        }
        "regex_replace_all" => {
            let pattern = arg(args, 0, name, file)?;
            let replacement = arg(args, 1, name, file)?;
            let s = arg(args, 2, name, file)?;
            let re = regex::Regex::new(pattern)
                .map_err(|e| Error::template(file, format!("regex_replace_all: {e}")))?;
            Ok(re.replace_all(s, replacement).into_owned())
        }

        "env" => Ok(std::env::var(arg(args, 0, name, file)?).unwrap_or_default()),

        "to_json" => {
            let key = arg(args, 0, name, file)?;
            let value = r
                .variables
                .get(key)
                .ok_or_else(|| Error::missing_variable(key))?;
            serde_json::to_string(value).map_err(|e| Error::json("to_json failed", e))
        }
        "to_yaml" => {
            let key = arg(args, 0, name, file)?;
            let value = r
                .variables
                .get(key)
                .ok_or_else(|| Error::missing_variable(key))?;
            serde_yaml::to_string(value)
                .map_err(|e| Error::template(file, format!("to_yaml: {e}")))
        }

        "timestamp" => match args.first() {
            Some(format) => {
                // an invalid specifier surfaces as a fmt error only while
                // writing, so render into a buffer instead of to_string
                let mut out = String::new();
                write!(out, "{}", chrono::Utc::now().format(format)).map_err(|_| {
                    Error::template(file, format!("timestamp: invalid format '{format}'"))
                })?;
                Ok(out)
            }
            None => Ok(chrono::Utc::now().to_rfc3339()),
        },

        "plugin" => {
            let cmd = arg(args, 0, name, file)?;
            run_plugin(cmd, &args[1..], file)
        }

        unknown => Err(Error::template(
            file,
            format!("unknown template function '{unknown}'"),
        )),
    }
}

fn arg<'a>(args: &'a [String], idx: usize, name: &str, file: &str) -> Result<&'a str> {
    args.get(idx).map(String::as_str).ok_or_else(|| {
        Error::template(file, format!("{name}: missing argument {}", idx + 1))
    })
}

fn lookup(r: &Renderer, key: &str) -> Option<String> {
    r.variables.get(key).map(value_to_string)
}

fn lookup_map(r: &Renderer, key: &str, sub: &str) -> Option<String> {
    r.variables
        .get(key)
        .and_then(Value::as_object)
        .and_then(|map| map.get(sub))
        .map(value_to_string)
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn to_title(s: &str) -> String {
    s.split_inclusive(char::is_whitespace)
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Spawn an external plugin and capture its trimmed stdout as the
/// substitution value. The process gets a hard 30 second limit; a slow
/// plugin is killed, not waited out.
fn run_plugin(cmd: &str, args: &[String], file: &str) -> Result<String> {
    let trimmed: Vec<&str> = args
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .collect();

    let mut child = Command::new(cmd)
        .args(&trimmed)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::template(file, format!("plugin '{cmd}': {e}")))?;

    let deadline = Instant::now() + Duration::from_secs(PLUGIN_TIMEOUT_SECS);
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                let mut stdout = String::new();
                if let Some(mut out) = child.stdout.take() {
                    out.read_to_string(&mut stdout).map_err(|e| {
                        Error::template(file, format!("plugin '{cmd}': {e}"))
                    })?;
                }

                if !status.success() {
                    let mut stderr = String::new();
                    if let Some(mut err) = child.stderr.take() {
                        let _ = err.read_to_string(&mut stderr);
                    }
                    return Err(Error::template(
                        file,
                        format!("plugin '{cmd}' exited with {status}: {}", stderr.trim()),
                    ));
                }

                return Ok(stdout.trim().to_string());
            }
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(Error::timeout(
                        format!("plugin '{cmd}'"),
                        Duration::from_secs(PLUGIN_TIMEOUT_SECS),
                    ));
                }
                std::thread::sleep(Duration::from_millis(25));
            }
            Err(e) => {
                return Err(Error::template(file, format!("plugin '{cmd}': {e}")));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_cases_each_word() {
        assert_eq!(to_title("hello big world"), "Hello Big World");
        assert_eq!(to_title(""), "");
    }

    #[test]
    fn plugin_captures_stdout() {
        let out = run_plugin("echo", &["hello".to_string()], "test.hcl").expect("plugin");
        assert_eq!(out, "hello");
    }

    #[test]
    fn plugin_failure_is_reported() {
        let err = run_plugin("false", &[], "test.hcl").unwrap_err();
        assert!(err.to_string().contains("exited"), "got: {err}");
    }
}
