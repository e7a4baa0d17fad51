//! Template renderer: macro-expands raw configuration text before it
//! reaches the stanza parser.
//!
//! Macros use `[[ func "arg" ... ]]` delimiters, which never collide with
//! the stanza grammar. A render executes one expansion pass; if the
//! delimiter pair survives in the output (functions may emit unexpanded
//! macro text), the output is re-rendered recursively. A depth counter is
//! the sole cycle-breaker.

mod funcs;
mod scratch;

use crate::document;
use crate::variables;
use hashictl_core::constants::DEFAULT_MAX_RENDER_DEPTH;
use hashictl_core::{Error, Result};
use scratch::Scratch;
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::path::PathBuf;
use tracing::debug;

const OPEN_DELIM: &str = "[[";
const CLOSE_DELIM: &str = "]]";

pub struct Renderer {
    variables: Map<String, Value>,
    consumed_files: Vec<PathBuf>,
    scratch: RefCell<Scratch>,
    max_depth: usize,
}

impl Renderer {
    /// Build a renderer from `key=value` pairs and variable files.
    ///
    /// Files load first; explicit pairs override file-provided values.
    pub fn new(pairs: &[String], files: &[PathBuf]) -> Result<Self> {
        let mut vars = Map::new();

        let mut consumed = Vec::with_capacity(files.len());
        for file in files {
            vars.extend(variables::load_variable_file(file)?);
            consumed.push(variables::absolute_path(file)?);
        }

        vars.extend(variables::parse_variable_pairs(pairs)?);

        Ok(Self {
            variables: vars,
            consumed_files: consumed,
            scratch: RefCell::new(Scratch::default()),
            max_depth: DEFAULT_MAX_RENDER_DEPTH,
        })
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Absolute paths of the variable files this renderer consumed; the
    /// scanner cross-checks these so variable files are never processed
    /// as configuration.
    pub fn consumed_variable_files(&self) -> &[PathBuf] {
        &self.consumed_files
    }

    /// Expand all macros in `content` and pretty-print the result into
    /// canonical stanza syntax.
    pub fn render(&self, content: &str, file: &str) -> Result<String> {
        self.scratch.borrow_mut().clear();
        let rendered = self.render_at(content, file, 0)?;
        document::canonical_format(&rendered, file)
    }

    fn render_at(&self, content: &str, file: &str, depth: usize) -> Result<String> {
        if depth > self.max_depth {
            return Err(Error::render_recursion(file, depth));
        }

        debug!(file = %file, depth, "rendering");

        let expanded = self.expand_once(content, file)?;

        // functions may emit macro text of their own; keep going until
        // the delimiters are gone
        if expanded.contains(OPEN_DELIM) && expanded.contains(CLOSE_DELIM) {
            return self.render_at(&expanded, file, depth + 1);
        }

        Ok(expanded)
    }

    /// One expansion pass. Replacement text is emitted verbatim and not
    /// rescanned within the same pass.
    fn expand_once(&self, content: &str, file: &str) -> Result<String> {
        let mut out = String::with_capacity(content.len());
        let mut rest = content;

        while let Some(start) = rest.find(OPEN_DELIM) {
            out.push_str(&rest[..start]);
            let after = &rest[start + OPEN_DELIM.len()..];

            let end = after.find(CLOSE_DELIM).ok_or_else(|| {
                Error::template(file, "unterminated macro, expected closing ']]'")
            })?;

            let call = parse_call(&after[..end], file)?;
            let value = funcs::call(self, &call.name, &call.args, file)?;
            out.push_str(&value);

            rest = &after[end + CLOSE_DELIM.len()..];
        }

        out.push_str(rest);
        Ok(out)
    }
}

struct MacroCall {
    name: String,
    args: Vec<String>,
}

/// Split the text between delimiters into a function name and quoted
/// string arguments. Bare tokens (numbers, identifiers) are accepted as
/// arguments too.
fn parse_call(inner: &str, file: &str) -> Result<MacroCall> {
    let mut tokens = Vec::new();
    let mut chars = inner.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if ch.is_whitespace() {
            continue;
        }

        if ch == '"' {
            let mut value = String::new();
            let mut closed = false;
            while let Some((_, c)) = chars.next() {
                match c {
                    '\\' => {
                        if let Some((_, esc)) = chars.next() {
                            match esc {
                                'n' => value.push('\n'),
                                't' => value.push('\t'),
                                other => value.push(other),
                            }
                        }
                    }
                    '"' => {
                        closed = true;
                        break;
                    }
                    other => value.push(other),
                }
            }
            if !closed {
                return Err(Error::template(
                    file,
                    format!("unterminated string in macro '{}'", inner.trim()),
                ));
            }
            tokens.push(value);
        } else {
            let mut end = inner.len();
            while let Some((next_idx, next_ch)) = chars.peek() {
                if next_ch.is_whitespace() || *next_ch == '"' {
                    end = *next_idx;
                    break;
                }
                chars.next();
            }
            if end == inner.len() {
                tokens.push(inner[idx..].to_string());
            } else {
                tokens.push(inner[idx..end].to_string());
            }
        }
    }

    let mut tokens = tokens.into_iter();
    let name = tokens
        .next()
        .ok_or_else(|| Error::template(file, "empty macro '[[ ]]'"))?;

    Ok(MacroCall {
        name,
        args: tokens.collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer_with(pairs: &[&str]) -> Renderer {
        let pairs: Vec<String> = pairs.iter().map(|s| s.to_string()).collect();
        Renderer::new(&pairs, &[]).expect("renderer")
    }

    #[test]
    fn plain_content_is_a_fixed_point() {
        let r = renderer_with(&[]);
        let content = "environment \"prod\" {\n  application \"api\" {\n  }\n}";

        let once = r.render(content, "test.hcl").expect("first render");
        let twice = r.render(&once, "test.hcl").expect("second render");
        assert_eq!(once, twice);
    }

    #[test]
    fn lookup_substitutes_variables() {
        let r = renderer_with(&["db_user=app"]);
        let out = r
            .render(
                "environment \"prod\" {\n  secret \"db\" {\n    username = \"[[ lookup \"db_user\" ]]\"\n  }\n}",
                "test.hcl",
            )
            .expect("render");
        assert!(out.contains("\"app\""), "output: {out}");
    }

    #[test]
    fn missing_lookup_variable_names_the_variable() {
        let r = renderer_with(&[]);
        let err = r
            .render(
                "environment \"prod\" {\n  kv \"domain\" {\n    value = \"[[ lookup \"consul_domain\" ]]\"\n  }\n}",
                "test.hcl",
            )
            .unwrap_err();
        assert!(err.to_string().contains("consul_domain"), "got: {err}");
    }

    #[test]
    fn lookup_default_falls_back() {
        let r = renderer_with(&[]);
        let out = r
            .render(
                "environment \"prod\" {\n  kv \"domain\" {\n    value = \"[[ lookup_default \"consul_domain\" \"consul\" ]]\"\n  }\n}",
                "test.hcl",
            )
            .expect("render");
        assert!(out.contains("\"consul\""), "output: {out}");
    }

    #[test]
    fn service_expands_recursively_through_the_domain_lookup() {
        let r = renderer_with(&["consul_domain=acme"]);
        let out = r
            .render(
                "environment \"prod\" {\n  kv \"db\" {\n    value = \"[[ service \"postgres\" ]]\"\n  }\n}",
                "test.hcl",
            )
            .expect("render");
        assert!(out.contains("postgres.service.acme"), "output: {out}");
    }

    #[test]
    fn recursion_guard_aborts_with_limit_message() {
        let r = renderer_with(&["loop=[[ lookup \"loop\" ]]"]).with_max_depth(2);
        let err = r.render("[[ lookup \"loop\" ]]", "test.hcl").unwrap_err();
        assert!(
            err.to_string().contains("recursive template rendering"),
            "got: {err}"
        );
    }

    #[test]
    fn grant_credentials_policy_expands_nested_macro() {
        let r = renderer_with(&[]);
        let out = r
            .render("[[ grant_credentials_policy \"db\" \"ro\" ]]", "test.hcl")
            .expect("render");
        assert!(out.contains("policy \"db-ro\""), "output: {out}");
        assert!(out.contains("db/creds/ro"), "output: {out}");
        assert!(out.contains("capabilities"), "output: {out}");
    }

    #[test]
    fn scratch_survives_within_one_render_only() {
        let r = renderer_with(&[]);
        let out = r
            .render(
                "environment \"prod\" {\n  kv \"a\" {\n    value = \"[[ scratch_set \"k\" \"v1\" ]][[ scratch_get \"k\" ]]\"\n  }\n}",
                "test.hcl",
            )
            .expect("render");
        assert!(out.contains("\"v1\""), "output: {out}");

        // a fresh render starts with an empty scratch
        let out = r
            .render(
                "environment \"prod\" {\n  kv \"a\" {\n    value = \"[[ scratch_get \"k\" ]]x\"\n  }\n}",
                "test.hcl",
            )
            .expect("render");
        assert!(out.contains("\"x\""), "output: {out}");
    }

    #[test]
    fn unterminated_macro_is_an_error() {
        let r = renderer_with(&[]);
        let err = r.render("value = \"[[ lookup \"x\" \"", "test.hcl").unwrap_err();
        assert!(err.to_string().contains("unterminated"), "got: {err}");
    }

    #[test]
    fn invalid_timestamp_format_is_an_error_not_a_panic() {
        let r = renderer_with(&[]);
        let err = r
            .render(
                "environment \"prod\" {\n  kv \"a\" {\n    value = \"[[ timestamp \"%Q\" ]]\"\n  }\n}",
                "test.hcl",
            )
            .unwrap_err();
        assert!(err.to_string().contains("invalid format"), "got: {err}");
    }

    #[test]
    fn replace_all_and_case_functions() {
        let r = renderer_with(&[]);
        let out = r
            .render(
                "environment \"prod\" {\n  kv \"a\" {\n    value = \"[[ replace_all \"-\" \"_\" \"a-b-c\" ]] [[ to_upper \"ok\" ]]\"\n  }\n}",
                "test.hcl",
            )
            .expect("render");
        assert!(out.contains("a_b_c"), "output: {out}");
        assert!(out.contains("OK"), "output: {out}");
    }

    #[test]
    fn github_team_policy_snippet_parses_as_configuration() {
        let r = renderer_with(&[]);
        let content = "environment \"prod\" {\n  [[ github_assign_team_policy \"ops\" \"ops-admin\" ]]\n}";
        let out = r.render(content, "test.hcl").expect("render");
        assert!(out.contains("/auth/github/map/teams/ops"), "output: {out}");
        assert!(out.contains("\"ops-admin\""), "output: {out}");
    }
}
