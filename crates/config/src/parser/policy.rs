//! `policy` stanza handling.
//!
//! The body is round-tripped: its canonical text form is stored in
//! [`Policy::raw`] and shipped verbatim to the remote policy engine. The
//! structured path rules are parsed alongside for validation only.

use super::Config;
use crate::document::Stanza;
use crate::model::{expand_policy_level, PathCapabilities, Policy};
use hashictl_core::{Error, Result};
use tracing::warn;

const VALID_KEYS: &[&str] = &["name", "path"];
const VALID_PATH_KEYS: &[&str] = &["capabilities", "policy"];

pub(super) fn process(
    config: &mut Config,
    stanza: &Stanza,
    environment: &str,
    application: Option<&str>,
) -> Result<()> {
    if stanza.keys.len() != 1 {
        return Err(Error::configuration(format!(
            "missing policy name in environment '{environment}'"
        )));
    }

    let name = &stanza.keys[0];
    let context = format!("environment \"{environment}\" -> policy \"{name}\"");

    stanza.validate_keys(VALID_KEYS, &context)?;

    let mut raw = stanza.body_to_text();
    raw = raw.replace("__ENV__", environment);
    if let Some(app) = application {
        raw = raw.replace("__APP__", app);
    }

    let mut paths = Vec::new();
    for path_block in stanza.blocks_named("path") {
        paths.push(parse_path_rule(path_block, &context)?);
    }

    let policy = Policy {
        environment: environment.to_string(),
        application: application.map(String::from),
        name: name.clone(),
        raw,
        paths,
    };

    if !config.policies.add(policy) {
        match application {
            Some(app) => warn!(
                environment = %environment,
                application = %app,
                policy = %name,
                "ignored duplicate policy"
            ),
            None => warn!(
                environment = %environment,
                policy = %name,
                "ignored duplicate policy"
            ),
        }
    }

    Ok(())
}

fn parse_path_rule(block: &Stanza, context: &str) -> Result<PathCapabilities> {
    let pattern = block
        .keys
        .first()
        .ok_or_else(|| Error::configuration(format!("missing path pattern in {context}")))?;

    let path_context = format!("{context} -> path \"{pattern}\"");
    block.validate_keys(VALID_PATH_KEYS, &path_context)?;

    let capabilities = match block.attr_string_list("capabilities", &path_context)? {
        Some(caps) => caps,
        // old-style single-word levels expand into capability sets
        None => match block.attr_str("policy", &path_context)? {
            Some(level) => expand_policy_level(&level).ok_or_else(|| {
                Error::configuration(format!(
                    "unknown policy level '{level}' in {path_context}"
                ))
            })?,
            None => Vec::new(),
        },
    };

    Ok(PathCapabilities {
        path: pattern.clone(),
        capabilities,
    })
}
