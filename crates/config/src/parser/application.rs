//! `application` stanza handling

use super::{kv, policy, secret, Config};
use crate::context::CompileContext;
use crate::document::Stanza;
use hashictl_core::{Error, Result};
use tracing::debug;

const VALID_KEYS: &[&str] = &["secret", "secrets", "policy", "kv"];

pub(super) fn process(
    config: &mut Config,
    stanza: &Stanza,
    environment: &str,
    ctx: &CompileContext,
) -> Result<()> {
    if stanza.keys.len() != 1 {
        return Err(Error::configuration(format!(
            "missing application name in environment '{environment}'"
        )));
    }

    let name = &stanza.keys[0];

    if let Some(target) = &ctx.application {
        if name != target {
            debug!(application = %name, target = %target, "skipping application");
            return Ok(());
        }
    }

    let context = format!("environment \"{environment}\" -> application \"{name}\"");

    let mut errors = Vec::new();
    if let Err(err) = stanza.validate_keys(VALID_KEYS, &context) {
        errors.push(err);
    }

    config.applications.get_or_set(environment, name);
    config.environments.get_or_set(environment).add_application(name);

    for child in stanza.blocks_named("secret") {
        if let Err(err) = secret::process_secret(config, child, environment, Some(name)) {
            errors.push(err);
        }
    }
    for child in stanza.blocks_named("secrets") {
        if let Err(err) = secret::process_secrets(config, child, environment, Some(name)) {
            errors.push(err);
        }
    }
    for child in stanza.blocks_named("policy") {
        if let Err(err) = policy::process(config, child, environment, Some(name)) {
            errors.push(err);
        }
    }
    for child in stanza.blocks_named("kv") {
        if let Err(err) = kv::process(config, child, environment, Some(name)) {
            errors.push(err);
        }
    }

    Error::aggregate_result(errors)
}
