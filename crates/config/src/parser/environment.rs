//! `environment` stanza handling: target filtering, wildcard rewrite,
//! and dispatch to the child stanza parsers.

use super::{application, auth, kv, mount, policy, secret, service, Config};
use crate::context::CompileContext;
use crate::document::Stanza;
use hashictl_core::{Error, Result};
use tracing::debug;

const VALID_KEYS: &[&str] = &[
    "application",
    "auth",
    "policy",
    "mount",
    "secret",
    "secrets",
    "service",
    "kv",
];

/// Process one `environment` stanza.
///
/// The stanza may carry several positional names; the body applies to
/// each independently. A name that matches neither the target nor `*` is
/// skipped wholesale, its subtree never parsed.
pub(super) fn process(config: &mut Config, stanza: &Stanza, ctx: &CompileContext) -> Result<()> {
    if stanza.keys.is_empty() {
        return Err(Error::configuration(
            "missing environment name in 'environment' stanza",
        ));
    }

    let mut errors = Vec::new();

    for raw_name in &stanza.keys {
        if should_skip_environment(raw_name, &ctx.environment) {
            debug!(environment = %raw_name, target = %ctx.environment, "skipping environment");
            continue;
        }

        // wildcard stanzas apply to the concrete target; `*` never
        // survives into the model
        let name = if raw_name == "*" {
            ctx.environment.clone()
        } else {
            raw_name.clone()
        };

        let context = format!("environment \"{name}\"");
        if let Err(err) = stanza.validate_keys(VALID_KEYS, &context) {
            errors.push(err);
        }

        config.environments.get_or_set(&name);

        for child in stanza.blocks_named("application") {
            if let Err(err) = application::process(config, child, &name, ctx) {
                errors.push(err);
            }
        }
        for child in stanza.blocks_named("auth") {
            if let Err(err) = auth::process(config, child, &name) {
                errors.push(err);
            }
        }
        for child in stanza.blocks_named("secret") {
            if let Err(err) = secret::process_secret(config, child, &name, None) {
                errors.push(err);
            }
        }
        for child in stanza.blocks_named("secrets") {
            if let Err(err) = secret::process_secrets(config, child, &name, None) {
                errors.push(err);
            }
        }
        for child in stanza.blocks_named("policy") {
            if let Err(err) = policy::process(config, child, &name, None) {
                errors.push(err);
            }
        }
        for child in stanza.blocks_named("mount") {
            if let Err(err) = mount::process(config, child, &name) {
                errors.push(err);
            }
        }
        for child in stanza.blocks_named("service") {
            if let Err(err) = service::process(config, child, &name) {
                errors.push(err);
            }
        }
        for child in stanza.blocks_named("kv") {
            if let Err(err) = kv::process(config, child, &name, None) {
                errors.push(err);
            }
        }
    }

    Error::aggregate_result(errors)
}

/// A `*` stanza applies to any target; a named stanza only to its own
/// target. An empty target skips everything.
fn should_skip_environment(parsed: &str, target: &str) -> bool {
    if parsed == "*" {
        return false;
    }

    if target.is_empty() {
        return true;
    }

    target != parsed
}

#[cfg(test)]
mod tests {
    use super::should_skip_environment;

    #[test]
    fn wildcard_is_never_skipped() {
        assert!(!should_skip_environment("*", "prod"));
        assert!(!should_skip_environment("*", "stag"));
    }

    #[test]
    fn mismatched_name_is_skipped() {
        assert!(should_skip_environment("stag", "prod"));
        assert!(!should_skip_environment("prod", "prod"));
    }

    #[test]
    fn empty_target_skips_named_environments() {
        assert!(should_skip_environment("prod", ""));
    }
}
