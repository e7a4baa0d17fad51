//! `secret` and `secrets` stanza handling

use super::Config;
use crate::document::{Literal, Stanza};
use crate::model::Secret;
use hashictl_core::{Error, Result};
use std::collections::BTreeMap;
use tracing::warn;

/// `secret "name" {}`: a single named leaf, body decoded key-for-key into
/// an opaque data map
pub(super) fn process_secret(
    config: &mut Config,
    stanza: &Stanza,
    environment: &str,
    application: Option<&str>,
) -> Result<()> {
    if stanza.keys.len() != 1 {
        return Err(Error::configuration(format!(
            "missing secret name in environment '{environment}'"
        )));
    }

    let name = &stanza.keys[0];
    let context = match application {
        Some(app) => format!(
            "environment \"{environment}\" -> application \"{app}\" -> secret \"{name}\""
        ),
        None => format!("environment \"{environment}\" -> secret \"{name}\""),
    };

    let data = stanza.to_data_map(&context)?;

    let secret = Secret {
        environment: environment.to_string(),
        application: application.map(String::from),
        path: name.clone(),
        key: name.clone(),
        data,
    };

    add_or_warn(config, secret);
    Ok(())
}

/// `secrets {}` (plural, unnamed): a flat string map where each pair
/// expands into its own Secret, data keyed `value`
pub(super) fn process_secrets(
    config: &mut Config,
    stanza: &Stanza,
    environment: &str,
    application: Option<&str>,
) -> Result<()> {
    if !stanza.keys.is_empty() {
        return Err(Error::configuration("secrets {} stanza must not be named"));
    }

    let context = match application {
        Some(app) => {
            format!("environment \"{environment}\" -> application \"{app}\" -> secrets")
        }
        None => format!("environment \"{environment}\" -> secrets"),
    };

    let pairs = stanza.to_string_map(&context)?;

    for (key, value) in pairs {
        let mut data = BTreeMap::new();
        data.insert("value".to_string(), Literal::String(value));

        let secret = Secret {
            environment: environment.to_string(),
            application: application.map(String::from),
            path: key.clone(),
            key,
            data,
        };

        add_or_warn(config, secret);
    }

    Ok(())
}

/// Duplicate identities beyond the first are dropped with a warning, not
/// merged
fn add_or_warn(config: &mut Config, secret: Secret) {
    let environment = secret.environment.clone();
    let application = secret.application.clone();
    let key = secret.key.clone();

    if !config.secrets.add(secret) {
        match application {
            Some(app) => warn!(
                environment = %environment,
                application = %app,
                key = %key,
                "ignored duplicate secret"
            ),
            None => warn!(
                environment = %environment,
                key = %key,
                "ignored duplicate secret"
            ),
        }
    }
}
