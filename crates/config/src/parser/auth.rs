//! `auth` stanza handling; the same immutability rule as mounts applies

use super::{parse_named_data, Config};
use crate::document::Stanza;
use crate::model::AuthBackend;
use hashictl_core::{Error, Result};

const VALID_KEYS: &[&str] = &[
    "config",
    "role",
    "path",
    "description",
    "default_lease_ttl",
    "max_lease_ttl",
];

pub(super) fn process(config: &mut Config, stanza: &Stanza, environment: &str) -> Result<()> {
    let name = stanza.keys.first().ok_or_else(|| {
        Error::configuration(format!("missing auth name in environment '{environment}'"))
    })?;

    let context = format!("environment \"{environment}\" -> auth \"{name}\"");
    stanza.validate_keys(VALID_KEYS, &context)?;

    if stanza.keys.len() > 2 {
        return Err(Error::configuration(format!(
            "auth \"{name}\" takes a name and a backend type, got {} names",
            stanza.keys.len()
        )));
    }

    let existing_backend = config.auths.find(name).map(|a| a.backend.clone());

    if let Some(backend) = existing_backend {
        if stanza.blocks_named("config").next().is_some() {
            return Err(Error::immutable_backend(
                "auth backend",
                name,
                "cannot modify an existing auth backend's config",
            ));
        }

        if let Some(redefined) = stanza.keys.get(1) {
            if *redefined != backend {
                return Err(Error::immutable_backend(
                    "auth backend",
                    name,
                    format!("cannot change backend type from '{backend}' to '{redefined}'"),
                ));
            }
        }

        let roles = parse_named_data(stanza.blocks_named("role"), "role", &context)?;
        if let Some(auth) = config.auths.find_mut(name) {
            auth.roles.extend(roles);
        }

        return Ok(());
    }

    let backend = stanza.keys.get(1).ok_or_else(|| {
        Error::configuration(format!(
            "auth \"{name}\" needs a name and a backend type, e.g. auth \"{name}\" \"github\""
        ))
    })?;

    let auth = AuthBackend {
        environment: environment.to_string(),
        name: name.clone(),
        backend: backend.clone(),
        path: stanza.attr_str("path", &context)?,
        description: stanza.attr_str("description", &context)?,
        default_lease_ttl: stanza.attr_str("default_lease_ttl", &context)?,
        max_lease_ttl: stanza.attr_str("max_lease_ttl", &context)?,
        config: parse_named_data(stanza.blocks_named("config"), "config", &context)?,
        roles: parse_named_data(stanza.blocks_named("role"), "role", &context)?,
    };

    config.auths.add(auth);
    Ok(())
}
