//! `service` stanza handling

use super::Config;
use crate::document::Stanza;
use crate::model::{ConsulCheck, ConsulService};
use hashictl_core::{Error, Result};
use std::collections::BTreeMap;

const VALID_KEYS: &[&str] = &["address", "node", "port", "tags", "id", "meta"];

pub(super) fn process(config: &mut Config, stanza: &Stanza, environment: &str) -> Result<()> {
    if stanza.keys.len() != 1 {
        return Err(Error::configuration(format!(
            "missing service name in environment '{environment}'"
        )));
    }

    let name = &stanza.keys[0];
    let context = format!("environment \"{environment}\" -> service \"{name}\"");

    stanza.validate_keys(VALID_KEYS, &context)?;

    let address = require_str(stanza, "address", &context)?;
    let node = require_str(stanza, "node", &context)?;
    let port = require_port(stanza, &context)?;

    let tags = stanza
        .attr_string_list("tags", &context)?
        .unwrap_or_default();
    let id = stanza
        .attr_str("id", &context)?
        .unwrap_or_else(|| name.clone());

    let mut meta = BTreeMap::new();
    for block in stanza.blocks_named("meta") {
        meta.extend(block.to_string_map(&format!("{context} -> meta"))?);
    }

    let check = ConsulCheck {
        check_id: format!("service:{name}"),
        name: name.clone(),
        node: node.clone(),
        notes: "created by hashictl".to_string(),
        service_name: name.clone(),
        service_id: id.clone(),
        status: "passing".to_string(),
    };

    let service = ConsulService {
        environment: environment.to_string(),
        name: name.clone(),
        id,
        node,
        address,
        port,
        tags,
        meta,
        check,
    };

    config.services.add(service);
    Ok(())
}

fn require_str(stanza: &Stanza, key: &str, context: &str) -> Result<String> {
    stanza
        .attr_str(key, context)?
        .ok_or_else(|| Error::configuration(format!("missing {key} in {context}")))
}

fn require_port(stanza: &Stanza, context: &str) -> Result<u16> {
    let port = stanza
        .attr_int("port", context)?
        .ok_or_else(|| Error::configuration(format!("missing port in {context}")))?;

    u16::try_from(port).map_err(|_| {
        Error::configuration(format!("port {port} out of range in {context}"))
    })
}
