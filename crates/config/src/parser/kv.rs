//! `kv` stanza handling

use super::Config;
use crate::document::Stanza;
use crate::model::ConsulKv;
use hashictl_core::{Error, Result};

const VALID_KEYS: &[&str] = &["value"];

pub(super) fn process(
    config: &mut Config,
    stanza: &Stanza,
    environment: &str,
    application: Option<&str>,
) -> Result<()> {
    if stanza.keys.len() != 1 {
        return Err(Error::configuration(format!(
            "missing kv path in environment '{environment}'"
        )));
    }

    let key = &stanza.keys[0];
    let context = format!("environment \"{environment}\" -> kv \"{key}\"");

    stanza.validate_keys(VALID_KEYS, &context)?;

    let value = stanza
        .attr_str("value", &context)?
        .ok_or_else(|| Error::configuration(format!("missing value in {context}")))?;

    let kv = ConsulKv {
        environment: environment.to_string(),
        application: application.map(String::from),
        key: key.clone(),
        value: value.into_bytes(),
    };

    config.consul_kvs.add(kv);
    Ok(())
}
