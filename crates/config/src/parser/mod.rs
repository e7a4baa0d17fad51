//! Stanza parser: walks the fixed grammar and merges typed records into
//! the [`Config`] accumulator.
//!
//! Grammar: file root holds `environment` stanzas; an environment holds
//! {application, auth, policy, mount, secret, secrets, service, kv}; an
//! application holds {secret, secrets, policy, kv}. Structural violations
//! are aggregated per file and never abort sibling stanzas.

mod application;
mod auth;
mod environment;
mod kv;
mod mount;
mod policy;
mod secret;
mod service;


use crate::context::CompileContext;
use crate::document::{Document, Stanza};
use crate::model::{
    Applications, AuthBackends, ConsulKvs, ConsulServices, Environments, Mounts, NamedData,
    Policies, SecretList,
};
use hashictl_core::{Error, Result};
use serde::Serialize;

/// The merge model: every record compiled during a pass, deduplicated by
/// identity. Mutation happens on one logical thread only, so the
/// collections need no locking.
#[derive(Debug, Default, Serialize)]
pub struct Config {
    pub environments: Environments,
    pub applications: Applications,
    pub secrets: SecretList,
    pub policies: Policies,
    pub mounts: Mounts,
    pub auths: AuthBackends,
    pub services: ConsulServices,
    pub consul_kvs: ConsulKvs,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse raw configuration text and merge the records it defines.
    ///
    /// `file` annotates errors only; rendering has already happened by the
    /// time content reaches the parser.
    pub fn process_content(
        &mut self,
        content: &str,
        file: &str,
        ctx: &CompileContext,
    ) -> Result<()> {
        let doc = Document::parse(content, file)?;
        self.process_document(&doc, ctx)
    }

    /// Merge a parsed stanza tree. Errors from independent stanzas are
    /// collected and reported together.
    pub fn process_document(&mut self, doc: &Document, ctx: &CompileContext) -> Result<()> {
        let mut errors = Vec::new();

        for stanza in &doc.stanzas {
            if stanza.name != "environment" {
                errors.push(Error::unexpected_key(&stanza.name, "file root"));
                continue;
            }

            if let Err(err) = environment::process(self, stanza, ctx) {
                errors.push(err);
            }
        }

        Error::aggregate_result(errors)
    }
}

/// Decode a run of named free-form blocks (`config {}` / `role {}`
/// bodies under a mount or auth stanza)
fn parse_named_data<'a>(
    blocks: impl Iterator<Item = &'a Stanza>,
    kind: &str,
    context: &str,
) -> Result<Vec<NamedData>> {
    let mut out = Vec::new();

    for block in blocks {
        let name = block
            .keys
            .first()
            .ok_or_else(|| Error::configuration(format!("missing {kind} name in {context}")))?;
        let data = block.to_data_map(&format!("{context} -> {kind} \"{name}\""))?;
        out.push(NamedData {
            name: name.clone(),
            data,
        });
    }

    Ok(out)
}
