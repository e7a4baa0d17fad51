//! Consul service and KV records

use serde::Serialize;
use std::collections::BTreeMap;

/// Health check derived for every registered service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsulCheck {
    pub check_id: String,
    pub name: String,
    pub node: String,
    pub notes: String,
    pub service_name: String,
    pub service_id: String,
    pub status: String,
}

/// A service registration. The check record is derived from the service,
/// never written by the author.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsulService {
    pub environment: String,
    pub name: String,
    pub id: String,
    pub node: String,
    pub address: String,
    pub port: u16,
    pub tags: Vec<String>,
    pub meta: BTreeMap<String, String>,
    pub check: ConsulCheck,
}

impl ConsulService {
    pub fn same_identity(&self, other: &ConsulService) -> bool {
        self.environment == other.environment && self.id == other.id && self.node == other.node
    }
}

#[derive(Debug, Default, Serialize)]
pub struct ConsulServices(Vec<ConsulService>);

impl ConsulServices {
    pub fn add(&mut self, service: ConsulService) -> bool {
        if self.0.iter().any(|s| s.same_identity(&service)) {
            return false;
        }

        self.0.push(service);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConsulService> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A KV entry; raw bytes, never interpreted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsulKv {
    pub environment: String,
    pub application: Option<String>,
    pub key: String,
    pub value: Vec<u8>,
}

impl ConsulKv {
    pub fn same_identity(&self, other: &ConsulKv) -> bool {
        self.environment == other.environment
            && self.application == other.application
            && self.key == other.key
    }
}

#[derive(Debug, Default, Serialize)]
pub struct ConsulKvs(Vec<ConsulKv>);

impl ConsulKvs {
    pub fn add(&mut self, kv: ConsulKv) -> bool {
        if self.0.iter().any(|k| k.same_identity(&kv)) {
            return false;
        }

        self.0.push(kv);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConsulKv> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
