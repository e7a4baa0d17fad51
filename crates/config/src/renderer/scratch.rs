//! Per-render scratch store.
//!
//! Template functions can stash values here within one render pass; the
//! store is cleared before every top-level render, so nothing leaks
//! between files.

use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub(super) struct Scratch {
    values: BTreeMap<String, String>,
}

impl Scratch {
    pub(super) fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    pub(super) fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub(super) fn clear(&mut self) {
        self.values.clear();
    }
}
