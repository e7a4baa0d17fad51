//! Thin Vault KV HTTP client implementing [`SecretStore`].
//!
//! Only the two operations the crawler and reader need; address and
//! token come from the standard `VAULT_ADDR` / `VAULT_TOKEN` variables.

use async_trait::async_trait;
use hashictl_core::{Error, Result};
use hashictl_remote::SecretStore;
use serde_json::Value;

pub struct VaultKvStore {
    client: reqwest::Client,
    address: String,
    token: String,
}

impl VaultKvStore {
    pub fn from_env() -> Result<Self> {
        let address = std::env::var("VAULT_ADDR")
            .map_err(|_| Error::configuration("VAULT_ADDR is not set"))?;
        let token = std::env::var("VAULT_TOKEN")
            .map_err(|_| Error::configuration("VAULT_TOKEN is not set"))?;

        Ok(Self {
            client: reqwest::Client::new(),
            address: address.trim_end_matches('/').to_string(),
            token,
        })
    }

    async fn get(&self, path: &str, list: bool) -> Result<Value> {
        let operation = if list { "list" } else { "read" };

        let mut url = format!("{}/v1/{}", self.address, path);
        if list {
            url.push_str("?list=true");
        }

        let response = self
            .client
            .get(&url)
            .header("X-Vault-Token", &self.token)
            .send()
            .await
            .map_err(|e| Error::remote(operation, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::remote(
                operation,
                format!("'{path}' returned {status}"),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| Error::remote(operation, format!("invalid response body: {e}")))
    }
}

#[async_trait]
impl SecretStore for VaultKvStore {
    async fn list(&self, path: &str) -> Result<Vec<String>> {
        let body = self.get(path, true).await?;

        let keys = body
            .get("data")
            .and_then(|d| d.get("keys"))
            .and_then(Value::as_array)
            .ok_or_else(|| Error::remote("list", format!("no keys in response for '{path}'")))?;

        Ok(keys
            .iter()
            .filter_map(|k| k.as_str().map(String::from))
            .collect())
    }

    async fn read(&self, path: &str) -> Result<Value> {
        let body = self.get(path, false).await?;

        body.get("data")
            .cloned()
            .ok_or_else(|| Error::remote("read", format!("no data in response for '{path}'")))
    }
}
