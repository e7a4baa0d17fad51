//! The remote store boundary.

use async_trait::async_trait;
use hashictl_core::Result;

/// The two operations the crawler and reader need from a hierarchical
/// secret store. Transport and authentication live entirely behind the
/// implementation.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// List the children of a collection path. A returned name with a
    /// trailing `/` denotes a sub-collection that must be listed
    /// further; any other name is a leaf.
    async fn list(&self, path: &str) -> Result<Vec<String>>;

    /// Read the opaque value blob at a leaf path
    async fn read(&self, path: &str) -> Result<serde_json::Value>;
}
