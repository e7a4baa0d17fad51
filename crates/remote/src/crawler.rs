//! Remote state crawler: bounded fan-out/fan-in tree walk over the
//! secret hierarchy.
//!
//! Workers pull collection paths from a shared job queue, list them, and
//! route each child: sub-collections go back onto the job queue, leaves
//! go to a single aggregator that materializes typed records. Two
//! wait-groups (jobs, results) gate completion, each under its own
//! timeout; a failed list call aborts the whole crawl.

use crate::client::SecretStore;
use crate::options::RemoteOptions;
use crate::waitgroup::WaitGroup;
use hashictl_core::constants::{SECRET_MOUNT, UNKNOWN_ENVIRONMENT};
use hashictl_core::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

static PATH_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^secret/(?P<environment>.*?)/(?P<application>.*?)/(?P<path>.+)$")
        .expect("path pattern is valid")
});

/// A leaf discovered in the remote hierarchy. `value` stays empty until
/// the reader pool populates it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteSecret {
    pub path: String,
    pub environment: String,
    pub application: String,
    pub value: Option<serde_json::Value>,
}

impl RemoteSecret {
    /// Materialize a leaf path into a typed record via the fixed
    /// `secret/<environment>/<application>/<path>` pattern. Unparseable
    /// paths land under the sentinel environment with a warning, never
    /// dropped.
    pub fn from_path(path: &str) -> Self {
        match PATH_PATTERN.captures(path) {
            Some(caps) => Self {
                path: path.to_string(),
                environment: caps["environment"].to_string(),
                application: caps["application"].to_string(),
                value: None,
            },
            None => {
                warn!(path = %path, "could not extract environment from path");
                Self {
                    path: path.to_string(),
                    environment: UNKNOWN_ENVIRONMENT.to_string(),
                    application: String::new(),
                    value: None,
                }
            }
        }
    }
}

/// Crawl the remote hierarchy from its root and return every discovered
/// leaf, ordered by (environment, application, path).
pub async fn crawl(store: Arc<dyn SecretStore>, opts: &RemoteOptions) -> Result<Vec<RemoteSecret>> {
    let job_wg = Arc::new(WaitGroup::new());
    let result_wg = Arc::new(WaitGroup::new());

    let (job_tx, job_rx) = mpsc::unbounded_channel::<String>();
    let job_rx = Arc::new(Mutex::new(job_rx));
    let (result_tx, result_rx) = mpsc::unbounded_channel::<String>();
    let (error_tx, mut error_rx) = mpsc::unbounded_channel::<Error>();
    let (done_tx, done_rx) = watch::channel(false);

    // seed the root; the counter increments strictly before the item is
    // observable on the queue
    job_wg.add(1);
    job_tx
        .send("/".to_string())
        .map_err(|_| Error::remote("crawl", "job queue closed before start"))?;

    for worker_id in 0..opts.concurrency {
        tokio::spawn(index_worker(
            store.clone(),
            job_rx.clone(),
            job_tx.clone(),
            result_tx.clone(),
            error_tx.clone(),
            job_wg.clone(),
            result_wg.clone(),
            done_rx.clone(),
            worker_id,
        ));
    }

    let aggregator = tokio::spawn(aggregate_results(
        result_rx,
        result_wg.clone(),
        done_rx.clone(),
    ));

    // wait for the indexers, aborting early on the first failed list;
    // a failing worker reports before it releases its wait-group slot,
    // so the biased order sees the error even when both are ready
    tokio::select! {
        biased;
        failed = error_rx.recv() => {
            let _ = done_tx.send(true);
            return Err(failed.unwrap_or_else(|| {
                Error::remote("crawl", "worker error channel closed unexpectedly")
            }));
        }
        completed = job_wg.wait_timeout(opts.list_timeout) => {
            if !completed {
                let _ = done_tx.send(true);
                return Err(Error::timeout("remote secret indexing", opts.list_timeout));
            }
        }
    }

    if let Ok(failed) = error_rx.try_recv() {
        let _ = done_tx.send(true);
        return Err(failed);
    }

    if !result_wg.wait_timeout(opts.result_timeout).await {
        let _ = done_tx.send(true);
        return Err(Error::timeout(
            "remote secret result processing",
            opts.result_timeout,
        ));
    }

    let _ = done_tx.send(true);

    let mut secrets = aggregator
        .await
        .map_err(|e| Error::remote("crawl", format!("aggregator task failed: {e}")))?;

    secrets.sort_by(|a, b| {
        (&a.environment, &a.application, &a.path).cmp(&(&b.environment, &b.application, &b.path))
    });

    Ok(secrets)
}

#[allow(clippy::too_many_arguments)]
async fn index_worker(
    store: Arc<dyn SecretStore>,
    job_rx: Arc<Mutex<UnboundedReceiver<String>>>,
    job_tx: UnboundedSender<String>,
    result_tx: UnboundedSender<String>,
    error_tx: UnboundedSender<Error>,
    job_wg: Arc<WaitGroup>,
    result_wg: Arc<WaitGroup>,
    mut done: watch::Receiver<bool>,
    worker_id: usize,
) {
    debug!(worker = worker_id, "starting indexer");

    loop {
        // hold the queue lock only while receiving; the done signal is
        // checked between units of work, never mid-call
        let job = {
            let mut rx = job_rx.lock().await;
            tokio::select! {
                _ = done.changed() => {
                    debug!(worker = worker_id, "stopping indexer");
                    return;
                }
                job = rx.recv() => match job {
                    Some(job) => job,
                    None => return,
                },
            }
        };

        let trimmed = job.trim_matches('/');
        let logical_path = if trimmed.is_empty() {
            SECRET_MOUNT.to_string()
        } else {
            format!("{SECRET_MOUNT}/{trimmed}")
        };

        debug!(worker = worker_id, path = %logical_path, "listing path");

        let keys = match store.list(&logical_path).await {
            Ok(keys) => keys,
            Err(err) => {
                // fatal for the whole crawl
                let _ = error_tx.send(err);
                job_wg.done();
                return;
            }
        };

        for key in keys {
            if key.ends_with('/') {
                job_wg.add(1);
                let child = format!("{}/{}", job.trim_end_matches('/'), key.trim_matches('/'));
                if job_tx.send(child).is_err() {
                    job_wg.done();
                }
                continue;
            }

            result_wg.add(1);
            if result_tx.send(format!("{logical_path}/{key}")).is_err() {
                result_wg.done();
            }
        }

        job_wg.done();
    }
}

/// The single aggregator: drains the result queue and materializes leaf
/// paths into records. The collected list is handed back through the
/// task's join handle once the done signal fires.
async fn aggregate_results(
    mut result_rx: UnboundedReceiver<String>,
    result_wg: Arc<WaitGroup>,
    mut done: watch::Receiver<bool>,
) -> Vec<RemoteSecret> {
    let mut secrets = Vec::new();

    loop {
        tokio::select! {
            _ = done.changed() => break,
            path = result_rx.recv() => match path {
                Some(path) => {
                    secrets.push(RemoteSecret::from_path(&path));
                    result_wg.done();
                }
                None => break,
            },
        }
    }

    // drain anything that raced the done signal
    while let Ok(path) = result_rx.try_recv() {
        secrets.push(RemoteSecret::from_path(&path));
        result_wg.done();
    }

    secrets
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::{Duration, Instant};

    /// In-memory hierarchy: collection path -> child names
    struct FakeStore {
        tree: HashMap<String, Vec<String>>,
    }

    impl FakeStore {
        fn new(entries: &[(&str, &[&str])]) -> Self {
            let tree = entries
                .iter()
                .map(|(path, children)| {
                    (
                        path.to_string(),
                        children.iter().map(|c| c.to_string()).collect(),
                    )
                })
                .collect();
            Self { tree }
        }
    }

    #[async_trait]
    impl SecretStore for FakeStore {
        async fn list(&self, path: &str) -> Result<Vec<String>> {
            self.tree
                .get(path)
                .cloned()
                .ok_or_else(|| Error::remote("list", format!("no such path '{path}'")))
        }

        async fn read(&self, path: &str) -> Result<serde_json::Value> {
            Ok(serde_json::json!({ "path": path }))
        }
    }

    /// A store whose list call never returns
    struct HangingStore;

    #[async_trait]
    impl SecretStore for HangingStore {
        async fn list(&self, _path: &str) -> Result<Vec<String>> {
            futures::future::pending().await
        }

        async fn read(&self, _path: &str) -> Result<serde_json::Value> {
            futures::future::pending().await
        }
    }

    fn options() -> RemoteOptions {
        RemoteOptions::default()
            .with_concurrency(4)
            .with_list_timeout(Duration::from_secs(5))
            .with_result_timeout(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn discovers_every_leaf_across_nesting_levels() {
        let store = Arc::new(FakeStore::new(&[
            ("secret", &["prod/", "stag/"]),
            ("secret/prod", &["api/", "shared-token"]),
            ("secret/prod/api", &["db", "queue", "deep/"]),
            ("secret/prod/api/deep", &["nested"]),
            ("secret/stag", &["api/"]),
            ("secret/stag/api", &["db"]),
        ]));

        let secrets = crawl(store, &options()).await.expect("crawl");

        let paths: Vec<&str> = secrets.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "secret/prod/api/db",
                "secret/prod/api/deep/nested",
                "secret/prod/api/queue",
                "secret/stag/api/db",
                "secret/prod/shared-token",
            ]
        );

        let nested = secrets
            .iter()
            .find(|s| s.path == "secret/prod/api/deep/nested")
            .expect("nested leaf");
        assert_eq!(nested.environment, "prod");
        assert_eq!(nested.application, "api");
    }

    #[tokio::test]
    async fn top_level_leaf_gets_the_unknown_sentinel() {
        let store = Arc::new(FakeStore::new(&[("secret", &["dangling"])]));

        let secrets = crawl(store, &options()).await.expect("crawl");
        assert_eq!(secrets.len(), 1);
        assert_eq!(secrets[0].environment, UNKNOWN_ENVIRONMENT);
        assert_eq!(secrets[0].path, "secret/dangling");
    }

    #[tokio::test]
    async fn failed_list_aborts_the_whole_crawl() {
        // the child collection is missing from the tree, so its list fails
        let store = Arc::new(FakeStore::new(&[("secret", &["prod/"])]));

        let err = crawl(store, &options()).await.unwrap_err();
        assert!(err.to_string().contains("no such path"), "got: {err}");
    }

    #[tokio::test]
    async fn stalled_list_times_out_within_a_bounded_margin() {
        let opts = options().with_list_timeout(Duration::from_millis(200));

        let started = Instant::now();
        let err = crawl(Arc::new(HangingStore), &opts).await.unwrap_err();
        let elapsed = started.elapsed();

        assert!(err.to_string().contains("timeout"), "got: {err}");
        assert!(elapsed >= Duration::from_millis(200), "elapsed: {elapsed:?}");
        assert!(elapsed < Duration::from_secs(2), "elapsed: {elapsed:?}");
    }

    #[test]
    fn path_pattern_extracts_environment_and_application() {
        let secret = RemoteSecret::from_path("secret/prod/api/db/credentials");
        assert_eq!(secret.environment, "prod");
        assert_eq!(secret.application, "api");

        let unknown = RemoteSecret::from_path("garbage");
        assert_eq!(unknown.environment, UNKNOWN_ENVIRONMENT);
        assert_eq!(unknown.application, "");
    }
}
