//! Remote secret reader: a flat worker pool that fetches the value for
//! every discovered leaf. Same wait-group and timeout discipline as the
//! crawler, but no fan-out; any failed read is fatal.

use crate::client::SecretStore;
use crate::crawler::RemoteSecret;
use crate::options::RemoteOptions;
use crate::waitgroup::WaitGroup;
use hashictl_core::{Error, Result};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info};

/// Read the value for every secret and return the populated records,
/// ordered by (environment, application, path).
pub async fn read_secrets(
    store: Arc<dyn SecretStore>,
    secrets: Vec<RemoteSecret>,
    opts: &RemoteOptions,
) -> Result<Vec<RemoteSecret>> {
    info!(count = secrets.len(), "reading remote secrets");

    let expected = secrets.len();
    if expected == 0 {
        return Ok(Vec::new());
    }

    let wg = Arc::new(WaitGroup::new());
    wg.add(expected);

    let (job_tx, job_rx) = mpsc::unbounded_channel::<RemoteSecret>();
    let job_rx = Arc::new(Mutex::new(job_rx));
    let (result_tx, mut result_rx) = mpsc::unbounded_channel::<RemoteSecret>();
    let (error_tx, mut error_rx) = mpsc::unbounded_channel::<Error>();
    let (done_tx, done_rx) = watch::channel(false);

    for worker_id in 0..opts.concurrency {
        tokio::spawn(read_worker(
            store.clone(),
            job_rx.clone(),
            result_tx.clone(),
            error_tx.clone(),
            wg.clone(),
            done_rx.clone(),
            worker_id,
        ));
    }

    for secret in secrets {
        job_tx
            .send(secret)
            .map_err(|_| Error::remote("read", "job queue closed before start"))?;
    }

    tokio::select! {
        biased;
        failed = error_rx.recv() => {
            let _ = done_tx.send(true);
            return Err(failed.unwrap_or_else(|| {
                Error::remote("read", "worker error channel closed unexpectedly")
            }));
        }
        completed = wg.wait_timeout(opts.read_timeout) => {
            if !completed {
                let _ = done_tx.send(true);
                return Err(Error::timeout("remote secret reading", opts.read_timeout));
            }
        }
    }

    if let Ok(failed) = error_rx.try_recv() {
        let _ = done_tx.send(true);
        return Err(failed);
    }

    let _ = done_tx.send(true);

    // every result was sent before its wait-group slot was released, so
    // the full set is buffered by now
    let mut populated = Vec::with_capacity(expected);
    while let Ok(secret) = result_rx.try_recv() {
        populated.push(secret);
    }

    populated.sort_by(|a, b| {
        (&a.environment, &a.application, &a.path).cmp(&(&b.environment, &b.application, &b.path))
    });

    Ok(populated)
}

async fn read_worker(
    store: Arc<dyn SecretStore>,
    job_rx: Arc<Mutex<UnboundedReceiver<RemoteSecret>>>,
    result_tx: UnboundedSender<RemoteSecret>,
    error_tx: UnboundedSender<Error>,
    wg: Arc<WaitGroup>,
    mut done: watch::Receiver<bool>,
    worker_id: usize,
) {
    debug!(worker = worker_id, "starting reader");

    loop {
        let mut secret = {
            let mut rx = job_rx.lock().await;
            tokio::select! {
                _ = done.changed() => {
                    debug!(worker = worker_id, "stopping reader");
                    return;
                }
                job = rx.recv() => match job {
                    Some(job) => job,
                    None => return,
                },
            }
        };

        debug!(worker = worker_id, path = %secret.path, "reading secret");

        match store.read(&secret.path).await {
            Ok(value) => {
                secret.value = Some(value);
                let _ = result_tx.send(secret);
                wg.done();
            }
            Err(err) => {
                let _ = error_tx.send(err);
                wg.done();
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::time::Duration;

    struct ValueStore;

    #[async_trait]
    impl SecretStore for ValueStore {
        async fn list(&self, _path: &str) -> Result<Vec<String>> {
            Ok(Vec::new())
        }

        async fn read(&self, path: &str) -> Result<serde_json::Value> {
            if path.ends_with("missing") {
                return Err(Error::remote("read", format!("no value at '{path}'")));
            }
            Ok(json!({ "source": path }))
        }
    }

    fn leaf(path: &str) -> RemoteSecret {
        RemoteSecret::from_path(path)
    }

    fn options() -> RemoteOptions {
        RemoteOptions::default()
            .with_concurrency(4)
            .with_read_timeout(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn populates_every_record() {
        let secrets = vec![
            leaf("secret/prod/api/db"),
            leaf("secret/prod/api/queue"),
            leaf("secret/stag/api/db"),
        ];

        let populated = read_secrets(Arc::new(ValueStore), secrets, &options())
            .await
            .expect("read");

        assert_eq!(populated.len(), 3);
        for secret in &populated {
            let value = secret.value.as_ref().expect("value populated");
            assert_eq!(value["source"], json!(secret.path));
        }
    }

    #[tokio::test]
    async fn one_failed_read_is_fatal() {
        let secrets = vec![leaf("secret/prod/api/db"), leaf("secret/prod/api/missing")];

        let err = read_secrets(Arc::new(ValueStore), secrets, &options())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no value"), "got: {err}");
    }

    #[tokio::test]
    async fn empty_input_returns_immediately() {
        let populated = read_secrets(Arc::new(ValueStore), Vec::new(), &options())
            .await
            .expect("read");
        assert!(populated.is_empty());
    }
}
