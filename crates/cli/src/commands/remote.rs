use crate::vault::VaultKvStore;
use crate::Cli;
use hashictl_remote::{crawl, read_secrets, RemoteOptions};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

pub async fn list_secrets(
    cli: &Cli,
    detailed: bool,
    concurrency: Option<usize>,
) -> eyre::Result<()> {
    info!("scanning for remote secrets");

    let store = Arc::new(VaultKvStore::from_env()?);

    let mut opts = RemoteOptions::from_env();
    if let Some(concurrency) = concurrency {
        opts = opts.with_concurrency(concurrency);
    }

    let mut secrets = crawl(store.clone(), &opts).await?;

    if !cli.environment.is_empty() {
        secrets.retain(|s| s.environment == cli.environment);
    }

    info!(count = secrets.len(), "scanning complete");

    if !detailed {
        for secret in &secrets {
            println!(
                "{} @ {}: {}",
                secret.application, secret.environment, secret.path
            );
        }
        return Ok(());
    }

    let populated = read_secrets(store, secrets, &opts).await?;
    for secret in &populated {
        println!(
            "{} @ {}: {}",
            secret.application, secret.environment, secret.path
        );

        let Some(Value::Object(data)) = &secret.value else {
            continue;
        };
        for (key, value) in data {
            match value {
                Value::String(s) => println!("  {key} = {s}"),
                other => println!("  {key} = {other}"),
            }
        }
    }

    Ok(())
}
