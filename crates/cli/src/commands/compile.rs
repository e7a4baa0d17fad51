use crate::Cli;
use eyre::WrapErr;
use hashictl_config::ConfigLoader;
use tracing::info;

pub fn run(cli: &Cli, json: bool, application: Option<&str>) -> eyre::Result<()> {
    if cli.environment.is_empty() {
        eyre::bail!("--environment is required to compile configuration");
    }

    let root = match (&cli.config_dir, &cli.config_file) {
        (Some(dir), _) => dir.clone(),
        (None, Some(file)) => file.clone(),
        (None, None) => std::env::current_dir().wrap_err("could not resolve working directory")?,
    };

    let mut loader = ConfigLoader::new(&cli.environment)
        .with_variables(cli.variables.iter().cloned())
        .with_variable_files(cli.variable_files.iter().cloned());
    if let Some(app) = application {
        loader = loader.with_application(app);
    }

    let config = loader
        .load(&root)
        .wrap_err_with(|| format!("failed to compile '{}'", root.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    info!(
        environments = config.environments.len(),
        applications = config.applications.len(),
        secrets = config.secrets.len(),
        policies = config.policies.len(),
        mounts = config.mounts.len(),
        auths = config.auths.len(),
        services = config.services.len(),
        kv_entries = config.consul_kvs.len(),
        "compile complete"
    );

    for environment in config.environments.iter() {
        println!("environment {}", environment.name);
        for application in &environment.applications {
            println!("  application {application}");
        }
    }
    for secret in config.secrets.iter() {
        println!("secret {}", secret.remote_path());
    }
    for policy in config.policies.iter() {
        println!("policy {} @ {}", policy.name, policy.environment);
    }
    for mount in config.mounts.iter() {
        println!("mount {} ({})", mount.mount_point(), mount.backend);
    }
    for auth in config.auths.iter() {
        println!("auth {} ({})", auth.name, auth.backend);
    }
    for service in config.services.iter() {
        println!(
            "service {} @ {}:{}",
            service.name, service.address, service.port
        );
    }

    Ok(())
}
