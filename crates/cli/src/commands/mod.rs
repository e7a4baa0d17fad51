use clap::Subcommand;

pub mod compile;
pub mod remote;

use crate::Cli;

#[derive(Subcommand)]
pub enum Commands {
    /// Compile local configuration into the in-memory model
    Compile {
        /// Print the full compiled model as JSON
        #[arg(long)]
        json: bool,

        /// Limit the compile to one application
        #[arg(long = "application")]
        application: Option<String>,
    },

    /// Operations against the remote secret store
    #[command(subcommand)]
    Remote(RemoteCommands),
}

#[derive(Subcommand)]
pub enum RemoteCommands {
    /// Crawl the remote hierarchy and list every discovered secret
    ListSecrets {
        /// Also read each secret and print its data
        #[arg(long)]
        detailed: bool,

        /// Worker pool size (defaults to 3x the available cores)
        #[arg(long)]
        concurrency: Option<usize>,
    },
}

pub async fn execute(cli: Cli) -> eyre::Result<()> {
    match &cli.command {
        Commands::Compile { json, application } => {
            compile::run(&cli, *json, application.as_deref())
        }
        Commands::Remote(RemoteCommands::ListSecrets {
            detailed,
            concurrency,
        }) => remote::list_secrets(&cli, *detailed, *concurrency).await,
    }
}
