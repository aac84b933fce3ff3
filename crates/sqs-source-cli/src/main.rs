use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqs_source::credentials::CredentialPluginRegistry;
use sqs_source::{resolve_queues, SqsQueueClient, SqsSource, SqsSourceConfig};

mod output;

#[tokio::main]
pub async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = Cli::parse().run().await {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

#[derive(Debug, Parser)]
#[command(name = "sqs-source")]
#[command(about = "stream messages from AWS SQS queues to stdout", long_about = None)]
pub struct Cli {
    /// Send SQS requests to this endpoint instead of AWS (e.g. LocalStack)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print every message as a JSON line, deleting it once written, until Ctrl-C
    Run {
        /// JSON or YAML config file, `-` for stdin
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the URL each configured queue resolves to
    Resolve {
        /// JSON or YAML config file, `-` for stdin
        #[arg(short, long)]
        config: PathBuf,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Run { ref config } => {
                let config = load_config(config, self.endpoint.as_deref())?;

                let mut source = SqsSource::new();
                source
                    .open_with_config(&config, Arc::new(output::JsonLines::stdout()))
                    .await?;

                tokio::signal::ctrl_c()
                    .await
                    .context("failed to listen for Ctrl-C")?;
                source.close().await;
            }
            Commands::Resolve { ref config } => {
                let config = load_config(config, self.endpoint.as_deref())?;

                let client =
                    SqsQueueClient::connect(&config, &CredentialPluginRegistry::default()).await;
                for queue in resolve_queues(&client, &config).await? {
                    println!("{}\t{}", queue.name, queue.url);
                }
            }
        };

        Ok(())
    }
}

fn load_config(path: &Path, endpoint: Option<&str>) -> anyhow::Result<SqsSourceConfig> {
    let document = if path == Path::new("-") {
        let mut document = String::new();
        std::io::stdin()
            .read_to_string(&mut document)
            .context("failed to read config from stdin")?;
        document
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?
    };

    let config = SqsSourceConfig::load(&document)?;

    Ok(match endpoint {
        Some(endpoint) => config.with_endpoint_url(endpoint),
        None => config,
    })
}
