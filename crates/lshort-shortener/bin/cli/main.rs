mod cli;

use crate::cli::{Command, LogFormat, CLI};
use clap::Parser;
use lshort_shortener::{Shortener, ShortenerService};
use lshort_storage::Store;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CLI::parse();
    init_tracing(config.log_format);

    info!(
        backend = %config.backend,
        db_path = %config.db_path.display(),
        "opening link store"
    );

    // a store that cannot be opened is fatal
    let store = Store::open(&config.db_path, config.backend_options())?;
    let service = ShortenerService::new(store);

    let failures = run(&service, &config).await;
    service.shutdown().await?;

    if failures > 0 {
        return Err(format!("{failures} request(s) failed").into());
    }
    Ok(())
}

/// Executes the subcommand and returns how many of its inputs failed.
async fn run<S: Shortener>(service: &S, config: &CLI) -> usize {
    let mut failures = 0;

    match &config.command {
        Command::Shrink { urls } => {
            for url in urls {
                match service.shrink(url).await {
                    Ok(key) => match &config.base_url {
                        Some(base_url) => println!("{}", key.to_url(base_url)),
                        None => println!("{key}"),
                    },
                    Err(e) => {
                        error!(url = %url, error = %e, "unable to shrink url");
                        failures += 1;
                    }
                }
            }
        }
        Command::Expand { keys } => {
            for key in keys {
                match service.expand(key).await {
                    Ok(url) => println!("{url}"),
                    Err(e) if e.is_not_found() => {
                        eprintln!("{key}: not found");
                        failures += 1;
                    }
                    Err(e) => {
                        error!(key = %key, error = %e, "unable to expand key");
                        failures += 1;
                    }
                }
            }
        }
    }

    failures
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }
}
