mod config;
mod replay;

use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use catalog::{legacy, HandlerCatalog};
use clap::{Parser, Subcommand};
use dispatcher::DispatchOutcome;
use sdk_integration::RecordingProvider;
use serde_json::json;
use shared::domain::{NodeRef, UiEvent};
use tokio::io::BufReader;

#[derive(Parser, Debug)]
struct Cli {
    /// Settings file; defaults to ./dispatch.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Catalog file or directory, overriding the settings.
    #[arg(long)]
    catalog: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Validate,
    List,
    Dispatch {
        #[arg(long)]
        handler: String,
        #[arg(long)]
        event: String,
        #[arg(long)]
        target: Option<String>,
    },
    Replay {
        file: Option<PathBuf>,
    },
    Import {
        #[arg(long)]
        scripts: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = config::load_settings(cli.config.as_deref())?;
    if let Some(path) = cli.catalog {
        settings.catalog_path = path;
    }

    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .with_writer(std::io::stderr)
        .init();

    let load_catalog = || HandlerCatalog::load(&settings.catalog_path);

    match cli.command {
        Command::Validate => {
            let catalog = load_catalog()?;
            println!(
                "catalog ok: {} handlers in {}",
                catalog.len(),
                settings.catalog_path.display()
            );
        }
        Command::List => {
            let catalog = load_catalog()?;
            for table in catalog.tables() {
                let bindings: Vec<String> = table
                    .bindings()
                    .map(|(on, action)| format!("{on}={}", action.name()))
                    .collect();
                println!("{} {}", table.id(), bindings.join(" "));
            }
        }
        Command::Dispatch {
            handler,
            event,
            target,
        } => {
            let catalog = load_catalog()?;
            let provider = RecordingProvider::new();
            let dispatcher = catalog
                .dispatcher(&handler, Arc::new(provider.clone()), settings.env_key.clone())
                .ok_or_else(|| anyhow!("unknown handler '{handler}'"))?;

            let result = dispatcher.handle(UiEvent::new(event, target.map(NodeRef::from)));
            let outcome = match &result {
                Ok(DispatchOutcome::Performed { event_type, action }) => {
                    json!({ "performed": { "event_type": event_type, "action": action } })
                }
                Ok(DispatchOutcome::Ignored) => json!("ignored"),
                Err(err) => json!({ "failed": err.to_string() }),
            };
            let report = json!({ "outcome": outcome, "calls": provider.calls() });
            println!("{}", serde_json::to_string_pretty(&report)?);
            result?;
        }
        Command::Replay { file } => {
            let catalog = load_catalog()?;
            let provider = Arc::new(RecordingProvider::new());
            let env = settings.env_key.as_ref();
            let summary = match file {
                Some(path) => {
                    let input = tokio::fs::File::open(&path)
                        .await
                        .with_context(|| format!("failed to open replay file '{}'", path.display()))?;
                    replay::replay(BufReader::new(input), &catalog, provider, env).await?
                }
                None => {
                    let input = BufReader::new(tokio::io::stdin());
                    replay::replay(input, &catalog, provider, env).await?
                }
            };
            println!("{}", serde_json::to_string(&summary)?);
        }
        Command::Import { scripts, out } => {
            let document = legacy::import_dir(&scripts)?;
            let rendered = serde_json::to_string_pretty(&document)?;
            match out {
                Some(out) => tokio::fs::write(&out, rendered)
                    .await
                    .with_context(|| format!("failed to write catalog '{}'", out.display()))?,
                None => println!("{rendered}"),
            }
        }
    }

    Ok(())
}
