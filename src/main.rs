use anyhow::{anyhow, Result};
use route_tracker::{
    api::PokeApiClient,
    checkpoint::CheckpointStore,
    cli::{Cli, Commands},
    config::DataPaths,
    ingest::{start_fresh, IngestOptions, IngestSummary, Ingestor},
    regions::{resolve_regions, ALL_REGIONS},
    server,
    store::SqliteStore,
    ui::{Phase, SilentUi, Ui, UiApp},
};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // The full-screen display owns the terminal, so log lines would tear it.
    let tui = matches!(cli.command, Commands::Ingest { tui: true, .. });
    if !tui {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Ingest {
            db,
            checkpoint,
            region,
            delay_ms,
            api_base,
            fresh,
            tui,
        } => {
            let start = Instant::now();
            let paths = DataPaths::resolve(db, checkpoint)?;
            let regions = resolve_regions(region.as_deref()).map_err(|e| anyhow!(e))?;
            let options = IngestOptions {
                regions,
                delay: Duration::from_millis(delay_ms),
            };

            let client = PokeApiClient::new(api_base)?;
            let checkpoint = CheckpointStore::new(&paths.checkpoint);
            let mut store = SqliteStore::open(&paths.db)?;

            if fresh {
                start_fresh(&mut store, &checkpoint)?;
            }

            let summary = if tui {
                let mut ui = UiApp::new()?;
                ui.set_phase(Phase::Preparing);
                match Ingestor::new(&client, &mut store, &checkpoint, &mut ui, options).run() {
                    Ok(summary) => {
                        ui.finish(&summary_line(&summary))?;
                        summary
                    }
                    Err(e) => {
                        ui.restore()?;
                        return Err(e);
                    }
                }
            } else {
                let mut ui = SilentUi::new();
                Ingestor::new(&client, &mut store, &checkpoint, &mut ui, options).run()?
            };

            store.finalize()?;

            println!(
                "\n{} into {:?} in {:.1}s",
                summary_line(&summary),
                paths.db,
                start.elapsed().as_secs_f64()
            );
            if let Some(region) = &summary.halted_at {
                println!("Stopped early: region {} could not be fetched; re-run to resume", region);
            }
        }

        Commands::Serve { db, addr } => {
            let paths = DataPaths::resolve(db, None)?;
            tokio::runtime::Runtime::new()?.block_on(server::serve(&paths.db, addr))?;
        }

        Commands::Routes { db } => {
            let paths = DataPaths::resolve(db, None)?;
            let store = SqliteStore::open(&paths.db)?;
            let routes = store.list_routes()?;

            let mut region = "";
            for route in &routes {
                if route.region != region {
                    region = route.region.as_str();
                    println!("\n{}", region);
                }
                let mark = if route.completed { "x" } else { " " };
                println!(
                    "  [{}] {:>4}  {} ({} encounters)",
                    mark,
                    route.id,
                    route.name,
                    route.pokemon.len()
                );
            }

            let done = routes.iter().filter(|r| r.completed).count();
            println!("\n{}/{} routes complete", done, routes.len());
        }

        Commands::Regions => {
            println!("Known regions:\n");
            for region in ALL_REGIONS {
                let versions = if region.versions.is_empty() {
                    "(all versions)".to_string()
                } else {
                    region.versions.join(", ")
                };
                println!("  {:<8} {}", region.slug, versions);
            }
        }
    }

    Ok(())
}

fn summary_line(summary: &IngestSummary) -> String {
    if summary.interrupted {
        format!("Interrupted: {}", summary)
    } else {
        format!("Stored {}", summary)
    }
}
