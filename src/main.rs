//! Firemetrics: burned-area statistics for Brazilian territories.
//!
//! Single-binary Tokio application that:
//! 1. Resolves territories against the MapBiomas Fogo API
//! 2. Fetches raw annual/monthly burned-area series with a 30-day cache
//! 3. Fans the metric catalog out over the cached series
//! 4. Prints the merged statistics report as JSON

mod config;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};

use common::{Mode, TerritoryKey};
use firestats::{new_cache, FireDataService, StatsEngine};
use mapbiomas_client::MapBiomasClient;

/// Burned-area statistics from MapBiomas Fogo.
#[derive(Parser)]
#[command(name = "firemetrics", about = "Burned-area statistics from MapBiomas Fogo")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a territory's series and compute its statistics report.
    Stats {
        /// Territory type (e.g., "state", "municipality").
        local_type: String,

        /// Territory code.
        local_code: String,

        /// Aggregation grouping (e.g., "biome").
        #[arg(default_value = "biome")]
        grouping: String,

        /// Which series to compute statistics over.
        #[arg(long, value_enum, default_value_t = ModeArg::Annual)]
        mode: ModeArg,

        /// Compute both annual and monthly statistics.
        #[arg(long)]
        both: bool,
    },

    /// Search territories by name or code.
    Search {
        /// Search term.
        term: String,
    },

    /// List the grouping options available for a territory.
    Groupings {
        /// Territory type (e.g., "state", "municipality").
        local_type: String,

        /// Territory code.
        local_code: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Annual,
    Monthly,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Annual => Mode::Annual,
            ModeArg::Monthly => Mode::Monthly,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "firemetrics=info,mapbiomas_client=info,firestats=info".into()),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    // Load configuration.
    let cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let client = MapBiomasClient::new(&cfg.upstream);

    match cli.command {
        // ── Territory search ─────────────────────────────────────────
        Command::Search { term } => match client.search_territories(&term).await {
            Ok(territories) => {
                for t in &territories {
                    println!(
                        "{}\t{}\t{}{}",
                        t.code,
                        t.territory_type,
                        t.name,
                        t.uf.as_deref()
                            .map(|uf| format!(" ({uf})"))
                            .unwrap_or_default()
                    );
                }
            }
            Err(e) => {
                error!("Territory search failed: {}", e);
                std::process::exit(1);
            }
        },

        // ── Grouping options ─────────────────────────────────────────
        Command::Groupings {
            local_type,
            local_code,
        } => match client.fetch_groupings(&local_type, &local_code).await {
            Ok(groupings) => {
                for (grouping, labels) in &groupings {
                    println!("{}\t{}", grouping, labels.en);
                }
            }
            Err(e) => {
                error!("Groupings lookup failed: {}", e);
                std::process::exit(1);
            }
        },

        // ── Statistics run ───────────────────────────────────────────
        Command::Stats {
            local_type,
            local_code,
            grouping,
            mode,
            both,
        } => {
            info!(
                "Cache TTL: {}d, workers: {}, rolling window: {}",
                cfg.cache.ttl_days, cfg.stats.workers, cfg.stats.rolling_window
            );

            let service = FireDataService::new(
                client,
                new_cache(cfg.cache.ttl_days),
                StatsEngine::new(cfg.stats.clone()),
            );

            let key = TerritoryKey::new(local_type, local_code, grouping);
            let modes: Vec<Mode> = if both {
                vec![Mode::Annual, Mode::Monthly]
            } else {
                vec![mode.into()]
            };

            let mut report = None;
            for mode in modes {
                match service.run_statistics(&key, mode).await {
                    Ok(r) => report = Some(r),
                    Err(e) => {
                        error!("Statistics run failed for {} ({} mode): {}", key, mode, e);
                        std::process::exit(1);
                    }
                }
            }

            if let Some(entry) = service.cache().get(&key) {
                info!(
                    "{}: {} annual points, {} monthly points",
                    entry.local_name,
                    entry.annual.len(),
                    entry.monthly.len()
                );
            }

            if let Some(report) = report {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        error!("Failed to serialize report: {}", e);
                        std::process::exit(1);
                    }
                }
            }
        }
    }
}
