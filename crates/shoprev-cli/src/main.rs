mod clean;
mod export;
mod paths;
mod pull;
mod report;

use clap::{Args, Parser, Subcommand};

use shoprev_core::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "shoprev")]
#[command(about = "Pull, normalize, and report store order revenue")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Flags that override the environment for the pull stage.
#[derive(Debug, Args)]
struct PullOverrides {
    /// Store domain, e.g. your-store.myshopify.com.
    #[arg(long)]
    store: Option<String>,
    /// Admin API access token (shpat_...).
    #[arg(long)]
    token: Option<String>,
    /// Days back to pull.
    #[arg(long)]
    days: Option<i64>,
    /// Admin API version, e.g. 2025-07.
    #[arg(long)]
    api_version: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch the reporting window from the Admin API into raw_orders.json.
    Pull(PullOverrides),
    /// Normalize raw_orders.json into clean_orders.csv.
    Clean,
    /// Aggregate clean_orders.csv into the report CSVs.
    Report,
    /// Pull, clean, and report in sequence, reusing in-memory data
    /// between stages.
    Run {
        #[command(flatten)]
        overrides: PullOverrides,
        #[arg(long)]
        skip_pull: bool,
        #[arg(long)]
        skip_clean: bool,
        #[arg(long)]
        skip_report: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = shoprev_core::load_app_config()?;
    init_tracing(&config.log_level);

    let cli = Cli::parse();
    match cli.command {
        Commands::Pull(overrides) => {
            apply_overrides(&mut config, &overrides);
            pull::run_pull(&config).await?;
        }
        Commands::Clean => {
            clean::run_clean(&config, None)?;
        }
        Commands::Report => {
            report::run_report(&config, None)?;
        }
        Commands::Run {
            overrides,
            skip_pull,
            skip_clean,
            skip_report,
        } => {
            apply_overrides(&mut config, &overrides);
            let snapshot = if skip_pull {
                None
            } else {
                Some(pull::run_pull(&config).await?)
            };
            let rows = if skip_clean {
                None
            } else {
                Some(clean::run_clean(&config, snapshot)?)
            };
            if !skip_report {
                report::run_report(&config, rows)?;
            }
        }
    }

    Ok(())
}

fn apply_overrides(config: &mut AppConfig, overrides: &PullOverrides) {
    if let Some(store) = &overrides.store {
        config.store_domain = Some(store.clone());
    }
    if let Some(token) = &overrides.token {
        config.access_token = Some(token.clone());
    }
    if let Some(days) = overrides.days {
        config.days_back = days;
    }
    if let Some(api_version) = &overrides.api_version {
        config.api_version = api_version.clone();
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
