use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use equiv::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Express an amount of one asset in every other supported asset
    Convert {
        /// Amount of the source asset
        value: f64,
        /// Source asset identifier (e.g. USD, BTC, GOLD, AAPL)
        asset: String,
        /// Region scope for equities and vehicles
        #[arg(short, long, default_value = "US")]
        region: String,
        /// Horizon mode (affects presentation only)
        #[arg(short, long, default_value = "short")]
        mode: String,
    },
    /// Display a narrative overview for an asset
    Overview {
        /// Asset identifier
        asset: String,
        /// Horizon mode
        #[arg(short, long, default_value = "short")]
        mode: String,
    },
    /// Force-refresh all cached price buckets
    Refresh,
}

fn into_app_command(cmd: Commands) -> Result<equiv::AppCommand> {
    Ok(match cmd {
        Commands::Convert {
            value,
            asset,
            region,
            mode,
        } => equiv::AppCommand::Convert {
            value,
            asset,
            region: region.parse()?,
            mode: mode.parse()?,
        },
        Commands::Overview { asset, mode } => equiv::AppCommand::Overview {
            asset,
            mode: mode.parse()?,
        },
        Commands::Refresh => equiv::AppCommand::Refresh,
        Commands::Setup => unreachable!("Setup command should be handled separately"),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => equiv::run_command(into_app_command(cmd)?, cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = equiv::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
providers:
  coingecko:
    base_url: "https://api.coingecko.com"
  exchange_rate:
    base_url: "https://api.exchangerate.host"
  metals:
    base_url: "https://api.metals.live"
  yahoo:
    base_url: "https://query2.finance.yahoo.com"

# Cache refresh intervals in seconds
cache:
  crypto_ttl: 30
  fiat_ttl: 600
  metals_ttl: 900
  stocks_ttl: 300
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
