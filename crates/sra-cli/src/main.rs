use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sra")]
#[command(about = "Swap readiness aggregator CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> env -> overrides...)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Replay a recorded upstream event script through a swap session
    Replay {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// JSON replay script
        #[arg(long)]
        script: String,

        /// Fail on config keys nothing reads (default: warn)
        #[arg(long, default_value_t = false)]
        strict_config: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env.local if present (dev convenience).
    let _ = dotenvy::from_filename(".env.local");

    let cli = Cli::parse();

    match cli.cmd {
        Commands::ConfigHash { paths } => {
            init_tracing(sra_config::DEFAULT_LOG_FILTER);
            let loaded = commands::load_config(&paths)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Replay {
            config_paths,
            script,
            strict_config,
        } => {
            let loaded = commands::load_config(&config_paths)?;
            let cfg = sra_config::SwapConfig::from_config_json(&loaded.config_json)?;
            init_tracing(&cfg.log_filter);
            commands::check_unused_keys(&loaded, strict_config)?;

            println!("config_hash={}", loaded.config_hash);
            commands::replay::run(&cfg, &script).await?;
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise the configured filter. Logs go to stderr so
/// stdout stays machine-readable.
fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
