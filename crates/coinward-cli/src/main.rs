use clap::{Parser, Subcommand};
use coinward_rpc::ports;
use coinward_types::constants::DEFAULT_GAP_THRESHOLD;
use coinward_types::Network;
use coinward_wallet::config::DEFAULT_FETCH_CONCURRENCY;
use std::path::PathBuf;

mod commands;

/// coinward wallet command-line interface.
#[derive(Parser)]
#[command(name = "coinward")]
#[command(about = "Command-line wallet for the coinward network")]
#[command(version)]
struct Cli {
    /// Network to use (mainnet, testnet, devnet).
    #[arg(long, default_value = "mainnet")]
    network: Network,

    /// Indexer URL (overrides default for the selected network).
    #[arg(long)]
    indexer: Option<String>,

    /// File holding the hex-encoded 32-byte wallet seed.
    #[arg(long)]
    seed_file: Option<PathBuf>,

    /// Hex-encoded wallet seed; ignored when --seed-file is given.
    #[arg(long, env = "COINWARD_SEED", hide_env_values = true)]
    seed: Option<String>,

    /// Consecutive unused addresses that end discovery.
    #[arg(long, default_value_t = DEFAULT_GAP_THRESHOLD)]
    gap_threshold: u32,

    /// Maximum concurrent indexer requests.
    #[arg(long, default_value_t = DEFAULT_FETCH_CONCURRENCY)]
    concurrency: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a freshly generated seed.
    NewSeed,

    /// Show the current receive address.
    Address {
        /// Skip the current address and show the next one.
        #[arg(long)]
        new: bool,
    },

    /// Scan for used addresses and report what was found.
    Discover,

    /// Show wallet balance.
    Balance,

    /// Show transaction history.
    History {
        /// Maximum number of entries to show.
        #[arg(long, default_value = "25")]
        limit: usize,
    },

    /// Send funds to an address.
    Send {
        /// Destination address.
        #[arg(long)]
        to: String,

        /// Amount in coins (e.g., "1.5" or "0.001").
        #[arg(long)]
        amount: String,

        /// Fee in coins.
        #[arg(long, default_value = "0.0001")]
        fee: String,
    },
}

/// Application context shared across commands.
pub struct AppContext {
    network: Network,
    indexer_url: String,
    seed_file: Option<PathBuf>,
    seed: Option<String>,
    gap_threshold: u32,
    concurrency: usize,
}

impl AppContext {
    fn from_cli(cli: &Cli) -> Self {
        let indexer_url = cli
            .indexer
            .clone()
            .unwrap_or_else(|| default_indexer_url(cli.network));
        Self {
            network: cli.network,
            indexer_url,
            seed_file: cli.seed_file.clone(),
            seed: cli.seed.clone(),
            gap_threshold: cli.gap_threshold,
            concurrency: cli.concurrency,
        }
    }
}

fn default_indexer_url(network: Network) -> String {
    let port = match network {
        Network::Mainnet => ports::INDEXER_MAINNET,
        Network::Testnet => ports::INDEXER_TESTNET,
        Network::Devnet => ports::INDEXER_DEVNET,
    };
    format!("http://127.0.0.1:{}", port)
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let ctx = AppContext::from_cli(&cli);

    let result = match cli.command {
        Commands::NewSeed => commands::new_seed(),
        Commands::Address { new } => commands::show_address(&ctx, new).await,
        Commands::Discover => commands::discover(&ctx).await,
        Commands::Balance => commands::show_balance(&ctx).await,
        Commands::History { limit } => commands::show_history(&ctx, limit).await,
        Commands::Send { to, amount, fee } => commands::send(&ctx, &to, &amount, &fee).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
