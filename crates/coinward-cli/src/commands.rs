//! CLI command implementations.

use crate::AppContext;
use coinward_rpc::RpcConfig;
use coinward_types::{format_amount, parse_amount};
use coinward_wallet::{parse_seed_hex, ChainType, Wallet, WalletConfig, WalletKeys};

type Result = std::result::Result<(), Box<dyn std::error::Error>>;

// ─── Helpers ────────────────────────────────────────────────────────────────

fn load_seed(ctx: &AppContext) -> std::result::Result<[u8; 32], Box<dyn std::error::Error>> {
    if let Some(path) = &ctx.seed_file {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read seed file {}: {}", path.display(), e))?;
        return Ok(parse_seed_hex(&text)?);
    }
    match &ctx.seed {
        Some(seed) => Ok(parse_seed_hex(seed)?),
        None => Err("no seed given: use --seed-file or set COINWARD_SEED".into()),
    }
}

fn open_wallet(ctx: &AppContext) -> std::result::Result<Wallet, Box<dyn std::error::Error>> {
    let seed = load_seed(ctx)?;
    let config = WalletConfig::new(ctx.network)
        .with_gap_threshold(ctx.gap_threshold)
        .with_fetch_concurrency(ctx.concurrency);
    let rpc = RpcConfig {
        url: ctx.indexer_url.clone(),
        ..Default::default()
    };
    Ok(Wallet::connect(seed, config, rpc)?)
}

/// Open the wallet and bring it up to date with the indexer.
async fn synced_wallet(ctx: &AppContext) -> std::result::Result<Wallet, Box<dyn std::error::Error>> {
    let mut wallet = open_wallet(ctx)?;
    log::info!("discovering addresses via {}", ctx.indexer_url);
    wallet.discover().await?;
    Ok(wallet)
}

fn short(id: &str) -> String {
    match id.char_indices().nth(16) {
        Some((end, _)) => format!("{}...", &id[..end]),
        None => id.to_string(),
    }
}

// ─── Commands ───────────────────────────────────────────────────────────────

pub fn new_seed() -> Result {
    println!("{}", hex::encode(WalletKeys::random_seed()));
    Ok(())
}

pub async fn show_address(ctx: &AppContext, new: bool) -> Result {
    let mut wallet = synced_wallet(ctx).await?;
    let address = if new {
        wallet.new_receive_address()
    } else {
        wallet.receive_address()
    };
    println!(
        "{} (receive #{})",
        address,
        wallet.cursor(ChainType::Receive)
    );
    Ok(())
}

pub async fn discover(ctx: &AppContext) -> Result {
    let mut wallet = open_wallet(ctx)?;
    let report = wallet.discover().await?;

    let show = |h: Option<u32>| h.map_or_else(|| "none".to_string(), |i| i.to_string());
    println!("Highest used receive index: {}", show(report.receive_highest));
    println!("Highest used change index:  {}", show(report.change_highest));
    println!("Active addresses:           {}", report.active_addresses);
    println!("Unspent outputs found:      {}", report.new_utxos);
    println!(
        "Next receive / change:      {} / {}",
        wallet.cursor(ChainType::Receive),
        wallet.cursor(ChainType::Change)
    );
    Ok(())
}

pub async fn show_balance(ctx: &AppContext) -> Result {
    let wallet = synced_wallet(ctx).await?;

    println!("{:<12} {:>24}", "Balance", format_amount(wallet.balance()));
    println!(
        "{:<12} {:>24}",
        "Available",
        format_amount(wallet.available_balance())
    );
    println!(
        "{:<12} {:>24}",
        "Pending",
        format_amount(wallet.pending_amount())
    );
    println!();
    println!("{} unspent output(s)", wallet.utxos().len());
    Ok(())
}

pub async fn show_history(ctx: &AppContext, limit: usize) -> Result {
    let wallet = synced_wallet(ctx).await?;
    let history = wallet.history();

    if history.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    println!(
        "Showing {}/{} transactions:",
        history.len().min(limit),
        history.len()
    );
    println!();
    println!("{:<12} {:<16} TX Hash", "Blue score", "Block time");
    println!("{}", "-".repeat(60));
    for tx in history.iter().take(limit) {
        let score = tx
            .accepting_blue_score
            .map_or_else(|| "pending".to_string(), |s| s.to_string());
        let time = tx.block_time.map_or_else(String::new, |t| t.to_string());
        println!("{:<12} {:<16} {}", score, time, short(&tx.transaction_id));
    }
    Ok(())
}

pub async fn send(ctx: &AppContext, to: &str, amount: &str, fee: &str) -> Result {
    let amount = parse_amount(amount)?;
    let fee = parse_amount(fee)?;
    let mut wallet = synced_wallet(ctx).await?;

    println!(
        "Sending {} to {} (fee {})",
        format_amount(amount),
        to,
        format_amount(fee)
    );
    let id = wallet.send(to, amount, fee).await?;
    println!("Transaction submitted: {}", id);
    println!(
        "Remaining balance: {}",
        format_amount(wallet.balance())
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_seed() {
        let mut ctx = AppContext {
            network: coinward_types::Network::Testnet,
            indexer_url: String::new(),
            seed_file: None,
            seed: Some("02".repeat(32)),
            gap_threshold: 20,
            concurrency: 1,
        };
        assert_eq!(load_seed(&ctx).unwrap(), [2u8; 32]);
        ctx.seed = Some("0203".into());
        assert!(load_seed(&ctx).is_err());
        ctx.seed = None;
        assert!(load_seed(&ctx).is_err());
    }

    #[test]
    fn test_short() {
        assert_eq!(short("abc"), "abc");
        assert_eq!(short(&"f".repeat(16)), "f".repeat(16));
        assert_eq!(short(&"f".repeat(64)), format!("{}...", "f".repeat(16)));
        assert_eq!(short(&"é".repeat(20)), format!("{}...", "é".repeat(16)));
    }
}
