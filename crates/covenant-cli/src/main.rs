//! # covenant
//!
//! Command-line interface for ABI encoding and contract calls.
//!
//! ## Usage
//!
//! ```bash
//! # Offline
//! covenant selector "transfer(address,uint256)"
//! covenant selector --event "Transfer(address,address,uint256)"
//! covenant encode "transfer(address,uint256)" 0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d 1000
//! covenant decode "uint256,bool" 0x...
//!
//! # Against a node
//! covenant call --to 0x... "balanceOf(address)" 0x... --returns uint256
//! covenant send --to 0x... --key 0x... "transfer(address,uint256)" 0x... 1000
//! covenant deploy --key 0x... --bytecode 0x... --constructor uint256 1000000
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod error;
mod output;

pub use config::CliConfig;
pub use error::CliError;

/// Covenant CLI
#[derive(Parser, Debug)]
#[command(name = "covenant")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// RPC endpoint URL, overriding the config file
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Config file (default: ~/.covenant/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// CLI commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the 4-byte selector of a function signature
    Selector {
        /// Signature such as `transfer(address,uint256)`
        signature: String,
        /// Print the event topic instead
        #[arg(long)]
        event: bool,
    },
    /// Encode call data for a function
    Encode {
        /// Function signature
        signature: String,
        /// Argument literals, one per input
        args: Vec<String>,
    },
    /// Decode hex data as a list of types
    Decode {
        /// Comma-separated types, e.g. `uint256,bool`
        types: String,
        /// Hex data
        data: String,
    },
    /// Call a constant function with eth_call
    Call {
        /// Contract address
        #[arg(long)]
        to: String,
        /// Function signature
        signature: String,
        /// Argument literals
        args: Vec<String>,
        /// Comma-separated output types
        #[arg(long)]
        returns: Option<String>,
        /// Private key whose address is the caller
        #[arg(long)]
        key: Option<String>,
    },
    /// Send a transaction calling a function and wait for the receipt
    Send {
        /// Contract address
        #[arg(long)]
        to: String,
        /// Function signature
        signature: String,
        /// Argument literals
        args: Vec<String>,
        /// Value in wei
        #[arg(long)]
        value: Option<String>,
        /// Sender private key
        #[arg(long)]
        key: String,
    },
    /// Deploy a contract and wait for its address
    Deploy {
        /// Creation bytecode as hex
        #[arg(long)]
        bytecode: String,
        /// Comma-separated constructor types
        #[arg(long)]
        constructor: Option<String>,
        /// Constructor argument literals
        args: Vec<String>,
        /// Value in wei
        #[arg(long)]
        value: Option<String>,
        /// Deployer private key
        #[arg(long)]
        key: String,
    },
    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let json = cli.json;
    if let Err(e) = run(cli).await {
        if json {
            println!(
                "{}",
                serde_json::json!({
                    "error": format!("{:#}", e),
                    "success": false
                })
            );
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let json = cli.json;
    let mut config = CliConfig::load(cli.config.as_deref()).context("loading config")?;
    if let Some(rpc_url) = cli.rpc_url {
        config.rpc_url = rpc_url;
    }

    match cli.command {
        Commands::Selector { signature, event } => {
            commands::abi::selector(&signature, event, json)?
        }
        Commands::Encode { signature, args } => commands::abi::encode(&signature, &args, json)?,
        Commands::Decode { types, data } => commands::abi::decode(&types, &data, json)?,
        Commands::Call {
            to,
            signature,
            args,
            returns,
            key,
        } => commands::chain::call(
            &config,
            &to,
            &signature,
            &args,
            returns.as_deref(),
            key.as_deref(),
            json,
        )
        .await
        .with_context(|| format!("calling {} on {}", signature, to))?,
        Commands::Send {
            to,
            signature,
            args,
            value,
            key,
        } => {
            let value = value.as_deref();
            commands::chain::send(&config, &to, &signature, &args, value, &key, json)
                .await
                .with_context(|| format!("sending {} to {}", signature, to))?
        }
        Commands::Deploy {
            bytecode,
            constructor,
            args,
            value,
            key,
        } => commands::chain::deploy(
            &config,
            &bytecode,
            constructor.as_deref(),
            &args,
            value.as_deref(),
            &key,
            json,
        )
        .await
        .context("deploying contract")?,
        Commands::Config => {
            let rendered = toml::to_string_pretty(&config)?;
            output::Output::new(json)
                .field_value("config", serde_json::to_value(&config)?)
                .line(rendered.trim_end())
                .print();
        }
    }
    Ok(())
}
