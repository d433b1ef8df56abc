use anyhow::{anyhow, Result};
use clap::{Arg, Command};
use std::sync::Arc;
use tracing::{error, info};

use mintpage::{
    config::Config,
    drops::{resolve_drop_page, OnchainSource},
    ethereum::{
        contract::{call_function_json, get_contract},
        provider::ProviderManager,
        utils::interpret_rpc_error,
    },
    extensions,
    metadata::MetadataFetcher,
    wallets,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let matches = Command::new("mintpage")
        .version("0.1.0")
        .about("Resolves NFT drop mint pages and dispatches contract read calls")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to configuration file"),
        )
        .arg(
            Arg::new("network")
                .short('n')
                .long("network")
                .value_name("NETWORK")
                .help("Network to use for --call (ethereum, sepolia, polygon, arbitrum)"),
        )
        .arg(
            Arg::new("slug")
                .short('s')
                .long("slug")
                .value_name("SLUG")
                .help("Resolve the drop page for this slug and print it as JSON"),
        )
        .arg(
            Arg::new("call")
                .long("call")
                .value_name("FUNCTION")
                .help("Call a read-only function by qualified name (e.g. erc20.name)"),
        )
        .arg(
            Arg::new("address")
                .short('a')
                .long("address")
                .value_name("ADDRESS")
                .help("Contract address for --call"),
        )
        .arg(
            Arg::new("params")
                .short('p')
                .long("params")
                .value_name("JSON")
                .help("JSON array or object of parameters for --call (default: [])"),
        )
        .arg(
            Arg::new("detect")
                .long("detect")
                .value_name("SELECTORS")
                .help("Comma-separated 4-byte selectors; prints which known functions they support"),
        )
        .arg(
            Arg::new("wallet")
                .long("wallet")
                .value_name("ID")
                .help("Print metadata for a known wallet id (e.g. io.metamask)"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .help("Generate a sample configuration file and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config-path")
                .long("config-path")
                .help("Print the default configuration file path and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    // Handle special commands first
    if matches.get_flag("generate-config") {
        println!("{}", Config::generate_sample());
        return Ok(());
    }

    if matches.get_flag("config-path") {
        match Config::default_config_path() {
            Ok(path) => {
                println!("{}", path.display());
                return Ok(());
            }
            Err(e) => {
                error!("Could not determine default config path: {}", e);
                return Err(e);
            }
        }
    }

    // Offline lookups need no configuration or providers
    if let Some(selectors) = matches.get_one::<String>("detect") {
        let selectors: Vec<String> = selectors
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let supported = extensions::detect_supported(&selectors);
        println!("{}", serde_json::to_string_pretty(&supported)?);
        return Ok(());
    }

    if let Some(wallet_id) = matches.get_one::<String>("wallet") {
        match wallets::get_wallet_info(wallet_id) {
            Some(wallet) => {
                println!("{}", serde_json::to_string_pretty(wallet)?);
                return Ok(());
            }
            None => {
                error!("Unknown wallet id '{}'", wallet_id);
                std::process::exit(1);
            }
        }
    }

    // Load configuration
    let config_path = matches.get_one::<String>("config").map(|s| s.as_str());
    let mut config = Config::load_or_default(config_path).await;

    if let Some(network) = matches.get_one::<String>("network") {
        config.default_network = network.clone();
    }

    if let Some(slug) = matches.get_one::<String>("slug") {
        info!("Resolving drop page for slug '{}'", slug);

        let providers = Arc::new(ProviderManager::new(config.clone())?);
        let fetcher = MetadataFetcher::new(&config.fetch);
        let source = OnchainSource::new(providers, fetcher);

        let outcome = resolve_drop_page(&source, &config, slug)
            .await
            .map_err(|e| anyhow!("{}", interpret_rpc_error(&e.to_string())))?;

        println!("{}", serde_json::to_string_pretty(&outcome)?);
        if outcome.is_not_found() {
            std::process::exit(1);
        }
        return Ok(());
    }

    if let Some(function_name) = matches.get_one::<String>("call") {
        let address = matches
            .get_one::<String>("address")
            .ok_or_else(|| anyhow!("--call requires --address"))?;

        let descriptor = extensions::find_function(function_name).ok_or_else(|| {
            let mut known: Vec<&str> = extensions::registry().keys().copied().collect();
            known.sort_unstable();
            anyhow!(
                "Unknown function '{}'. Known functions: {}",
                function_name,
                known.join(", ")
            )
        })?;

        let params: serde_json::Value = match matches.get_one::<String>("params") {
            Some(raw) => serde_json::from_str(raw)
                .map_err(|e| anyhow!("Invalid --params JSON: {}", e))?,
            None => serde_json::Value::Array(Vec::new()),
        };

        let providers = ProviderManager::new(config.clone())?;
        let network = providers.get_network_config(None)?;
        let contract = get_contract(&providers, address, network.chain_id)?;

        match call_function_json(&contract, descriptor, &params).await {
            Ok(result) => {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }
            Err(e) => {
                error!("Call failed: {}", interpret_rpc_error(&e.to_string()));
                std::process::exit(1);
            }
        }
    }

    Err(anyhow!(
        "No action specified. Use --slug, --call, --detect, --wallet, or --generate-config"
    ))
}
