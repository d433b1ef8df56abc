use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub networks: HashMap<String, NetworkConfig>,
    pub default_network: String,
    #[serde(default)]
    pub drops: Vec<DropConfig>,
    #[serde(default)]
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub explorer_url: Option<String>,
    pub native_currency: NativeCurrency,
    pub gas: GasConfig,
}

/// The chain's native currency, used to answer currency-metadata lookups for
/// the native-token sentinel address without a network call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GasConfig {
    pub default_gas_limit: u64,
    pub max_gas_price: Option<u64>,
    pub priority_fee: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    pub ipfs_gateway: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            ipfs_gateway: "https://ipfs.io/ipfs/".to_string(),
        }
    }
}

/// Which token interface a drop page mints against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStandard {
    Erc721,
    Erc1155,
}

/// Static per-slug drop page record. Defined at startup, read-only, looked
/// up by slug per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropConfig {
    pub slug: String,
    pub contract_address: String,
    pub chain_id: u64,
    pub standard: TokenStandard,
    /// Required for erc1155 drops, ignored for erc721.
    pub token_id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Explicit thumbnail; when absent the NFT's own image and then the
    /// contract-level image are used.
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub hide_quantity_selector: bool,
    #[serde(default)]
    pub hide_mint_to_custom_address: bool,
}

impl Default for Config {
    fn default() -> Self {
        let mut networks = HashMap::new();

        networks.insert(
            "ethereum".to_string(),
            NetworkConfig {
                rpc_url: "https://eth-mainnet.g.alchemy.com/v2/demo".to_string(),
                chain_id: 1,
                explorer_url: Some("https://etherscan.io".to_string()),
                native_currency: NativeCurrency {
                    name: "Ether".to_string(),
                    symbol: "ETH".to_string(),
                    decimals: 18,
                },
                gas: GasConfig {
                    default_gas_limit: 100000,
                    max_gas_price: Some(50_000_000_000), // 50 Gwei
                    priority_fee: Some(2_000_000_000),   // 2 Gwei
                },
            },
        );

        networks.insert(
            "sepolia".to_string(),
            NetworkConfig {
                rpc_url: "https://eth-sepolia.g.alchemy.com/v2/demo".to_string(),
                chain_id: 11155111,
                explorer_url: Some("https://sepolia.etherscan.io".to_string()),
                native_currency: NativeCurrency {
                    name: "Sepolia Ether".to_string(),
                    symbol: "ETH".to_string(),
                    decimals: 18,
                },
                gas: GasConfig {
                    default_gas_limit: 100000,
                    max_gas_price: Some(20_000_000_000), // 20 Gwei
                    priority_fee: Some(1_000_000_000),   // 1 Gwei
                },
            },
        );

        networks.insert(
            "polygon".to_string(),
            NetworkConfig {
                rpc_url: "https://polygon-mainnet.g.alchemy.com/v2/demo".to_string(),
                chain_id: 137,
                explorer_url: Some("https://polygonscan.com".to_string()),
                native_currency: NativeCurrency {
                    name: "POL".to_string(),
                    symbol: "POL".to_string(),
                    decimals: 18,
                },
                gas: GasConfig {
                    default_gas_limit: 100000,
                    max_gas_price: Some(500_000_000_000), // 500 Gwei
                    priority_fee: Some(30_000_000_000),   // 30 Gwei
                },
            },
        );

        networks.insert(
            "arbitrum".to_string(),
            NetworkConfig {
                rpc_url: "https://arb-mainnet.g.alchemy.com/v2/demo".to_string(),
                chain_id: 42161,
                explorer_url: Some("https://arbiscan.io".to_string()),
                native_currency: NativeCurrency {
                    name: "Ether".to_string(),
                    symbol: "ETH".to_string(),
                    decimals: 18,
                },
                gas: GasConfig {
                    default_gas_limit: 100000,
                    max_gas_price: Some(5_000_000_000), // 5 Gwei
                    priority_fee: Some(100_000_000),    // 0.1 Gwei
                },
            },
        );

        Self {
            networks,
            default_network: "ethereum".to_string(),
            drops: vec![DropConfig {
                slug: "test".to_string(),
                contract_address: "0xBD9d7f15f3C850B35c30b8F9F698B511c20b7263".to_string(),
                chain_id: 11155111,
                standard: TokenStandard::Erc1155,
                token_id: Some(0),
                title: Some("Test mint page".to_string()),
                description: None,
                thumbnail: None,
                hide_quantity_selector: true,
                hide_mint_to_custom_address: true,
            }],
            fetch: FetchConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {:?}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {:?}: {}", path, e))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| anyhow!("Failed to serialize config: {}", e))?;

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    anyhow!("Failed to create config directory {:?}: {}", parent, e)
                })?;
            }
        }

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {:?}: {}", path, e))?;

        Ok(())
    }

    /// Load configuration with fallback to default
    pub async fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Self {
        let mut config = match path {
            Some(path) => match Self::load_from_file(path).await {
                Ok(config) => {
                    tracing::info!("Loaded configuration from file");
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to load config file, using defaults: {}", e);
                    Self::default()
                }
            },
            None => Self::default(),
        };

        // Apply environment variable substitutions
        config.apply_env_vars();
        config
    }

    /// Structural invariants the rest of the system relies on: unique slugs,
    /// non-zero chain ids, and a token id for every multi-token drop.
    pub fn validate(&self) -> Result<()> {
        let mut slugs = HashSet::new();
        for drop in &self.drops {
            if !slugs.insert(drop.slug.as_str()) {
                return Err(anyhow!("Duplicate drop slug '{}'", drop.slug));
            }
            if drop.chain_id == 0 {
                return Err(anyhow!("Drop '{}' has a zero chain id", drop.slug));
            }
            if drop.standard == TokenStandard::Erc1155 && drop.token_id.is_none() {
                return Err(anyhow!(
                    "Drop '{}' is erc1155 but has no token_id",
                    drop.slug
                ));
            }
        }

        for (name, network) in &self.networks {
            if network.chain_id == 0 {
                return Err(anyhow!("Network '{}' has a zero chain id", name));
            }
        }

        Ok(())
    }

    /// Look up a drop page record by slug.
    pub fn find_drop(&self, slug: &str) -> Option<&DropConfig> {
        self.drops.iter().find(|d| d.slug == slug)
    }

    /// Look up a configured network by numeric chain id.
    pub fn chain_by_id(&self, chain_id: u64) -> Option<(&str, &NetworkConfig)> {
        self.networks
            .iter()
            .find(|(_, net)| net.chain_id == chain_id)
            .map(|(name, net)| (name.as_str(), net))
    }

    /// Apply environment variable substitutions to configuration
    fn apply_env_vars(&mut self) {
        // Check for ALCHEMY_API_KEY environment variable
        if let Ok(api_key) = std::env::var("ALCHEMY_API_KEY") {
            tracing::info!("Using ALCHEMY_API_KEY environment variable for RPC URLs");

            for (network_name, network_config) in &mut self.networks {
                // Replace Alchemy demo URLs with actual API key
                if network_config.rpc_url.contains("alchemy.com/v2/demo") {
                    network_config.rpc_url = network_config
                        .rpc_url
                        .replace("/demo", &format!("/{}", api_key));
                    tracing::debug!("Updated {} RPC URL with API key", network_name);
                } else if network_config.rpc_url.contains("YOUR_API_KEY_HERE") {
                    network_config.rpc_url = network_config
                        .rpc_url
                        .replace("YOUR_API_KEY_HERE", &api_key);
                    tracing::debug!("Updated {} RPC URL with API key", network_name);
                }
            }
        } else {
            // Warn if using demo endpoints
            for (network_name, network_config) in &self.networks {
                if network_config.rpc_url.contains("/demo") {
                    tracing::warn!("Using demo RPC endpoint for {}, set ALCHEMY_API_KEY environment variable for better reliability", network_name);
                }
            }
        }
    }

    /// Get default config file path
    pub fn default_config_path() -> Result<std::path::PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("mintpage").join("config.toml"))
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let sample_config = r#"# mintpage configuration file
# Configures chain registry, drop pages, and metadata fetching

# Default network for CLI calls that do not name one
default_network = "ethereum"

# Network configurations
[networks.ethereum]
rpc_url = "https://eth-mainnet.g.alchemy.com/v2/YOUR_API_KEY_HERE"
chain_id = 1
explorer_url = "https://etherscan.io"

[networks.ethereum.native_currency]
name = "Ether"
symbol = "ETH"
decimals = 18

[networks.ethereum.gas]
default_gas_limit = 100000
max_gas_price = 50_000_000_000  # 50 Gwei
priority_fee = 2_000_000_000    # 2 Gwei

[networks.sepolia]
rpc_url = "https://eth-sepolia.g.alchemy.com/v2/YOUR_API_KEY_HERE"
chain_id = 11155111
explorer_url = "https://sepolia.etherscan.io"

[networks.sepolia.native_currency]
name = "Sepolia Ether"
symbol = "ETH"
decimals = 18

[networks.sepolia.gas]
default_gas_limit = 100000
max_gas_price = 20_000_000_000  # 20 Gwei
priority_fee = 1_000_000_000    # 1 Gwei

# Metadata fetching
[fetch]
ipfs_gateway = "https://ipfs.io/ipfs/"

# Drop pages, one table per slug
[[drops]]
slug = "test"
contract_address = "0xBD9d7f15f3C850B35c30b8F9F698B511c20b7263"
chain_id = 11155111
standard = "erc1155"
token_id = 0
title = "Test mint page"
hide_quantity_selector = true
hide_mint_to_custom_address = true

# Environment variables that can be used:
# ALCHEMY_API_KEY - Your Alchemy API key (replace YOUR_API_KEY_HERE above)
"#;
        sample_config.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.networks.contains_key("ethereum"));
        assert_eq!(config.find_drop("test").unwrap().chain_id, 11155111);
        assert!(config.find_drop("unknown").is_none());
    }

    #[test]
    fn test_chain_by_id() {
        let config = Config::default();
        let (name, net) = config.chain_by_id(137).unwrap();
        assert_eq!(name, "polygon");
        assert_eq!(net.native_currency.symbol, "POL");
        assert!(config.chain_by_id(424242).is_none());
    }

    #[test]
    fn test_sample_config_parses() {
        let config: Config = toml::from_str(&Config::generate_sample()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.drops.len(), 1);
        assert_eq!(config.drops[0].standard, TokenStandard::Erc1155);
        assert_eq!(config.fetch.ipfs_gateway, "https://ipfs.io/ipfs/");
    }

    #[test]
    fn test_validate_rejects_duplicate_slug() {
        let mut config = Config::default();
        let mut dup = config.drops[0].clone();
        dup.title = None;
        config.drops.push(dup);
        assert!(config.validate().unwrap_err().to_string().contains("Duplicate drop slug"));
    }

    #[test]
    fn test_validate_rejects_erc1155_without_token_id() {
        let mut config = Config::default();
        config.drops[0].token_id = None;
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("no token_id"));
    }

    #[tokio::test]
    async fn test_config_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::default();
        config.save_to_file(&path).await.unwrap();

        let loaded = Config::load_from_file(&path).await.unwrap();
        assert_eq!(loaded.default_network, config.default_network);
        assert_eq!(loaded.networks.len(), config.networks.len());
        assert_eq!(loaded.drops.len(), config.drops.len());
        assert_eq!(loaded.drops[0].slug, "test");
    }
}
