use crate::config::{Config, NetworkConfig};
use alloy::{
    providers::{Provider, ProviderBuilder, RootProvider},
    transports::http::{Client, Http},
};
use anyhow::{anyhow, Result};
use std::collections::HashMap;

/// One HTTP provider per configured network, built once at startup.
///
/// Drop pages address chains by numeric id while the CLI addresses them by
/// name, so both lookups are supported over the same table.
#[derive(Debug)]
pub struct ProviderManager {
    providers: HashMap<String, RootProvider<Http<Client>>>,
    config: Config,
}

impl ProviderManager {
    pub fn new(config: Config) -> Result<Self> {
        let mut providers = HashMap::new();

        for (network_name, network_config) in &config.networks {
            let provider = Self::create_provider(network_config)?;
            providers.insert(network_name.clone(), provider);
        }

        Ok(Self { providers, config })
    }

    fn create_provider(network_config: &NetworkConfig) -> Result<RootProvider<Http<Client>>> {
        let provider = ProviderBuilder::new().on_http(network_config.rpc_url.parse()?);

        Ok(provider)
    }

    pub fn get_provider(&self, network: Option<&str>) -> Result<&RootProvider<Http<Client>>> {
        let network_name = network.unwrap_or(&self.config.default_network);
        self.providers
            .get(network_name)
            .ok_or_else(|| anyhow!("Network '{}' not found", network_name))
    }

    /// Resolves a chain by numeric id to its network name and configuration.
    pub fn network_by_chain_id(&self, chain_id: u64) -> Result<(&str, &NetworkConfig)> {
        self.config
            .networks
            .iter()
            .find(|(_, net)| net.chain_id == chain_id)
            .map(|(name, net)| (name.as_str(), net))
            .ok_or_else(|| anyhow!("No configured network with chain id {}", chain_id))
    }

    pub fn get_provider_by_chain_id(&self, chain_id: u64) -> Result<&RootProvider<Http<Client>>> {
        let (name, _) = self.network_by_chain_id(chain_id)?;
        self.providers
            .get(name)
            .ok_or_else(|| anyhow!("Network '{}' not found", name))
    }

    pub fn get_network_config(&self, network: Option<&str>) -> Result<&NetworkConfig> {
        let network_name = network.unwrap_or(&self.config.default_network);
        self.config
            .networks
            .get(network_name)
            .ok_or_else(|| anyhow!("Network '{}' not configured", network_name))
    }

    pub fn get_available_networks(&self) -> Vec<String> {
        self.config.networks.keys().cloned().collect()
    }

    pub async fn check_connection(&self, network: Option<&str>) -> Result<bool> {
        let provider = self
            .get_provider(network)
            .map_err(|e| anyhow!("Failed to get provider for connection check: {}", e))?;

        match provider.get_block_number().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::debug!(
                    "Connection check failed for network {}: {}",
                    network.unwrap_or("default"),
                    e
                );
                Ok(false)
            }
        }
    }

    #[allow(dead_code)]
    pub async fn get_chain_id(&self, network: Option<&str>) -> Result<u64> {
        let provider = self.get_provider(network)?;
        let chain_id = provider.get_chain_id().await?;
        Ok(chain_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_lookup() {
        let manager = ProviderManager::new(Config::default()).unwrap();

        let (name, net) = manager.network_by_chain_id(11155111).unwrap();
        assert_eq!(name, "sepolia");
        assert_eq!(net.chain_id, 11155111);

        assert!(manager.network_by_chain_id(0).is_err());
        assert!(manager.network_by_chain_id(999_999_999).is_err());
    }

    #[test]
    fn test_provider_lookup_by_name() {
        let manager = ProviderManager::new(Config::default()).unwrap();
        assert!(manager.get_provider(Some("ethereum")).is_ok());
        assert!(manager.get_provider(None).is_ok());
        assert!(manager.get_provider(Some("unknown")).is_err());
    }
}
