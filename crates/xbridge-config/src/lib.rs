//! Configuration module for the xbridge SDK.
//!
//! Callers describe the chains they operate on and pick a network; missing
//! contract addresses and subgraph endpoints resolve from the bundled
//! deployment registry. Resolution happens once at SDK construction so no
//! later operation can discover a half-configured chain.

pub mod registry;

pub use registry::{deployment, DeploymentRecord};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use xbridge_types::{DEFAULT_POLL_INTERVAL, DEFAULT_SUBGRAPH_SYNC_BUFFER};

/// Errors that can occur during configuration resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
	/// No transaction manager is configured or bundled for the chain.
	#[error("no transaction manager known for chain {0}")]
	NoTransactionManager(u64),
	/// No subgraph endpoint is configured or bundled for the chain.
	#[error("no subgraph known for chain {0}")]
	NoSubgraph(u64),
	/// No price oracle is configured or bundled for the chain.
	#[error("no price oracle known for chain {0}")]
	NoPriceOracle(u64),
	/// The chain entry has no RPC endpoint.
	#[error("no rpc url configured for chain {0}")]
	NoRpcUrl(u64),
	/// The configuration names no chains at all.
	#[error("no chains configured")]
	NoChains,
}

/// Which bus cluster the SDK talks to by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkKind {
	#[default]
	Mainnet,
	Testnet,
	Local,
}

impl NetworkKind {
	/// Default NATS cluster URL for this network.
	pub fn nats_url(&self) -> &'static str {
		match self {
			NetworkKind::Mainnet => "nats://nats.xbridge.network:4222",
			NetworkKind::Testnet => "nats://nats.testnet.xbridge.network:4222",
			NetworkKind::Local => "nats://localhost:4222",
		}
	}

	/// Default messaging auth service URL for this network.
	pub fn auth_url(&self) -> &'static str {
		match self {
			NetworkKind::Mainnet => "https://auth.xbridge.network",
			NetworkKind::Testnet => "https://auth.testnet.xbridge.network",
			NetworkKind::Local => "http://localhost:5040",
		}
	}
}

/// One chain's user-supplied configuration.
///
/// Absent addresses and subgraph endpoints resolve from the bundled
/// registry by chain id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
	/// JSON-RPC endpoints, tried in order. At least one is required.
	pub rpc_urls: Vec<String>,
	#[serde(default)]
	pub transaction_manager_address: Option<Address>,
	#[serde(default)]
	pub price_oracle_address: Option<Address>,
	#[serde(default)]
	pub subgraph_urls: Vec<String>,
	/// Blocks the subgraph may lag before it counts as stale.
	#[serde(default)]
	pub subgraph_sync_buffer: Option<u64>,
}

/// Top-level SDK configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
	#[serde(default)]
	pub network: NetworkKind,
	pub chains: HashMap<u64, ChainConfig>,
	/// Overrides the network's default NATS cluster.
	#[serde(default)]
	pub nats_url: Option<String>,
	/// Overrides the network's default auth service.
	#[serde(default)]
	pub auth_url: Option<String>,
	/// Disables the subgraph status poller (and with it the event
	/// surface).
	#[serde(default)]
	pub skip_polling: bool,
	/// Seconds between subgraph polls.
	#[serde(default)]
	pub poll_interval_secs: Option<u64>,
}

impl Config {
	/// Effective NATS URL after overrides.
	pub fn nats_url(&self) -> String {
		self.nats_url
			.clone()
			.unwrap_or_else(|| self.network.nats_url().to_string())
	}

	/// Effective auth URL after overrides.
	pub fn auth_url(&self) -> String {
		self.auth_url
			.clone()
			.unwrap_or_else(|| self.network.auth_url().to_string())
	}

	/// Effective poll interval after overrides.
	pub fn poll_interval(&self) -> std::time::Duration {
		self.poll_interval_secs
			.map(std::time::Duration::from_secs)
			.unwrap_or(DEFAULT_POLL_INTERVAL)
	}
}

/// A chain after registry resolution: every address the read and request
/// paths need is present.
#[derive(Debug, Clone)]
pub struct ResolvedChain {
	pub chain_id: u64,
	pub rpc_urls: Vec<String>,
	pub transaction_manager_address: Address,
	/// Resolved lazily by the fee-estimation path; many chains carry no
	/// oracle.
	pub price_oracle_address: Option<Address>,
	pub subgraph_urls: Vec<String>,
	pub subgraph_sync_buffer: u64,
}

/// Resolves every configured chain against the bundled registry.
///
/// A chain with neither a configured nor a bundled transaction manager or
/// subgraph fails resolution; the price oracle is allowed to stay absent
/// until fee estimation asks for it.
pub fn resolve_chains(config: &Config) -> Result<HashMap<u64, ResolvedChain>, ConfigError> {
	if config.chains.is_empty() {
		return Err(ConfigError::NoChains);
	}

	let mut resolved = HashMap::with_capacity(config.chains.len());
	for (&chain_id, chain) in &config.chains {
		if chain.rpc_urls.is_empty() {
			return Err(ConfigError::NoRpcUrl(chain_id));
		}
		let record = registry::deployment(chain_id);

		let transaction_manager_address = chain
			.transaction_manager_address
			.or_else(|| record.map(|r| r.transaction_manager))
			.ok_or(ConfigError::NoTransactionManager(chain_id))?;

		let subgraph_urls = if chain.subgraph_urls.is_empty() {
			record
				.map(|r| r.subgraph.iter().map(|s| s.to_string()).collect())
				.unwrap_or_default()
		} else {
			chain.subgraph_urls.clone()
		};
		if subgraph_urls.is_empty() {
			return Err(ConfigError::NoSubgraph(chain_id));
		}

		let price_oracle_address = chain
			.price_oracle_address
			.or_else(|| record.and_then(|r| r.price_oracle));

		resolved.insert(
			chain_id,
			ResolvedChain {
				chain_id,
				rpc_urls: chain.rpc_urls.clone(),
				transaction_manager_address,
				price_oracle_address,
				subgraph_urls,
				subgraph_sync_buffer: chain
					.subgraph_sync_buffer
					.unwrap_or(DEFAULT_SUBGRAPH_SYNC_BUFFER),
			},
		);
	}
	Ok(resolved)
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;

	fn chain_with_overrides() -> ChainConfig {
		ChainConfig {
			rpc_urls: vec!["http://localhost:8545".to_string()],
			transaction_manager_address: Some(address!(
				"1111111111111111111111111111111111111111"
			)),
			price_oracle_address: None,
			subgraph_urls: vec!["http://localhost:8000/subgraphs/test".to_string()],
			subgraph_sync_buffer: Some(25),
		}
	}

	#[test]
	fn test_resolve_with_full_overrides() {
		let mut config = Config::default();
		config.chains.insert(1337, chain_with_overrides());

		let resolved = resolve_chains(&config).unwrap();
		let chain = &resolved[&1337];
		assert_eq!(
			chain.transaction_manager_address,
			address!("1111111111111111111111111111111111111111")
		);
		assert_eq!(chain.subgraph_sync_buffer, 25);
	}

	#[test]
	fn test_resolve_from_registry() {
		let mut config = Config::default();
		config.chains.insert(
			137,
			ChainConfig {
				rpc_urls: vec!["https://polygon-rpc.example".to_string()],
				..Default::default()
			},
		);

		let resolved = resolve_chains(&config).unwrap();
		let chain = &resolved[&137];
		assert!(!chain.subgraph_urls.is_empty());
		assert!(chain.price_oracle_address.is_some());
		assert_eq!(chain.subgraph_sync_buffer, DEFAULT_SUBGRAPH_SYNC_BUFFER);
	}

	#[test]
	fn test_unknown_chain_without_manager_fails() {
		let mut config = Config::default();
		config.chains.insert(
			999_999,
			ChainConfig {
				rpc_urls: vec!["http://localhost:8545".to_string()],
				subgraph_urls: vec!["http://localhost:8000".to_string()],
				..Default::default()
			},
		);

		assert_eq!(
			resolve_chains(&config).unwrap_err(),
			ConfigError::NoTransactionManager(999_999)
		);
	}

	#[test]
	fn test_unknown_chain_without_subgraph_fails() {
		let mut config = Config::default();
		config.chains.insert(
			999_999,
			ChainConfig {
				rpc_urls: vec!["http://localhost:8545".to_string()],
				transaction_manager_address: Some(address!(
					"1111111111111111111111111111111111111111"
				)),
				..Default::default()
			},
		);

		assert_eq!(
			resolve_chains(&config).unwrap_err(),
			ConfigError::NoSubgraph(999_999)
		);
	}

	#[test]
	fn test_missing_rpc_fails() {
		let mut config = Config::default();
		config.chains.insert(
			137,
			ChainConfig {
				rpc_urls: vec![],
				..Default::default()
			},
		);

		assert_eq!(
			resolve_chains(&config).unwrap_err(),
			ConfigError::NoRpcUrl(137)
		);
	}

	#[test]
	fn test_empty_config_fails() {
		assert_eq!(
			resolve_chains(&Config::default()).unwrap_err(),
			ConfigError::NoChains
		);
	}

	#[test]
	fn test_network_url_overrides() {
		let config = Config {
			network: NetworkKind::Testnet,
			nats_url: Some("nats://bus.internal:4222".to_string()),
			..Default::default()
		};
		assert_eq!(config.nats_url(), "nats://bus.internal:4222");
		assert_eq!(config.auth_url(), NetworkKind::Testnet.auth_url());
	}
}
