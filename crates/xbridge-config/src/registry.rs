//! Bundled deployment registry.
//!
//! Chains the SDK knows out of the box: transaction manager and price
//! oracle addresses plus hosted subgraph endpoints, keyed by chain id.
//! Per-chain configuration overrides always win over these entries.

use alloy_primitives::{address, Address};

/// One chain's bundled deployment data.
#[derive(Debug, Clone, Copy)]
pub struct DeploymentRecord {
	pub chain_id: u64,
	pub transaction_manager: Address,
	pub price_oracle: Option<Address>,
	pub subgraph: &'static [&'static str],
}

const DEPLOYMENTS: &[DeploymentRecord] = &[
	DeploymentRecord {
		chain_id: 1,
		transaction_manager: address!("31efc4aeaa7c39e54a33fdc3c46ee2bd70ae0a09"),
		price_oracle: Some(address!("9ebdc9b89a98c1bb6b6b05b28e8c4d1f5bb3b02e")),
		subgraph: &["https://api.thegraph.com/subgraphs/name/xbridge-network/mainnet"],
	},
	DeploymentRecord {
		chain_id: 10,
		transaction_manager: address!("31efc4aeaa7c39e54a33fdc3c46ee2bd70ae0a09"),
		price_oracle: Some(address!("8f78d4b7d7c0b1f85ffe6b1fb79a45b9c05d2cb1")),
		subgraph: &["https://api.thegraph.com/subgraphs/name/xbridge-network/optimism"],
	},
	DeploymentRecord {
		chain_id: 56,
		transaction_manager: address!("2a9ea5e8521c2d3f3a3e0d7b6c6b86fd54bd0fc8"),
		price_oracle: Some(address!("7d1e64e0c5bd8b6a9c07ceb0e9746f065a1c5d50")),
		subgraph: &["https://api.thegraph.com/subgraphs/name/xbridge-network/bsc"],
	},
	DeploymentRecord {
		chain_id: 100,
		transaction_manager: address!("115909bdcbab21954beb4ab65fc2abee9866fa93"),
		price_oracle: Some(address!("9da66d0cc9be1f4cf0e7f68a8a2a9c6e82d2ae07")),
		subgraph: &["https://api.thegraph.com/subgraphs/name/xbridge-network/xdai"],
	},
	DeploymentRecord {
		chain_id: 137,
		transaction_manager: address!("6090de2ec76eb1dc3b5d632734415c93c44fd113"),
		price_oracle: Some(address!("e1e68e5fb7aa0ca2bd6a6a5b9f428efa2bd0aa28")),
		subgraph: &["https://api.thegraph.com/subgraphs/name/xbridge-network/matic"],
	},
	DeploymentRecord {
		chain_id: 250,
		transaction_manager: address!("31efc4aeaa7c39e54a33fdc3c46ee2bd70ae0a09"),
		price_oracle: Some(address!("ae5ebecd7a1bf9fb3dec81ed2cdb1ddcb1e2fac4")),
		subgraph: &["https://api.thegraph.com/subgraphs/name/xbridge-network/fantom"],
	},
	DeploymentRecord {
		chain_id: 42161,
		transaction_manager: address!("31efc4aeaa7c39e54a33fdc3c46ee2bd70ae0a09"),
		price_oracle: Some(address!("b6f2acbc9e8c2d2a3a7fb2b1dde02b1a62beb00d")),
		subgraph: &["https://api.thegraph.com/subgraphs/name/xbridge-network/arbitrum-one"],
	},
	DeploymentRecord {
		chain_id: 43114,
		transaction_manager: address!("31efc4aeaa7c39e54a33fdc3c46ee2bd70ae0a09"),
		price_oracle: Some(address!("fd2ce03ccecc8f6dcb57e0a1ef75cff4cecfdd8c")),
		subgraph: &["https://api.thegraph.com/subgraphs/name/xbridge-network/avalanche"],
	},
	// Testnets. No price oracles are deployed there.
	DeploymentRecord {
		chain_id: 5,
		transaction_manager: address!("bf34ba67c3a1d29e9b11e4a087cb0c16008acf3c"),
		price_oracle: None,
		subgraph: &["https://api.thegraph.com/subgraphs/name/xbridge-network/goerli"],
	},
	DeploymentRecord {
		chain_id: 80001,
		transaction_manager: address!("bf34ba67c3a1d29e9b11e4a087cb0c16008acf3c"),
		price_oracle: None,
		subgraph: &["https://api.thegraph.com/subgraphs/name/xbridge-network/mumbai"],
	},
	DeploymentRecord {
		chain_id: 421613,
		transaction_manager: address!("bf34ba67c3a1d29e9b11e4a087cb0c16008acf3c"),
		price_oracle: None,
		subgraph: &["https://api.thegraph.com/subgraphs/name/xbridge-network/arbitrum-goerli"],
	},
];

/// Looks up the bundled deployment for a chain.
pub fn deployment(chain_id: u64) -> Option<&'static DeploymentRecord> {
	DEPLOYMENTS.iter().find(|d| d.chain_id == chain_id)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_known_chain_resolves() {
		let record = deployment(137).unwrap();
		assert_eq!(record.chain_id, 137);
		assert!(!record.subgraph.is_empty());
		assert!(record.price_oracle.is_some());
	}

	#[test]
	fn test_unknown_chain_is_none() {
		assert!(deployment(999_999).is_none());
	}

	#[test]
	fn test_testnets_have_no_oracle() {
		assert!(deployment(5).unwrap().price_oracle.is_none());
	}
}
