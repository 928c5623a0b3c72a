//! User-facing error taxonomy.
//!
//! Validation and configuration failures surface before any I/O; per-bid
//! failures never appear here — they accumulate inside
//! [`xbridge_auction::AuctionError::NoValidBids`].

use alloy_primitives::Address;
use thiserror::Error;
use xbridge_auction::AuctionError;
use xbridge_chain::ChainError;
use xbridge_config::ConfigError;
use xbridge_messaging::MessagingError;
use xbridge_subgraph::SubgraphError;
use xbridge_types::EncodingError;

/// Errors returned by SDK operations.
#[derive(Debug, Error)]
pub enum SdkError {
	/// A call parameter failed structural validation.
	#[error("invalid params at {path}: {message}")]
	InvalidParamStructure { path: String, message: String },
	/// The operation names a chain outside the configuration.
	#[error("chain {0} is not configured")]
	ChainNotConfigured(u64),
	/// Slippage tolerance outside the accepted range.
	#[error("slippage tolerance must be between 0.01 and 15.00 percent")]
	InvalidSlippage,
	/// Expiry outside the accepted window.
	#[error("expiry must be between 49 and 96 hours from now")]
	InvalidExpiry,
	/// The bid's callTo address carries no code on the receiving chain.
	#[error("callTo {0} is not a contract")]
	InvalidCallTo(Address),
	/// The wallet-side callData encryption failed.
	#[error("could not encrypt call data: {0}")]
	Encryption(String),
	/// One or both chains' subgraphs lag the chain head.
	#[error("subgraphs out of sync for chains {0:?}")]
	SubgraphsNotSynced(Vec<u64>),
	/// The auction response carries no bid signature.
	#[error("bid signature missing from auction response")]
	InvalidBidSignature,
	/// The relayed fulfill was not confirmed within the deadline.
	#[error("relayed fulfill timed out")]
	MetaTxTimeout,
	#[error(transparent)]
	Config(#[from] ConfigError),
	#[error(transparent)]
	Auction(#[from] AuctionError),
	#[error(transparent)]
	Chain(#[from] ChainError),
	#[error(transparent)]
	Messaging(#[from] MessagingError),
	#[error(transparent)]
	Subgraph(#[from] SubgraphError),
	#[error(transparent)]
	Encoding(#[from] EncodingError),
	#[error(transparent)]
	Serialization(#[from] serde_json::Error),
}

impl SdkError {
	pub(crate) fn invalid_params(path: &str, message: impl Into<String>) -> Self {
		SdkError::InvalidParamStructure {
			path: path.to_string(),
			message: message.into(),
		}
	}
}
