//! Chain port for the xbridge SDK.
//!
//! This module defines the read and request-construction surface the
//! orchestrator uses against each configured chain: code-at-address checks,
//! router liquidity reads, allowance handling, and the prepare / fulfill /
//! cancel call construction. The SDK never submits transactions; every
//! write path produces a [`TxRequest`] for the caller to sign and send.

use alloy_sol_types::sol;
use async_trait::async_trait;
use thiserror::Error;
use xbridge_types::{
	CancelParams, FulfillParams, InvariantTransactionData, PrepareParams, TransactionData,
	TxRequest,
};

use alloy_primitives::{Address, U256};

/// Re-export implementations
pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
}

pub use implementations::evm::alloy::AlloyChainGate;

/// Errors that can occur on the chain port.
#[derive(Debug, Error)]
pub enum ChainError {
	/// The chain is not part of the SDK configuration.
	#[error("chain {0} is not configured")]
	ChainNotConfigured(u64),
	/// Transport or node failure.
	#[error("rpc error on chain {chain_id}: {message}")]
	Rpc { chain_id: u64, message: String },
	/// The fee-estimation path needs a price oracle the chain lacks.
	#[error("no price oracle known for chain {0}")]
	NoPriceOracle(u64),
	/// A provider endpoint could not be parsed.
	#[error("invalid rpc url for chain {chain_id}: {message}")]
	InvalidRpcUrl { chain_id: u64, message: String },
}

sol! {
	/// On-chain transaction manager interface. Struct layouts mirror the
	/// deployed contract and are part of the protocol.
	interface ITransactionManager {
		struct InvariantTransactionData {
			address receivingChainTxManagerAddress;
			address user;
			address router;
			address initiator;
			address sendingAssetId;
			address receivingAssetId;
			address sendingChainFallback;
			address receivingAddress;
			address callTo;
			uint256 sendingChainId;
			uint256 receivingChainId;
			bytes32 callDataHash;
			bytes32 transactionId;
		}

		struct TransactionData {
			address receivingChainTxManagerAddress;
			address user;
			address router;
			address initiator;
			address sendingAssetId;
			address receivingAssetId;
			address sendingChainFallback;
			address receivingAddress;
			address callTo;
			bytes32 callDataHash;
			bytes32 transactionId;
			uint256 sendingChainId;
			uint256 receivingChainId;
			uint256 amount;
			uint256 expiry;
			uint256 preparedBlockNumber;
		}

		struct PrepareArgs {
			InvariantTransactionData invariantData;
			uint256 amount;
			uint256 expiry;
			bytes encryptedCallData;
			bytes encodedBid;
			bytes bidSignature;
			bytes encodedMeta;
		}

		struct FulfillArgs {
			TransactionData txData;
			uint256 relayerFee;
			bytes signature;
			bytes callData;
			bytes encodedMeta;
		}

		struct CancelArgs {
			TransactionData txData;
			bytes signature;
			bytes encodedMeta;
		}

		function prepare(PrepareArgs calldata args) external payable returns (TransactionData memory);
		function fulfill(FulfillArgs calldata args) external returns (TransactionData memory);
		function cancel(CancelArgs calldata args) external returns (TransactionData memory);
		function routerBalances(address router, address assetId) external view returns (uint256);
	}

	interface IERC20 {
		function allowance(address owner, address spender) external view returns (uint256);
		function approve(address spender, uint256 amount) external returns (bool);
		function balanceOf(address account) external view returns (uint256);
	}

	/// Price oracle used to denominate fulfill gas in the receiving asset.
	interface IPriceOracle {
		function getTokenPrice(address token) external view returns (uint256);
	}
}

impl From<&InvariantTransactionData> for ITransactionManager::InvariantTransactionData {
	fn from(data: &InvariantTransactionData) -> Self {
		Self {
			receivingChainTxManagerAddress: data.receiving_chain_tx_manager_address,
			user: data.user,
			router: data.router,
			initiator: data.initiator,
			sendingAssetId: data.sending_asset_id,
			receivingAssetId: data.receiving_asset_id,
			sendingChainFallback: data.sending_chain_fallback,
			receivingAddress: data.receiving_address,
			callTo: data.call_to,
			sendingChainId: U256::from(data.sending_chain_id),
			receivingChainId: U256::from(data.receiving_chain_id),
			callDataHash: data.call_data_hash,
			transactionId: data.transaction_id,
		}
	}
}

impl From<&TransactionData> for ITransactionManager::TransactionData {
	fn from(data: &TransactionData) -> Self {
		let invariant = &data.invariant;
		Self {
			receivingChainTxManagerAddress: invariant.receiving_chain_tx_manager_address,
			user: invariant.user,
			router: invariant.router,
			initiator: invariant.initiator,
			sendingAssetId: invariant.sending_asset_id,
			receivingAssetId: invariant.receiving_asset_id,
			sendingChainFallback: invariant.sending_chain_fallback,
			receivingAddress: invariant.receiving_address,
			callTo: invariant.call_to,
			callDataHash: invariant.call_data_hash,
			transactionId: invariant.transaction_id,
			sendingChainId: U256::from(invariant.sending_chain_id),
			receivingChainId: U256::from(invariant.receiving_chain_id),
			amount: data.amount,
			expiry: U256::from(data.expiry),
			preparedBlockNumber: U256::from(data.prepared_block_number),
		}
	}
}

/// Trait defining the chain port.
///
/// One implementation serves every configured chain; operations address a
/// chain by id and fail with [`ChainError::ChainNotConfigured`] for unknown
/// ids.
#[async_trait]
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait ChainInterface: Send + Sync {
	/// Whether the address carries code on the given chain.
	async fn is_contract(&self, chain_id: u64, address: Address) -> Result<bool, ChainError>;

	/// The router's free liquidity in the given asset on the given chain.
	async fn router_liquidity(
		&self,
		chain_id: u64,
		router: Address,
		asset_id: Address,
	) -> Result<U256, ChainError>;

	/// Returns an approval request when the owner's allowance toward the
	/// transaction manager is insufficient; `None` for native assets or a
	/// sufficient allowance.
	async fn approve_if_needed(
		&self,
		chain_id: u64,
		asset_id: Address,
		owner: Address,
		amount: U256,
		infinite: bool,
	) -> Result<Option<TxRequest>, ChainError>;

	/// Builds the sending-chain prepare call.
	async fn build_prepare_request(
		&self,
		chain_id: u64,
		params: &PrepareParams,
	) -> Result<TxRequest, ChainError>;

	/// Builds a receiving-chain fulfill call.
	async fn build_fulfill_request(
		&self,
		chain_id: u64,
		params: &FulfillParams,
	) -> Result<TxRequest, ChainError>;

	/// Builds a cancel call for either chain.
	async fn build_cancel_request(
		&self,
		chain_id: u64,
		params: &CancelParams,
	) -> Result<TxRequest, ChainError>;

	/// The transaction manager address on the given chain.
	fn transaction_manager_address(&self, chain_id: u64) -> Result<Address, ChainError>;

	/// Current head block of the given chain.
	async fn latest_block(&self, chain_id: u64) -> Result<u64, ChainError>;

	/// Estimated fulfill gas cost denominated in the receiving asset.
	/// Returns zero when the cost cannot be computed.
	async fn calculate_gas_in_token_for_fulfill(
		&self,
		chain_id: u64,
		receiving_asset_id: Address,
	) -> Result<U256, ChainError>;
}
