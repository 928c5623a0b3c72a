//! Alloy-backed chain port implementation.
//!
//! Holds one HTTP provider per configured chain for the process lifetime.
//! Reads go through `eth_call`; request construction is pure calldata
//! encoding and never touches the network.

use crate::{ChainError, ChainInterface, IPriceOracle, ITransactionManager, IERC20};
use alloy_primitives::{Address, Bytes, TxKind, U256};
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_types::{TransactionInput, TransactionRequest};
use alloy_sol_types::{SolCall, SolValue};
use alloy_transport_http::Http;
use async_trait::async_trait;
use std::collections::HashMap;
use xbridge_config::ResolvedChain;
use xbridge_types::{
	CancelParams, FulfillParams, PrepareParams, TxRequest, FULFILL_GAS_LIMIT,
};

type HttpProvider = RootProvider<Http<reqwest::Client>>;

/// Per-chain provider handle plus the contract addresses the port needs.
struct ChainHandle {
	provider: HttpProvider,
	transaction_manager: Address,
	price_oracle: Option<Address>,
}

/// Chain port over Alloy HTTP providers.
pub struct AlloyChainGate {
	chains: HashMap<u64, ChainHandle>,
}

impl AlloyChainGate {
	/// Creates a gate for the given resolved chains. Provider construction
	/// parses endpoints but performs no network I/O.
	pub fn new(chains: &HashMap<u64, ResolvedChain>) -> Result<Self, ChainError> {
		let mut handles = HashMap::with_capacity(chains.len());
		for (&chain_id, chain) in chains {
			// Resolution guarantees at least one URL.
			let url = chain.rpc_urls[0]
				.parse::<reqwest::Url>()
				.map_err(|e| ChainError::InvalidRpcUrl {
					chain_id,
					message: e.to_string(),
				})?;
			handles.insert(
				chain_id,
				ChainHandle {
					provider: RootProvider::new_http(url),
					transaction_manager: chain.transaction_manager_address,
					price_oracle: chain.price_oracle_address,
				},
			);
		}
		Ok(Self { chains: handles })
	}

	fn handle(&self, chain_id: u64) -> Result<&ChainHandle, ChainError> {
		self.chains
			.get(&chain_id)
			.ok_or(ChainError::ChainNotConfigured(chain_id))
	}

	async fn eth_call(
		&self,
		chain_id: u64,
		to: Address,
		data: Vec<u8>,
	) -> Result<Bytes, ChainError> {
		let handle = self.handle(chain_id)?;
		let tx = TransactionRequest {
			to: Some(TxKind::Call(to)),
			input: TransactionInput::new(data.into()),
			..Default::default()
		};
		handle
			.provider
			.call(&tx)
			.await
			.map_err(|e| ChainError::Rpc {
				chain_id,
				message: e.to_string(),
			})
	}

	async fn token_price(&self, chain_id: u64, oracle: Address, token: Address) -> Option<U256> {
		let data = IPriceOracle::getTokenPriceCall { token }.abi_encode();
		match self.eth_call(chain_id, oracle, data).await {
			Ok(ret) => U256::abi_decode(&ret, false).ok(),
			Err(e) => {
				tracing::warn!(chain_id, token = %token, error = %e, "price oracle read failed");
				None
			},
		}
	}
}

#[async_trait]
impl ChainInterface for AlloyChainGate {
	async fn is_contract(&self, chain_id: u64, address: Address) -> Result<bool, ChainError> {
		let handle = self.handle(chain_id)?;
		let code = handle
			.provider
			.get_code_at(address)
			.await
			.map_err(|e| ChainError::Rpc {
				chain_id,
				message: e.to_string(),
			})?;
		Ok(!code.is_empty())
	}

	async fn router_liquidity(
		&self,
		chain_id: u64,
		router: Address,
		asset_id: Address,
	) -> Result<U256, ChainError> {
		let manager = self.handle(chain_id)?.transaction_manager;
		let data = ITransactionManager::routerBalancesCall {
			router,
			assetId: asset_id,
		}
		.abi_encode();
		let ret = self.eth_call(chain_id, manager, data).await?;
		U256::abi_decode(&ret, false).map_err(|e| ChainError::Rpc {
			chain_id,
			message: format!("bad routerBalances return: {}", e),
		})
	}

	async fn approve_if_needed(
		&self,
		chain_id: u64,
		asset_id: Address,
		owner: Address,
		amount: U256,
		infinite: bool,
	) -> Result<Option<TxRequest>, ChainError> {
		if asset_id == Address::ZERO {
			// Native assets need no allowance.
			return Ok(None);
		}
		let manager = self.handle(chain_id)?.transaction_manager;

		let data = IERC20::allowanceCall {
			owner,
			spender: manager,
		}
		.abi_encode();
		let ret = self.eth_call(chain_id, asset_id, data).await?;
		let allowance = U256::abi_decode(&ret, false).map_err(|e| ChainError::Rpc {
			chain_id,
			message: format!("bad allowance return: {}", e),
		})?;
		if allowance >= amount {
			return Ok(None);
		}

		let approve_amount = if infinite { U256::MAX } else { amount };
		let data = IERC20::approveCall {
			spender: manager,
			amount: approve_amount,
		}
		.abi_encode();
		Ok(Some(TxRequest {
			to: asset_id,
			data: data.into(),
			value: U256::ZERO,
			chain_id,
			gas_limit: None,
			gas_price: None,
			nonce: None,
		}))
	}

	async fn build_prepare_request(
		&self,
		chain_id: u64,
		params: &PrepareParams,
	) -> Result<TxRequest, ChainError> {
		let handle = self.handle(chain_id)?;
		let args = ITransactionManager::PrepareArgs {
			invariantData: (&params.tx_data).into(),
			amount: params.amount,
			expiry: U256::from(params.expiry),
			encryptedCallData: params.encrypted_call_data.clone(),
			encodedBid: params.encoded_bid.clone(),
			bidSignature: params.bid_signature.clone(),
			encodedMeta: Bytes::new(),
		};
		let value = if params.tx_data.sending_asset_id == Address::ZERO {
			params.amount
		} else {
			U256::ZERO
		};
		Ok(TxRequest {
			to: handle.transaction_manager,
			data: ITransactionManager::prepareCall { args }.abi_encode().into(),
			value,
			chain_id,
			gas_limit: None,
			gas_price: None,
			nonce: None,
		})
	}

	async fn build_fulfill_request(
		&self,
		chain_id: u64,
		params: &FulfillParams,
	) -> Result<TxRequest, ChainError> {
		let handle = self.handle(chain_id)?;
		let args = ITransactionManager::FulfillArgs {
			txData: (&params.tx_data).into(),
			relayerFee: params.relayer_fee,
			signature: params.signature.clone(),
			callData: params.call_data.clone(),
			encodedMeta: Bytes::new(),
		};
		Ok(TxRequest {
			to: handle.transaction_manager,
			data: ITransactionManager::fulfillCall { args }.abi_encode().into(),
			value: U256::ZERO,
			chain_id,
			gas_limit: None,
			gas_price: None,
			nonce: None,
		})
	}

	async fn build_cancel_request(
		&self,
		chain_id: u64,
		params: &CancelParams,
	) -> Result<TxRequest, ChainError> {
		let handle = self.handle(chain_id)?;
		let args = ITransactionManager::CancelArgs {
			txData: (&params.tx_data).into(),
			signature: params.signature.clone(),
			encodedMeta: Bytes::new(),
		};
		Ok(TxRequest {
			to: handle.transaction_manager,
			data: ITransactionManager::cancelCall { args }.abi_encode().into(),
			value: U256::ZERO,
			chain_id,
			gas_limit: None,
			gas_price: None,
			nonce: None,
		})
	}

	fn transaction_manager_address(&self, chain_id: u64) -> Result<Address, ChainError> {
		Ok(self.handle(chain_id)?.transaction_manager)
	}

	async fn latest_block(&self, chain_id: u64) -> Result<u64, ChainError> {
		let handle = self.handle(chain_id)?;
		handle
			.provider
			.get_block_number()
			.await
			.map_err(|e| ChainError::Rpc {
				chain_id,
				message: e.to_string(),
			})
	}

	async fn calculate_gas_in_token_for_fulfill(
		&self,
		chain_id: u64,
		receiving_asset_id: Address,
	) -> Result<U256, ChainError> {
		let handle = self.handle(chain_id)?;
		let oracle = handle
			.price_oracle
			.ok_or(ChainError::NoPriceOracle(chain_id))?;

		let gas_price = handle
			.provider
			.get_gas_price()
			.await
			.map_err(|e| ChainError::Rpc {
				chain_id,
				message: e.to_string(),
			})?;
		let gas_cost = U256::from(FULFILL_GAS_LIMIT) * U256::from(gas_price);

		if receiving_asset_id == Address::ZERO {
			return Ok(gas_cost);
		}

		// Oracle failures degrade to a zero estimate; callers treat zero
		// as "could not compute".
		let native_price = match self.token_price(chain_id, oracle, Address::ZERO).await {
			Some(price) => price,
			None => return Ok(U256::ZERO),
		};
		let token_price = match self.token_price(chain_id, oracle, receiving_asset_id).await {
			Some(price) if !price.is_zero() => price,
			_ => return Ok(U256::ZERO),
		};
		Ok(gas_cost * native_price / token_price)
	}
}
