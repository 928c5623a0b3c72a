//! Client coordinator SDK for a hash/time-locked cross-chain transfer
//! protocol.
//!
//! [`TransferSdk`] drives one transfer from quote to completion: it runs
//! the router bid auction over the message bus, validates the winning bid
//! against on-chain state, produces ready-to-submit prepare / fulfill /
//! cancel requests, and surfaces indexer events while a transfer is in
//! flight. The SDK holds no signer and submits nothing; every write path
//! returns a [`TxRequest`] for the caller.
//!
//! A transfer moves through the statuses of
//! [`xbridge_types::TransferStatus`]: quoting and the auction happen
//! inside [`TransferSdk::get_transfer_quote`]; the prepared, fulfilled and
//! cancelled transitions are observed through the indexer and delivered on
//! the event surface.

/// Wallet-side callData encryption boundary.
pub mod encryption;
/// User-facing error taxonomy.
pub mod error;
/// Event subscription surface.
pub mod events;
/// Structural validation of call parameters.
pub mod validation;

pub use encryption::{Encrypter, EncryptionFailure};
pub use error::SdkError;
pub use events::{EventCallback, EventFilter, EventMux, WaitError};

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use std::collections::HashMap;
use std::sync::Arc;
use xbridge_auction::{AuctionClient, AuctionPolicy, AuctionRequest};
use xbridge_chain::{AlloyChainGate, ChainInterface};
use xbridge_config::{resolve_chains, Config, ResolvedChain};
use xbridge_messaging::{subjects, InMemoryMessaging, MessagingInterface};
use xbridge_subgraph::{EventBus, HttpSubgraph, SubgraphInterface, SubgraphPoller};
use xbridge_types::{
	current_timestamp, encode_auction_bid, get_receiver_amount, truncate_id, ActiveTransaction,
	AuctionPayload, AuctionResponse, CancelParams, CrosschainTransferParams, FulfillParams,
	HistoricalTransaction, InvariantTransactionData, MetaTxFulfillData, MetaTxRequestMessage,
	MetaTxType, PrepareParams, SubgraphEventKind, TransactionData, TransactionFulfilledEvent,
	TransactionPreparedEvent, TxRequest, DEFAULT_EXPIRY_BUFFER, META_TX_TIMEOUT,
};

/// Result of a fulfill: either the indexer's confirmation of a relayed
/// submission, or a direct request for the caller to submit.
#[derive(Debug)]
pub enum FulfillOutcome {
	Relayed(TransactionFulfilledEvent),
	Direct(TxRequest),
}

/// The transfer orchestrator.
pub struct TransferSdk {
	chains: HashMap<u64, ResolvedChain>,
	user: Address,
	chain: Arc<dyn ChainInterface>,
	subgraph: Arc<dyn SubgraphInterface>,
	messaging: Arc<dyn MessagingInterface>,
	auction: AuctionClient,
	events: EventMux,
	bus: EventBus,
	poller: Option<SubgraphPoller>,
	encrypter: Option<Arc<dyn Encrypter>>,
}

impl TransferSdk {
	/// Creates an SDK with the default component stack: Alloy providers,
	/// HTTP subgraphs, and an in-process bus suitable for local use.
	/// Production deployments inject their bus client through
	/// [`TransferSdk::with_components`].
	pub async fn new(config: Config, user: Address) -> Result<Self, SdkError> {
		let chains = resolve_chains(&config)?;
		let chain: Arc<dyn ChainInterface> = Arc::new(AlloyChainGate::new(&chains)?);
		let subgraph: Arc<dyn SubgraphInterface> =
			Arc::new(HttpSubgraph::new(&chains, chain.clone()));
		let messaging: Arc<dyn MessagingInterface> = Arc::new(InMemoryMessaging::new());
		Self::with_components(&config, user, chain, subgraph, messaging, None).await
	}

	/// Creates an SDK from injected components. The subgraph poller
	/// starts immediately unless the configuration skips polling.
	pub async fn with_components(
		config: &Config,
		user: Address,
		chain: Arc<dyn ChainInterface>,
		subgraph: Arc<dyn SubgraphInterface>,
		messaging: Arc<dyn MessagingInterface>,
		encrypter: Option<Arc<dyn Encrypter>>,
	) -> Result<Self, SdkError> {
		let chains = resolve_chains(config)?;
		let bus = EventBus::new(64);
		let events = EventMux::new(bus.clone());
		let auction = AuctionClient::new(messaging.clone(), chain.clone());

		let poller = (!config.skip_polling).then(|| {
			SubgraphPoller::new(subgraph.clone(), bus.clone(), user, config.poll_interval())
		});
		if let Some(poller) = &poller {
			poller.start().await;
		}

		Ok(Self {
			chains,
			user,
			chain,
			subgraph,
			messaging,
			auction,
			events,
			bus,
			poller,
			encrypter,
		})
	}

	/// The event subscription surface.
	pub fn events(&self) -> &EventMux {
		&self.events
	}

	/// The raw indexer event bus. Mostly useful to feed events in tests
	/// and custom indexer integrations.
	pub fn event_bus(&self) -> EventBus {
		self.bus.clone()
	}

	/// Establishes the bus session. Idempotent: repeated calls observe
	/// the same session.
	pub async fn connect_messaging(&self) -> Result<(), SdkError> {
		self.messaging.connect().await?;
		Ok(())
	}

	/// Stops the poller and removes every event registration.
	pub async fn shutdown(&self) {
		if let Some(poller) = &self.poller {
			poller.stop().await;
		}
		self.events.detach(None);
	}

	/// The receiving-amount estimate for a sending amount, after the
	/// router fee. The slippage gate measures bids against this value.
	pub fn get_estimated_receiver_amount(&self, amount: U256) -> U256 {
		get_receiver_amount(amount)
	}

	/// A router's free receiving-chain liquidity, for pre-checking a
	/// preferred router.
	pub async fn get_router_liquidity(
		&self,
		chain_id: u64,
		router: Address,
		asset_id: Address,
	) -> Result<U256, SdkError> {
		self.ensure_configured(chain_id)?;
		Ok(self.chain.router_liquidity(chain_id, router, asset_id).await?)
	}

	/// The user's in-flight transfers across all configured chains.
	pub async fn get_active_transactions(&self) -> Result<Vec<ActiveTransaction>, SdkError> {
		Ok(self.subgraph.active_transactions(self.user).await?)
	}

	/// The user's completed transfers across all configured chains.
	pub async fn get_historical_transactions(
		&self,
	) -> Result<Vec<HistoricalTransaction>, SdkError> {
		Ok(self.subgraph.historical_transactions(self.user).await?)
	}

	/// Runs the auction for a transfer and returns the winning bid.
	///
	/// Validation and configuration gates run before any I/O; the
	/// subgraph freshness gate runs before the auction opens so a stale
	/// read source can never validate a bid.
	pub async fn get_transfer_quote(
		&self,
		params: CrosschainTransferParams,
	) -> Result<AuctionResponse, SdkError> {
		validation::validate_transfer_params(&params)?;
		self.ensure_configured(params.sending_chain_id)?;
		self.ensure_configured(params.receiving_chain_id)?;
		self.ensure_synced(params.sending_chain_id, params.receiving_chain_id)
			.await?;

		let call_data = decode_call_data(params.call_data.as_deref())?;
		let call_data_hash = keccak256(&call_data);
		let encrypted_call_data = if call_data.is_empty() {
			Bytes::new()
		} else {
			let encrypter = self
				.encrypter
				.as_ref()
				.ok_or_else(|| SdkError::Encryption("no encrypter configured".to_string()))?;
			encrypter
				.encrypt(params.user, &call_data)
				.await
				.map_err(|e| SdkError::Encryption(e.to_string()))?
		};

		self.messaging.connect().await?;

		let transaction_id = params.transaction_id.unwrap_or_else(B256::random);
		let expiry = params
			.expiry
			.unwrap_or_else(|| current_timestamp() + DEFAULT_EXPIRY_BUFFER.as_secs());
		tracing::info!(
			transaction_id = %truncate_id(&transaction_id.to_string()),
			sending_chain_id = params.sending_chain_id,
			receiving_chain_id = params.receiving_chain_id,
			"transfer quoting"
		);

		let slippage_tolerance =
			validation::parse_slippage_tolerance(&params.slippage_tolerance)?;
		let request = AuctionRequest {
			payload: AuctionPayload {
				user: params.user,
				initiator: params.user,
				sending_chain_id: params.sending_chain_id,
				sending_asset_id: params.sending_asset_id,
				amount: params.amount,
				receiving_chain_id: params.receiving_chain_id,
				receiving_asset_id: params.receiving_asset_id,
				receiving_address: params.receiving_address,
				call_to: params.call_to.unwrap_or_default(),
				call_data_hash,
				encrypted_call_data,
				expiry,
				transaction_id,
				dry_run: params.dry_run,
			},
			slippage_tolerance,
			expected_received: get_receiver_amount(params.amount),
		};
		let policy = if params.dry_run {
			AuctionPolicy::DryRun
		} else if !params.preferred_routers.is_empty() {
			AuctionPolicy::PreferredRouters(params.preferred_routers.clone())
		} else {
			AuctionPolicy::Open
		};

		let response = self.auction.run_auction(request, policy).await?;
		tracing::info!(
			transaction_id = %truncate_id(&transaction_id.to_string()),
			router = %response.bid.router,
			amount_received = %response.bid.amount_received,
			"transfer quoted"
		);
		Ok(response)
	}

	/// Returns an approval request when the sending-chain allowance is
	/// short of the bid amount; `None` for native assets or a sufficient
	/// allowance.
	pub async fn approve_for_prepare(
		&self,
		response: &AuctionResponse,
		infinite: bool,
	) -> Result<Option<TxRequest>, SdkError> {
		let bid = &response.bid;
		self.ensure_configured(bid.sending_chain_id)?;
		Ok(self
			.chain
			.approve_if_needed(
				bid.sending_chain_id,
				bid.sending_asset_id,
				self.user,
				bid.amount,
				infinite,
			)
			.await?)
	}

	/// Builds the sending-chain prepare call for a won auction.
	pub async fn prepare_transfer(
		&self,
		response: &AuctionResponse,
	) -> Result<TxRequest, SdkError> {
		let bid = &response.bid;
		validation::validate_auction_bid(bid)?;
		self.ensure_configured(bid.sending_chain_id)?;
		self.ensure_configured(bid.receiving_chain_id)?;
		self.ensure_synced(bid.sending_chain_id, bid.receiving_chain_id)
			.await?;

		if response.bid_signature.is_empty() {
			return Err(SdkError::InvalidBidSignature);
		}

		if bid.call_to != Address::ZERO {
			let is_contract = self
				.chain
				.is_contract(bid.receiving_chain_id, bid.call_to)
				.await?;
			if !is_contract {
				return Err(SdkError::InvalidCallTo(bid.call_to));
			}
		}

		let tx_data = InvariantTransactionData {
			receiving_chain_tx_manager_address: self
				.chain
				.transaction_manager_address(bid.receiving_chain_id)?,
			user: bid.user,
			router: bid.router,
			initiator: bid.initiator,
			sending_asset_id: bid.sending_asset_id,
			receiving_asset_id: bid.receiving_asset_id,
			// Cancellation always refunds the user.
			sending_chain_fallback: bid.user,
			call_to: bid.call_to,
			receiving_address: bid.receiving_address,
			sending_chain_id: bid.sending_chain_id,
			receiving_chain_id: bid.receiving_chain_id,
			call_data_hash: bid.call_data_hash,
			transaction_id: bid.transaction_id,
		};
		let params = PrepareParams {
			tx_data,
			amount: bid.amount,
			expiry: bid.expiry,
			encrypted_call_data: bid.encrypted_call_data.clone(),
			bid_signature: response.bid_signature.clone(),
			encoded_bid: encode_auction_bid(bid).into(),
		};

		let request = self
			.chain
			.build_prepare_request(bid.sending_chain_id, &params)
			.await?;
		tracing::info!(
			transaction_id = %truncate_id(&bid.transaction_id.to_string()),
			"sender prepare request built"
		);
		Ok(request)
	}

	/// Completes a transfer against a receiving-chain prepared event.
	///
	/// With `use_relayers`, publishes a meta-transaction request and
	/// resolves with the indexer's fulfilled event; the wait is
	/// registered before the publish so the confirmation cannot be
	/// missed. Without relayers, returns a direct fulfill request.
	pub async fn fulfill_transfer(
		&self,
		event: &TransactionPreparedEvent,
		fulfill_signature: Bytes,
		decrypted_call_data: Bytes,
		relayer_fee: U256,
		use_relayers: bool,
	) -> Result<FulfillOutcome, SdkError> {
		validation::validate_prepared_event(event)?;
		let tx_data = &event.tx_data;
		let receiving_chain_id = tx_data.invariant.receiving_chain_id;
		self.ensure_configured(receiving_chain_id)?;

		if !use_relayers {
			let params = FulfillParams {
				tx_data: tx_data.clone(),
				relayer_fee,
				signature: fulfill_signature,
				call_data: decrypted_call_data,
			};
			let request = self
				.chain
				.build_fulfill_request(receiving_chain_id, &params)
				.await?;
			return Ok(FulfillOutcome::Direct(request));
		}

		let transaction_id = tx_data.invariant.transaction_id;
		let waiter = self.events.wait_for(
			SubgraphEventKind::ReceiverTransactionFulfilled,
			META_TX_TIMEOUT,
			Some(Box::new(move |e| e.transaction_id() == transaction_id)),
		);

		let message = MetaTxRequestMessage {
			transaction_type: MetaTxType::Fulfill,
			relayer_fee,
			to: self.chain.transaction_manager_address(receiving_chain_id)?,
			chain_id: receiving_chain_id,
			data: MetaTxFulfillData {
				tx_data: tx_data.clone(),
				signature: fulfill_signature,
				call_data: decrypted_call_data,
				relayer_fee,
			},
		};
		self.messaging.connect().await?;
		self.messaging
			.publish(subjects::METATX_REQUEST, serde_json::to_value(&message)?)
			.await?;
		tracing::info!(
			transaction_id = %truncate_id(&transaction_id.to_string()),
			"relayed fulfill requested"
		);

		match waiter.await {
			Ok(xbridge_types::SubgraphEvent::ReceiverTransactionFulfilled(fulfilled)) => {
				Ok(FulfillOutcome::Relayed(fulfilled))
			},
			Ok(_) | Err(WaitError::Timeout) => Err(SdkError::MetaTxTimeout),
		}
	}

	/// Builds a cancel call for the given chain.
	pub async fn cancel(
		&self,
		params: CancelParams,
		chain_id: u64,
	) -> Result<TxRequest, SdkError> {
		validation::validate_cancel_params(&params)?;
		self.ensure_configured(chain_id)?;
		Ok(self.chain.build_cancel_request(chain_id, &params).await?)
	}

	/// Estimates the relayer fee for fulfilling a transfer, denominated
	/// in the receiving asset.
	pub async fn estimate_fulfill_fee(&self, tx_data: &TransactionData) -> Result<U256, SdkError> {
		let chain_id = tx_data.invariant.receiving_chain_id;
		self.ensure_configured(chain_id)?;
		let fee = self
			.chain
			.calculate_gas_in_token_for_fulfill(chain_id, tx_data.invariant.receiving_asset_id)
			.await?;
		if fee.is_zero() {
			return Err(SdkError::invalid_params(
				"relayerFee",
				"fulfill gas fee could not be computed",
			));
		}
		Ok(fee)
	}

	fn ensure_configured(&self, chain_id: u64) -> Result<(), SdkError> {
		if self.chains.contains_key(&chain_id) {
			Ok(())
		} else {
			Err(SdkError::ChainNotConfigured(chain_id))
		}
	}

	async fn ensure_synced(&self, sending: u64, receiving: u64) -> Result<(), SdkError> {
		let mut unsynced = Vec::new();
		for chain_id in [sending, receiving] {
			if !self.subgraph.sync_status(chain_id).await.synced {
				unsynced.push(chain_id);
			}
		}
		if unsynced.is_empty() {
			Ok(())
		} else {
			Err(SdkError::SubgraphsNotSynced(unsynced))
		}
	}
}

fn decode_call_data(call_data: Option<&str>) -> Result<Bytes, SdkError> {
	match call_data {
		None => Ok(Bytes::new()),
		Some(data) => {
			let stripped = data
				.strip_prefix("0x")
				.ok_or_else(|| SdkError::invalid_params("callData", "missing 0x prefix"))?;
			hex::decode(stripped)
				.map(Bytes::from)
				.map_err(|_| SdkError::invalid_params("callData", "not valid hex"))
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;
	use alloy_signer::SignerSync;
	use alloy_signer_local::PrivateKeySigner;
	use async_trait::async_trait;
	use std::sync::Mutex as StdMutex;
	use std::time::Duration;
	use tokio::time::Instant;
	use xbridge_chain::ChainError;
	use xbridge_config::ChainConfig;
	use xbridge_subgraph::{SubgraphError, SubgraphTransaction};
	use xbridge_types::{
		hash_auction_bid, recover_bid_signer, AuctionBid, AuctionRequestMessage,
		AuctionResponseMessage, SubgraphEvent, SubgraphSyncRecord,
	};

	const USER: Address = address!("2222222222222222222222222222222222222222");
	const MANAGER: Address = address!("1111111111111111111111111111111111111111");
	const CALL_TARGET: Address = address!("5555555555555555555555555555555555555555");

	struct FakeChain {
		liquidity: U256,
		contracts: Vec<Address>,
		fulfill_fee: U256,
		last_prepare: StdMutex<Option<PrepareParams>>,
	}

	impl FakeChain {
		fn healthy() -> Self {
			Self {
				liquidity: U256::from(u64::MAX),
				contracts: vec![CALL_TARGET],
				fulfill_fee: U256::from(7u64),
				last_prepare: StdMutex::new(None),
			}
		}

		fn request(&self, chain_id: u64, data: Bytes) -> TxRequest {
			TxRequest {
				to: MANAGER,
				data,
				value: U256::ZERO,
				chain_id,
				gas_limit: None,
				gas_price: None,
				nonce: None,
			}
		}
	}

	#[async_trait]
	impl ChainInterface for FakeChain {
		async fn is_contract(&self, _: u64, address: Address) -> Result<bool, ChainError> {
			Ok(self.contracts.contains(&address))
		}

		async fn router_liquidity(
			&self,
			_: u64,
			_: Address,
			_: Address,
		) -> Result<U256, ChainError> {
			Ok(self.liquidity)
		}

		async fn approve_if_needed(
			&self,
			chain_id: u64,
			asset_id: Address,
			_: Address,
			_: U256,
			_: bool,
		) -> Result<Option<TxRequest>, ChainError> {
			if asset_id == Address::ZERO {
				Ok(None)
			} else {
				Ok(Some(self.request(chain_id, Bytes::new())))
			}
		}

		async fn build_prepare_request(
			&self,
			chain_id: u64,
			params: &PrepareParams,
		) -> Result<TxRequest, ChainError> {
			*self.last_prepare.lock().unwrap() = Some(params.clone());
			Ok(self.request(chain_id, params.encoded_bid.clone()))
		}

		async fn build_fulfill_request(
			&self,
			chain_id: u64,
			params: &FulfillParams,
		) -> Result<TxRequest, ChainError> {
			Ok(self.request(chain_id, params.signature.clone()))
		}

		async fn build_cancel_request(
			&self,
			chain_id: u64,
			params: &CancelParams,
		) -> Result<TxRequest, ChainError> {
			Ok(self.request(chain_id, params.signature.clone()))
		}

		fn transaction_manager_address(&self, _: u64) -> Result<Address, ChainError> {
			Ok(MANAGER)
		}

		async fn latest_block(&self, _: u64) -> Result<u64, ChainError> {
			Ok(100)
		}

		async fn calculate_gas_in_token_for_fulfill(
			&self,
			_: u64,
			_: Address,
		) -> Result<U256, ChainError> {
			Ok(self.fulfill_fee)
		}
	}

	struct FakeSubgraph {
		synced: bool,
	}

	#[async_trait]
	impl SubgraphInterface for FakeSubgraph {
		async fn sync_status(&self, _: u64) -> SubgraphSyncRecord {
			if self.synced {
				SubgraphSyncRecord::from_blocks(100, 100, 50)
			} else {
				SubgraphSyncRecord::default()
			}
		}

		async fn user_transactions(
			&self,
			_: Address,
		) -> Result<Vec<SubgraphTransaction>, SubgraphError> {
			Ok(vec![])
		}
	}

	fn config() -> Config {
		let mut config = Config {
			skip_polling: true,
			..Default::default()
		};
		for chain_id in [1337u64, 1338] {
			config.chains.insert(
				chain_id,
				ChainConfig {
					rpc_urls: vec!["http://localhost:8545".to_string()],
					transaction_manager_address: Some(MANAGER),
					subgraph_urls: vec!["http://localhost:8000".to_string()],
					..Default::default()
				},
			);
		}
		config
	}

	struct TestHarness {
		sdk: TransferSdk,
		messaging: Arc<InMemoryMessaging>,
		chain: Arc<FakeChain>,
	}

	async fn harness_with(chain: FakeChain, synced: bool) -> TestHarness {
		harness_full(chain, synced, None).await
	}

	async fn harness_full(
		chain: FakeChain,
		synced: bool,
		encrypter: Option<Arc<dyn Encrypter>>,
	) -> TestHarness {
		let messaging = Arc::new(InMemoryMessaging::new());
		let chain = Arc::new(chain);
		let sdk = TransferSdk::with_components(
			&config(),
			USER,
			chain.clone(),
			Arc::new(FakeSubgraph { synced }),
			messaging.clone(),
			encrypter,
		)
		.await
		.unwrap();
		TestHarness {
			sdk,
			messaging,
			chain,
		}
	}

	fn transfer_params() -> CrosschainTransferParams {
		CrosschainTransferParams {
			user: USER,
			sending_chain_id: 1337,
			sending_asset_id: Address::ZERO,
			receiving_chain_id: 1338,
			receiving_asset_id: Address::ZERO,
			amount: U256::from(1_000_000u64),
			receiving_address: address!("4444444444444444444444444444444444444444"),
			slippage_tolerance: "0.10".to_string(),
			expiry: None,
			transaction_id: None,
			call_to: None,
			call_data: None,
			preferred_routers: vec![],
			dry_run: false,
		}
	}

	/// Answers auction requests with one signed bid per signer, echoing
	/// the request payload's terms.
	async fn spawn_routers(
		messaging: Arc<InMemoryMessaging>,
		routers: Vec<(PrivateKeySigner, u64)>,
	) {
		messaging.connect().await.unwrap();
		let mut requests = messaging
			.subscribe(subjects::AUCTION_REQUEST)
			.await
			.unwrap();
		tokio::spawn(async move {
			while let Ok(value) = requests.recv().await {
				let request: AuctionRequestMessage = serde_json::from_value(value).unwrap();
				let payload = &request.payload;
				for (signer, amount_received) in &routers {
					let bid = AuctionBid {
						user: payload.user,
						router: signer.address(),
						initiator: payload.initiator,
						sending_chain_id: payload.sending_chain_id,
						sending_asset_id: payload.sending_asset_id,
						amount: payload.amount,
						receiving_chain_id: payload.receiving_chain_id,
						receiving_asset_id: payload.receiving_asset_id,
						amount_received: U256::from(*amount_received),
						receiving_address: payload.receiving_address,
						transaction_id: payload.transaction_id,
						expiry: payload.expiry,
						call_data_hash: payload.call_data_hash,
						call_to: payload.call_to,
						encrypted_call_data: payload.encrypted_call_data.clone(),
						bid_expiry: current_timestamp() + 300,
					};
					let signature = signer.sign_hash_sync(&hash_auction_bid(&bid)).unwrap();
					let msg = AuctionResponseMessage {
						inbox: request.inbox_id.clone(),
						data: Some(AuctionResponse {
							bid,
							bid_signature: signature.as_bytes().to_vec().into(),
							gas_fee_in_receiving_token: U256::ZERO,
						}),
						err: None,
					};
					messaging
						.publish(
							subjects::AUCTION_RESPONSE,
							serde_json::to_value(&msg).unwrap(),
						)
						.await
						.unwrap();
				}
			}
		});
	}

	fn prepared_event(transaction_id: B256) -> TransactionPreparedEvent {
		TransactionPreparedEvent {
			tx_data: TransactionData {
				invariant: InvariantTransactionData {
					receiving_chain_tx_manager_address: MANAGER,
					user: USER,
					router: address!("3333333333333333333333333333333333333333"),
					initiator: USER,
					sending_asset_id: Address::ZERO,
					receiving_asset_id: Address::ZERO,
					sending_chain_fallback: USER,
					call_to: Address::ZERO,
					receiving_address: address!("4444444444444444444444444444444444444444"),
					sending_chain_id: 1337,
					receiving_chain_id: 1338,
					call_data_hash: keccak256([]),
					transaction_id,
				},
				amount: U256::from(999_500u64),
				expiry: current_timestamp() + 24 * 60 * 60,
				prepared_block_number: 42,
			},
			caller: address!("3333333333333333333333333333333333333333"),
			encrypted_call_data: Bytes::new(),
			encoded_bid: Bytes::new(),
			bid_signature: Bytes::from(vec![1u8; 65]),
		}
	}

	#[tokio::test(start_paused = true)]
	async fn test_quote_returns_highest_bid_with_valid_signature() {
		let harness = harness_with(FakeChain::healthy(), true).await;
		let low = PrivateKeySigner::random();
		let high = PrivateKeySigner::random();
		spawn_routers(
			harness.messaging.clone(),
			vec![(low, 999_400), (high.clone(), 999_500)],
		)
		.await;

		let response = harness
			.sdk
			.get_transfer_quote(transfer_params())
			.await
			.unwrap();
		assert_eq!(response.bid.amount_received, U256::from(999_500u64));
		assert_eq!(response.bid.router, high.address());

		// The winning bid's signature recovers to its router.
		let signer = recover_bid_signer(&response.bid, &response.bid_signature).unwrap();
		assert_eq!(signer, response.bid.router);
	}

	#[tokio::test(start_paused = true)]
	async fn test_prepare_builds_invariant_data_from_bid() {
		let harness = harness_with(FakeChain::healthy(), true).await;
		let router = PrivateKeySigner::random();
		spawn_routers(harness.messaging.clone(), vec![(router, 999_500)]).await;

		let response = harness
			.sdk
			.get_transfer_quote(transfer_params())
			.await
			.unwrap();
		let request = harness.sdk.prepare_transfer(&response).await.unwrap();
		assert_eq!(request.to, MANAGER);
		assert_eq!(request.chain_id, 1337);

		let params = harness.chain.last_prepare.lock().unwrap().clone().unwrap();
		// The fallback always refunds the user, and the callData hash
		// commits to the (empty) callData.
		assert_eq!(params.tx_data.sending_chain_fallback, USER);
		assert_eq!(params.tx_data.user, USER);
		assert_eq!(params.tx_data.call_data_hash, keccak256([]));
		assert_eq!(
			params.tx_data.receiving_chain_tx_manager_address,
			MANAGER
		);
		assert_eq!(params.amount, response.bid.amount);
		assert_eq!(
			params.encoded_bid,
			Bytes::from(encode_auction_bid(&response.bid))
		);
	}

	#[tokio::test]
	async fn test_quote_rejects_unconfigured_chain() {
		let harness = harness_with(FakeChain::healthy(), true).await;
		let mut params = transfer_params();
		params.receiving_chain_id = 9999;

		let result = harness.sdk.get_transfer_quote(params).await;
		assert!(matches!(result, Err(SdkError::ChainNotConfigured(9999))));
	}

	#[tokio::test]
	async fn test_quote_rejects_stale_subgraphs() {
		let harness = harness_with(FakeChain::healthy(), false).await;

		let result = harness.sdk.get_transfer_quote(transfer_params()).await;
		match result {
			Err(SdkError::SubgraphsNotSynced(chains)) => {
				assert_eq!(chains, vec![1337, 1338]);
			},
			other => panic!("expected SubgraphsNotSynced, got {:?}", other),
		}
	}

	#[tokio::test]
	async fn test_quote_with_call_data_needs_encrypter() {
		let harness = harness_with(FakeChain::healthy(), true).await;
		let mut params = transfer_params();
		params.call_to = Some(CALL_TARGET);
		params.call_data = Some("0xdeadbeef".to_string());

		let result = harness.sdk.get_transfer_quote(params).await;
		assert!(matches!(result, Err(SdkError::Encryption(_))));
	}

	struct FixedEncrypter;

	#[async_trait]
	impl Encrypter for FixedEncrypter {
		async fn encrypt(
			&self,
			_: Address,
			_: &Bytes,
		) -> Result<Bytes, EncryptionFailure> {
			Ok(Bytes::from(vec![0xaa; 8]))
		}
	}

	#[tokio::test(start_paused = true)]
	async fn test_quote_encrypts_call_data() {
		let harness =
			harness_full(FakeChain::healthy(), true, Some(Arc::new(FixedEncrypter))).await;
		let router = PrivateKeySigner::random();
		spawn_routers(harness.messaging.clone(), vec![(router, 999_500)]).await;

		let mut params = transfer_params();
		params.call_to = Some(CALL_TARGET);
		params.call_data = Some("0xdeadbeef".to_string());

		let response = harness.sdk.get_transfer_quote(params).await.unwrap();
		// The routers saw (and echoed) the encrypted payload, never the
		// plaintext.
		assert_eq!(
			response.bid.encrypted_call_data,
			Bytes::from(vec![0xaa; 8])
		);
		assert_eq!(
			response.bid.call_data_hash,
			keccak256(hex::decode("deadbeef").unwrap())
		);
	}

	#[tokio::test(start_paused = true)]
	async fn test_prepare_rejects_missing_bid_signature() {
		let harness = harness_with(FakeChain::healthy(), true).await;
		let router = PrivateKeySigner::random();
		spawn_routers(harness.messaging.clone(), vec![(router, 999_500)]).await;

		let mut response = harness
			.sdk
			.get_transfer_quote(transfer_params())
			.await
			.unwrap();
		response.bid_signature = Bytes::new();

		let result = harness.sdk.prepare_transfer(&response).await;
		assert!(matches!(result, Err(SdkError::InvalidBidSignature)));
	}

	#[tokio::test(start_paused = true)]
	async fn test_prepare_rejects_non_contract_call_to() {
		// No contract lives at the callTo address in this fake chain.
		let chain = FakeChain {
			contracts: vec![],
			..FakeChain::healthy()
		};
		let harness = harness_with(chain, true).await;
		let router = PrivateKeySigner::random();
		spawn_routers(harness.messaging.clone(), vec![(router, 999_500)]).await;

		let mut params = transfer_params();
		params.call_to = Some(CALL_TARGET);
		// No callData: the hash stays the empty hash, only callTo is set.
		let mut response = harness.sdk.get_transfer_quote(params).await.unwrap();
		assert_eq!(response.bid.call_to, CALL_TARGET);

		let result = harness.sdk.prepare_transfer(&response).await;
		match result {
			Err(SdkError::InvalidCallTo(addr)) => assert_eq!(addr, CALL_TARGET),
			other => panic!("expected InvalidCallTo, got {:?}", other),
		}

		// The same response with callTo zeroed would pass the gate, so
		// the rejection is attributable to the code check alone.
		response.bid.call_to = Address::ZERO;
		let signer = PrivateKeySigner::random();
		response.bid.router = signer.address();
		let signature = signer
			.sign_hash_sync(&hash_auction_bid(&response.bid))
			.unwrap();
		response.bid_signature = signature.as_bytes().to_vec().into();
		assert!(harness.sdk.prepare_transfer(&response).await.is_ok());
	}

	#[tokio::test]
	async fn test_fulfill_direct_builds_request() {
		let harness = harness_with(FakeChain::healthy(), true).await;
		let event = prepared_event(B256::repeat_byte(5));

		let outcome = harness
			.sdk
			.fulfill_transfer(
				&event,
				Bytes::from(vec![9u8; 65]),
				Bytes::new(),
				U256::ZERO,
				false,
			)
			.await
			.unwrap();
		match outcome {
			FulfillOutcome::Direct(request) => {
				assert_eq!(request.chain_id, 1338);
				assert_eq!(request.to, MANAGER);
			},
			other => panic!("expected direct fulfill, got {:?}", other),
		}
	}

	#[tokio::test(start_paused = true)]
	async fn test_fulfill_relayed_times_out() {
		let harness = harness_with(FakeChain::healthy(), true).await;
		let event = prepared_event(B256::repeat_byte(5));

		let started = Instant::now();
		let result = harness
			.sdk
			.fulfill_transfer(
				&event,
				Bytes::from(vec![9u8; 65]),
				Bytes::new(),
				U256::ZERO,
				true,
			)
			.await;
		assert!(matches!(result, Err(SdkError::MetaTxTimeout)));
		assert!(started.elapsed() >= META_TX_TIMEOUT);
		assert!(started.elapsed() < META_TX_TIMEOUT + Duration::from_millis(200));
	}

	#[tokio::test(start_paused = true)]
	async fn test_fulfill_relayed_resolves_on_indexer_event() {
		let harness = harness_with(FakeChain::healthy(), true).await;
		let transaction_id = B256::repeat_byte(5);
		let event = prepared_event(transaction_id);

		// A relayer that submits on-chain, observed via the indexer: it
		// reacts to the meta-tx request by feeding the fulfilled event.
		harness.messaging.connect().await.unwrap();
		let mut meta_rx = harness
			.messaging
			.subscribe(subjects::METATX_REQUEST)
			.await
			.unwrap();
		let bus = harness.sdk.event_bus();
		let fulfilled_tx = event.tx_data.clone();
		tokio::spawn(async move {
			let value = meta_rx.recv().await.unwrap();
			let request: MetaTxRequestMessage = serde_json::from_value(value).unwrap();
			bus.publish(SubgraphEvent::ReceiverTransactionFulfilled(
				TransactionFulfilledEvent {
					tx_data: fulfilled_tx,
					signature: request.data.signature,
					relayer_fee: request.relayer_fee,
					call_data: request.data.call_data,
					caller: address!("6666666666666666666666666666666666666666"),
					transaction_hash: B256::repeat_byte(0xcc),
				},
			));
		});

		let outcome = harness
			.sdk
			.fulfill_transfer(
				&event,
				Bytes::from(vec![9u8; 65]),
				Bytes::new(),
				U256::from(10u64),
				true,
			)
			.await
			.unwrap();
		match outcome {
			FulfillOutcome::Relayed(fulfilled) => {
				assert_eq!(fulfilled.tx_data.invariant.transaction_id, transaction_id);
				assert_eq!(fulfilled.relayer_fee, U256::from(10u64));
			},
			other => panic!("expected relayed fulfill, got {:?}", other),
		}
	}

	#[tokio::test]
	async fn test_cancel_builds_request() {
		let harness = harness_with(FakeChain::healthy(), true).await;
		let event = prepared_event(B256::repeat_byte(5));
		let params = CancelParams {
			tx_data: event.tx_data,
			signature: Bytes::new(),
		};

		let request = harness.sdk.cancel(params, 1337).await.unwrap();
		assert_eq!(request.chain_id, 1337);
	}

	#[tokio::test]
	async fn test_estimate_fulfill_fee_zero_is_an_error() {
		let chain = FakeChain {
			fulfill_fee: U256::ZERO,
			..FakeChain::healthy()
		};
		let harness = harness_with(chain, true).await;
		let event = prepared_event(B256::repeat_byte(5));

		let result = harness.sdk.estimate_fulfill_fee(&event.tx_data).await;
		assert!(matches!(
			result,
			Err(SdkError::InvalidParamStructure { .. })
		));
	}

	#[tokio::test]
	async fn test_estimate_fulfill_fee_passes_through() {
		let harness = harness_with(FakeChain::healthy(), true).await;
		let event = prepared_event(B256::repeat_byte(5));

		let fee = harness
			.sdk
			.estimate_fulfill_fee(&event.tx_data)
			.await
			.unwrap();
		assert_eq!(fee, U256::from(7u64));
	}

	#[tokio::test]
	async fn test_connect_messaging_is_idempotent() {
		let harness = harness_with(FakeChain::healthy(), true).await;

		harness.sdk.connect_messaging().await.unwrap();
		let session = harness.messaging.session();
		harness.sdk.connect_messaging().await.unwrap();
		assert_eq!(harness.messaging.session(), session);
	}

	#[tokio::test(start_paused = true)]
	async fn test_approve_for_prepare_native_is_none() {
		let harness = harness_with(FakeChain::healthy(), true).await;
		let router = PrivateKeySigner::random();
		spawn_routers(harness.messaging.clone(), vec![(router, 999_500)]).await;

		let response = harness
			.sdk
			.get_transfer_quote(transfer_params())
			.await
			.unwrap();
		let approval = harness
			.sdk
			.approve_for_prepare(&response, false)
			.await
			.unwrap();
		assert!(approval.is_none());
	}
}
