//! Auction protocol client for the xbridge SDK.
//!
//! An auction solicits router bids over the message bus for a bounded
//! window, validates each bid against the cryptographic and on-chain
//! gates, and ranks the survivors. All in-flight auctions share one bus
//! subscription; a dispatcher routes responses to their auction by inbox,
//! so cancelling one auction never disturbs another.

use alloy_primitives::{Address, B256, U256};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::time::{timeout_at, Instant};
use xbridge_chain::ChainInterface;
use xbridge_messaging::{subjects, MessagingError, MessagingInterface};
use xbridge_types::{
	calculate_exchange_amount, current_timestamp, recover_bid_signer, with_0x_prefix,
	AuctionPayload, AuctionRequestMessage, AuctionResponse, AuctionResponseMessage,
	AUCTION_TIMEOUT,
};

/// Errors that can terminate an auction.
#[derive(Debug, Error)]
pub enum AuctionError {
	/// The collection window closed without any bid arriving.
	#[error("no bids received")]
	NoBids,
	/// Bids arrived but every one failed a validation gate. Carries one
	/// reason per rejected bid.
	#[error("no valid bids: {}", .0.join("; "))]
	NoValidBids(Vec<String>),
	/// Infrastructure failure outside the bid gates.
	#[error("auction failed: {0}")]
	Unknown(String),
	#[error(transparent)]
	Messaging(#[from] MessagingError),
}

/// How an auction selects its winner.
#[derive(Debug, Clone)]
pub enum AuctionPolicy {
	/// Accept the first non-error response without validation.
	DryRun,
	/// Wait up to twice the normal window for the first fully valid bid
	/// from one of these routers.
	PreferredRouters(Vec<Address>),
	/// Collect every bid in the window, validate all, rank survivors.
	Open,
}

/// One auction's terms: the broadcast payload plus the validation context
/// fixed at auction start.
#[derive(Debug, Clone)]
pub struct AuctionRequest {
	pub payload: AuctionPayload,
	/// Percent tolerance below the expected receiving amount a bid may
	/// fall.
	pub slippage_tolerance: Decimal,
	/// The receiving-amount estimate bids are measured against. Fixed per
	/// auction; never rescales with a candidate bid.
	pub expected_received: U256,
}

type InboxMap = HashMap<String, mpsc::UnboundedSender<AuctionResponseMessage>>;

/// Removes the auction's inbox on any exit path, including cancellation.
struct InboxGuard {
	inboxes: Arc<StdMutex<InboxMap>>,
	inbox: String,
}

impl Drop for InboxGuard {
	fn drop(&mut self) {
		self.inboxes
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.remove(&self.inbox);
	}
}

/// Client running bid auctions over the shared bus subscription.
pub struct AuctionClient {
	messaging: Arc<dyn MessagingInterface>,
	chain: Arc<dyn ChainInterface>,
	inboxes: Arc<StdMutex<InboxMap>>,
	dispatcher_started: Mutex<bool>,
}

impl AuctionClient {
	pub fn new(messaging: Arc<dyn MessagingInterface>, chain: Arc<dyn ChainInterface>) -> Self {
		Self {
			messaging,
			chain,
			inboxes: Arc::new(StdMutex::new(HashMap::new())),
			dispatcher_started: Mutex::new(false),
		}
	}

	/// Runs one auction to completion under the given policy.
	pub async fn run_auction(
		&self,
		request: AuctionRequest,
		policy: AuctionPolicy,
	) -> Result<AuctionResponse, AuctionError> {
		self.messaging.connect().await?;
		self.ensure_dispatcher().await?;

		let inbox_id = with_0x_prefix(&hex::encode(B256::random()));
		let (bid_tx, mut bid_rx) = mpsc::unbounded_channel();
		self.inboxes
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.insert(inbox_id.clone(), bid_tx);
		let _guard = InboxGuard {
			inboxes: self.inboxes.clone(),
			inbox: inbox_id.clone(),
		};

		let message = AuctionRequestMessage {
			inbox_id: inbox_id.clone(),
			payload: request.payload.clone(),
		};
		let payload =
			serde_json::to_value(&message).map_err(|e| AuctionError::Unknown(e.to_string()))?;
		self.messaging
			.publish(subjects::AUCTION_REQUEST, payload)
			.await?;
		tracing::info!(
			inbox = %inbox_id,
			transaction_id = %request.payload.transaction_id,
			"auction opened"
		);

		let window = match &policy {
			AuctionPolicy::PreferredRouters(_) => AUCTION_TIMEOUT * 2,
			_ => AUCTION_TIMEOUT,
		};
		let deadline = Instant::now() + window;

		match policy {
			AuctionPolicy::DryRun => self.first_response(&mut bid_rx, deadline).await,
			AuctionPolicy::Open => self.open_auction(&mut bid_rx, deadline, &request).await,
			AuctionPolicy::PreferredRouters(routers) => {
				self.preferred_auction(&mut bid_rx, deadline, &request, &routers)
					.await
			},
		}
	}

	/// Starts the shared response dispatcher on first use.
	async fn ensure_dispatcher(&self) -> Result<(), AuctionError> {
		let mut started = self.dispatcher_started.lock().await;
		if *started {
			return Ok(());
		}
		let mut rx = self.messaging.subscribe(subjects::AUCTION_RESPONSE).await?;
		let inboxes = self.inboxes.clone();
		tokio::spawn(async move {
			loop {
				match rx.recv().await {
					Ok(value) => {
						let msg: AuctionResponseMessage = match serde_json::from_value(value) {
							Ok(msg) => msg,
							Err(e) => {
								tracing::warn!(error = %e, "undecodable auction response");
								continue;
							},
						};
						let inboxes = inboxes.lock().unwrap_or_else(PoisonError::into_inner);
						match inboxes.get(&msg.inbox) {
							Some(sender) => {
								let _ = sender.send(msg);
							},
							None => {
								tracing::debug!(inbox = %msg.inbox, "late bid dropped");
							},
						}
					},
					Err(broadcast::error::RecvError::Lagged(missed)) => {
						tracing::warn!(missed, "auction dispatcher lagged");
					},
					Err(broadcast::error::RecvError::Closed) => break,
				}
			}
		});
		*started = true;
		Ok(())
	}

	/// Dry-run path: the first response carrying data wins.
	async fn first_response(
		&self,
		bid_rx: &mut mpsc::UnboundedReceiver<AuctionResponseMessage>,
		deadline: Instant,
	) -> Result<AuctionResponse, AuctionError> {
		loop {
			match timeout_at(deadline, bid_rx.recv()).await {
				Err(_) => return Err(AuctionError::NoBids),
				Ok(None) => {
					return Err(AuctionError::Unknown("auction channel closed".to_string()))
				},
				Ok(Some(msg)) => {
					if let Some(err) = &msg.err {
						tracing::warn!(error = %err, "router reported auction error");
						continue;
					}
					if let Some(data) = msg.data {
						return Ok(data);
					}
				},
			}
		}
	}

	/// Open path: collect the whole window, then validate in arrival
	/// order and rank.
	async fn open_auction(
		&self,
		bid_rx: &mut mpsc::UnboundedReceiver<AuctionResponseMessage>,
		deadline: Instant,
		request: &AuctionRequest,
	) -> Result<AuctionResponse, AuctionError> {
		let mut responses = Vec::new();
		loop {
			match timeout_at(deadline, bid_rx.recv()).await {
				Err(_) | Ok(None) => break,
				Ok(Some(msg)) => {
					if let Some(err) = &msg.err {
						tracing::warn!(error = %err, "router reported auction error");
						continue;
					}
					if let Some(data) = msg.data {
						responses.push(data);
					}
				},
			}
		}
		if responses.is_empty() {
			return Err(AuctionError::NoBids);
		}

		let mut survivors = Vec::new();
		let mut reasons = Vec::new();
		for response in responses {
			match self.validate_bid(&response, request).await {
				Ok(()) => survivors.push(response),
				Err(reason) => {
					tracing::warn!(router = %response.bid.router, %reason, "bid rejected");
					reasons.push(reason);
				},
			}
		}
		if survivors.is_empty() {
			return Err(AuctionError::NoValidBids(reasons));
		}

		// Stable sort: equal amounts keep arrival order.
		survivors.sort_by(|a, b| b.bid.amount_received.cmp(&a.bid.amount_received));
		Ok(survivors.remove(0))
	}

	/// Preferred path: the first fully valid bid from the set wins.
	async fn preferred_auction(
		&self,
		bid_rx: &mut mpsc::UnboundedReceiver<AuctionResponseMessage>,
		deadline: Instant,
		request: &AuctionRequest,
		routers: &[Address],
	) -> Result<AuctionResponse, AuctionError> {
		let mut reasons = Vec::new();
		let mut saw_bid = false;
		loop {
			match timeout_at(deadline, bid_rx.recv()).await {
				Err(_) | Ok(None) => break,
				Ok(Some(msg)) => {
					if let Some(err) = &msg.err {
						tracing::warn!(error = %err, "router reported auction error");
						continue;
					}
					let Some(data) = msg.data else { continue };
					saw_bid = true;
					if !routers.contains(&data.bid.router) {
						reasons.push(format!(
							"Router {} is not in the preferred set",
							data.bid.router
						));
						continue;
					}
					match self.validate_bid(&data, request).await {
						Ok(()) => return Ok(data),
						Err(reason) => {
							tracing::warn!(router = %data.bid.router, %reason, "bid rejected");
							reasons.push(reason);
						},
					}
				},
			}
		}
		if saw_bid {
			Err(AuctionError::NoValidBids(reasons))
		} else {
			Err(AuctionError::NoBids)
		}
	}

	/// All gates a bid must pass. Failures become reasons, never errors:
	/// they shrink the candidate set.
	async fn validate_bid(
		&self,
		response: &AuctionResponse,
		request: &AuctionRequest,
	) -> Result<(), String> {
		let bid = &response.bid;

		if bid.bid_expiry <= current_timestamp() {
			return Err("Bid expired".to_string());
		}

		match recover_bid_signer(bid, &response.bid_signature) {
			Ok(signer) if signer == bid.router => {},
			_ => return Err("Invalid router signature on bid".to_string()),
		}

		let liquidity = match self
			.chain
			.router_liquidity(bid.receiving_chain_id, bid.router, bid.receiving_asset_id)
			.await
		{
			Ok(liquidity) => liquidity,
			Err(e) => {
				tracing::warn!(router = %bid.router, error = %e, "liquidity read failed");
				return Err("Error getting router liquidity".to_string());
			},
		};
		if liquidity < bid.amount_received {
			return Err("Router's liquidity low".to_string());
		}

		let rate = Decimal::ONE - request.slippage_tolerance / Decimal::from(100);
		let amount_minus_gas = request
			.expected_received
			.saturating_sub(response.gas_fee_in_receiving_token);
		let lower_bound = calculate_exchange_amount(amount_minus_gas, rate);
		if bid.amount_received < lower_bound {
			return Err("Invalid bid price".to_string());
		}

		Ok(())
	}
}
