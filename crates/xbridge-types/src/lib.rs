//! Common types module for the xbridge transfer SDK.
//!
//! This module defines the core data types and structures shared by every
//! SDK component: the transfer data model covered by router bid signatures,
//! the auction and meta-transaction bus payloads, the subgraph record types,
//! and the canonical bid encoding used for signature recovery.

/// Indexer-driven event types consumed by the SDK event surface.
pub mod events;
/// Message-bus payload types for auction and meta-transaction traffic.
pub mod messaging;
/// Subgraph record types: sync status and transfer enumeration.
pub mod subgraph;
/// Core transfer data model: invariant data, bids, and request params.
pub mod transfer;
/// Utility functions: encoding, formatting, amount math, timestamps.
pub mod utils;

pub use events::{
	SubgraphEvent, SubgraphEventKind, TransactionCancelledEvent, TransactionFulfilledEvent,
	TransactionPreparedEvent,
};
pub use messaging::{
	AuctionPayload, AuctionRequestMessage, AuctionResponseMessage, MetaTxFulfillData,
	MetaTxRequestMessage, MetaTxType,
};
pub use subgraph::{
	ActiveTransaction, CrosschainTransaction, HistoricalTransaction, SubgraphSyncRecord,
};
pub use transfer::{
	AuctionBid, AuctionResponse, CancelParams, CrosschainTransferParams, FulfillParams,
	InvariantTransactionData, PrepareParams, TransactionData, TransferStatus, TxRequest,
	VariantTransactionData,
};
pub use utils::{
	calculate_exchange_amount, current_timestamp, decode_auction_bid, encode_auction_bid,
	fulfill_hash_to_sign, get_receiver_amount, hash_auction_bid, recover_bid_signer,
	recover_fulfill_signer, truncate_id, with_0x_prefix, without_0x_prefix, EncodingError,
	AUCTION_TIMEOUT, DEFAULT_EXPIRY_BUFFER, DEFAULT_POLL_INTERVAL, DEFAULT_SLIPPAGE_TOLERANCE,
	DEFAULT_SUBGRAPH_SYNC_BUFFER, FULFILL_GAS_LIMIT, MAX_EXPIRY_BUFFER, MAX_SLIPPAGE_TOLERANCE,
	META_TX_TIMEOUT, MIN_EXPIRY_BUFFER, MIN_SLIPPAGE_TOLERANCE, ROUTER_FEE_BPS,
};
