//! Protocol constants.

use std::time::Duration;

/// How long an open auction collects bids.
pub const AUCTION_TIMEOUT: Duration = Duration::from_secs(6);

/// How long a relayed fulfill waits for the indexer to confirm.
pub const META_TX_TIMEOUT: Duration = Duration::from_secs(300);

/// Inclusive slippage tolerance bounds, decimal percent strings.
pub const MIN_SLIPPAGE_TOLERANCE: &str = "0.01";
pub const MAX_SLIPPAGE_TOLERANCE: &str = "15.00";
pub const DEFAULT_SLIPPAGE_TOLERANCE: &str = "0.10";

/// Sending-chain expiry window relative to quote time. The lower bound
/// leaves the router a full cancellation window plus a dispute margin.
pub const MIN_EXPIRY_BUFFER: Duration = Duration::from_secs(49 * 60 * 60);
pub const MAX_EXPIRY_BUFFER: Duration = Duration::from_secs(96 * 60 * 60);
pub const DEFAULT_EXPIRY_BUFFER: Duration = Duration::from_secs(72 * 60 * 60);

/// Router fee retained from the sending amount, in basis points.
pub const ROUTER_FEE_BPS: u64 = 5;

/// Blocks a subgraph may lag the chain head before it is treated as stale.
pub const DEFAULT_SUBGRAPH_SYNC_BUFFER: u64 = 50;

/// Interval between subgraph status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Gas units assumed for a receiving-chain fulfill when estimating the
/// relayer fee.
pub const FULFILL_GAS_LIMIT: u64 = 120_000;
