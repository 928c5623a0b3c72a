//! GraphQL-over-HTTP subgraph reader.
//!
//! One reader serves every configured chain. Endpoints are tried in
//! configuration order; a chain whose endpoints all fail is skipped for
//! enumeration (with a warning) and reports unsynced.

use crate::queries::{
	GqlTransaction, SyncStatusData, TransactionsData, SYNC_STATUS_QUERY, USER_TRANSACTIONS_QUERY,
};
use crate::{SubgraphError, SubgraphInterface, SubgraphTransaction};
use alloy_primitives::Address;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use xbridge_chain::ChainInterface;
use xbridge_config::ResolvedChain;
use xbridge_types::SubgraphSyncRecord;

#[derive(Debug, Deserialize)]
struct GqlError {
	message: String,
}

#[derive(Debug, Deserialize)]
struct GqlEnvelope<T> {
	data: Option<T>,
	#[serde(default)]
	errors: Vec<GqlError>,
}

struct SubgraphEndpoints {
	urls: Vec<String>,
	sync_buffer: u64,
}

/// Subgraph reader over HTTP GraphQL endpoints.
pub struct HttpSubgraph {
	client: reqwest::Client,
	chains: HashMap<u64, SubgraphEndpoints>,
	chain_gate: Arc<dyn ChainInterface>,
	/// Last observed sync record per chain, served when a refresh fails.
	records: RwLock<HashMap<u64, SubgraphSyncRecord>>,
}

impl HttpSubgraph {
	pub fn new(chains: &HashMap<u64, ResolvedChain>, chain_gate: Arc<dyn ChainInterface>) -> Self {
		let chains = chains
			.iter()
			.map(|(&chain_id, chain)| {
				(
					chain_id,
					SubgraphEndpoints {
						urls: chain.subgraph_urls.clone(),
						sync_buffer: chain.subgraph_sync_buffer,
					},
				)
			})
			.collect();
		Self {
			client: reqwest::Client::new(),
			chains,
			chain_gate,
			records: RwLock::new(HashMap::new()),
		}
	}

	/// Runs one GraphQL document against a chain's endpoints in order,
	/// returning the first successful response.
	async fn query<T: DeserializeOwned>(
		&self,
		chain_id: u64,
		query: &str,
		variables: serde_json::Value,
	) -> Result<T, SubgraphError> {
		let endpoints = self
			.chains
			.get(&chain_id)
			.ok_or(SubgraphError::ChainNotConfigured(chain_id))?;

		let body = serde_json::json!({ "query": query, "variables": variables });
		let mut last_error = String::new();

		for url in &endpoints.urls {
			let response = match self.client.post(url).json(&body).send().await {
				Ok(r) => r,
				Err(e) => {
					last_error = e.to_string();
					continue;
				},
			};
			let envelope: GqlEnvelope<T> = match response.json().await {
				Ok(e) => e,
				Err(e) => {
					last_error = e.to_string();
					continue;
				},
			};
			if !envelope.errors.is_empty() {
				let message = envelope
					.errors
					.iter()
					.map(|e| e.message.as_str())
					.collect::<Vec<_>>()
					.join("; ");
				return Err(SubgraphError::GraphQl { chain_id, message });
			}
			if let Some(data) = envelope.data {
				return Ok(data);
			}
			last_error = "response carried no data".to_string();
		}

		Err(SubgraphError::Http {
			chain_id,
			message: last_error,
		})
	}

	async fn refresh_sync_status(&self, chain_id: u64) -> Result<SubgraphSyncRecord, SubgraphError> {
		let buffer = self
			.chains
			.get(&chain_id)
			.ok_or(SubgraphError::ChainNotConfigured(chain_id))?
			.sync_buffer;

		let data: SyncStatusData = self
			.query(chain_id, SYNC_STATUS_QUERY, serde_json::json!({}))
			.await?;
		let latest_block =
			self.chain_gate
				.latest_block(chain_id)
				.await
				.map_err(|e| SubgraphError::Http {
					chain_id,
					message: e.to_string(),
				})?;

		let record = SubgraphSyncRecord::from_blocks(data.meta.block.number, latest_block, buffer);
		self.records.write().await.insert(chain_id, record);
		Ok(record)
	}
}

#[async_trait]
impl SubgraphInterface for HttpSubgraph {
	async fn sync_status(&self, chain_id: u64) -> SubgraphSyncRecord {
		match self.refresh_sync_status(chain_id).await {
			Ok(record) => record,
			Err(e) => {
				tracing::warn!(chain_id, error = %e, "subgraph sync check failed");
				self.records
					.read()
					.await
					.get(&chain_id)
					.copied()
					.unwrap_or_default()
			},
		}
	}

	async fn user_transactions(
		&self,
		user: Address,
	) -> Result<Vec<SubgraphTransaction>, SubgraphError> {
		let mut records = Vec::new();
		for &chain_id in self.chains.keys() {
			// The subgraph stores addresses lowercased.
			let variables =
				serde_json::json!({ "user": format!("{:#x}", user) });
			let data: TransactionsData = match self
				.query(chain_id, USER_TRANSACTIONS_QUERY, variables)
				.await
			{
				Ok(data) => data,
				Err(e) => {
					tracing::warn!(chain_id, error = %e, "skipping chain for enumeration");
					continue;
				},
			};
			for gql in data.transactions {
				records.push(GqlTransaction::into_record(gql)?);
			}
		}
		Ok(records)
	}
}
