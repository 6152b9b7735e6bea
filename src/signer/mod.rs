pub mod wallet;

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::fee::{Coin, Fee};
use crate::rpc::{Event, TxResponse};

pub use wallet::WalletSigner;

/// An address-bound credential that can submit wasm transactions and
/// smart queries to one network.
#[async_trait::async_trait]
pub trait Signer: Send + Sync {
	/// The bech32 address this signer controls.
	fn address(&self) -> &str;

	/// Store contract code on chain.
	async fn upload(&self, sender: &str, wasm: Vec<u8>, fee: Fee) -> Result<UploadResult>;

	/// Instantiate uploaded code as a new contract.
	async fn instantiate(
		&self,
		sender: &str,
		code_id: u64,
		msg: &Value,
		label: &str,
		fee: Fee,
		funds: Vec<Coin>,
	) -> Result<InstantiateResult>;

	/// Execute a message on a contract.
	async fn execute(&self, sender: &str, contract: &str, msg: &Value, fee: Fee) -> Result<ExecuteResult>;

	/// Read-only smart query.
	async fn query_contract_smart(&self, contract: &str, msg: &Value) -> Result<Value>;
}

/// Inclusion details shared by every transaction result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TxSummary {
	pub transaction_hash: String,
	pub height: u64,
	pub gas_wanted: u64,
	pub gas_used: u64,
	pub events: Vec<Event>,
}

impl From<TxResponse> for TxSummary {
	fn from(tx: TxResponse) -> Self {
		let events = tx.all_events();
		Self {
			transaction_hash: tx.txhash,
			height: tx.height,
			gas_wanted: tx.gas_wanted,
			gas_used: tx.gas_used,
			events,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadResult {
	pub code_id: u64,
	/// Hex SHA-256 of the uploaded bytes.
	pub checksum: String,
	pub original_size: usize,
	#[serde(flatten)]
	pub tx: TxSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstantiateResult {
	pub contract_address: String,
	#[serde(flatten)]
	pub tx: TxSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecuteResult {
	#[serde(flatten)]
	pub tx: TxSummary,
}
