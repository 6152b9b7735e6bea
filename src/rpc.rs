use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine as _;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{Error, Result};

/// Thin wrapper around a node's REST (LCD) endpoints.
///
/// Covers what the contract lifecycle needs: account and chain lookups for
/// signing, simulate/broadcast/tx for submission, and the wasm module's code,
/// contract and smart-query routes.
pub struct RpcClient {
	url: String,
	http: reqwest::Client,
}

/// Metadata of uploaded code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeDetails {
	pub code_id: u64,
	pub creator: String,
	pub checksum: String,
}

/// Metadata of an instantiated contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractInfo {
	pub address: String,
	pub code_id: u64,
	pub creator: String,
	pub admin: Option<String>,
	pub label: String,
}

/// Account number and sequence needed to sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountInfo {
	pub account_number: u64,
	pub sequence: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TxResponse {
	pub txhash: String,
	#[serde(default, with = "u64_string")]
	pub height: u64,
	#[serde(default)]
	pub code: u32,
	#[serde(default)]
	pub raw_log: String,
	#[serde(default, with = "u64_string")]
	pub gas_wanted: u64,
	#[serde(default, with = "u64_string")]
	pub gas_used: u64,
	#[serde(default)]
	pub logs: Vec<TxLog>,
	#[serde(default)]
	pub events: Vec<Event>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TxLog {
	#[serde(default)]
	pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default)]
	pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
	pub key: String,
	#[serde(default)]
	pub value: Option<String>,
}

impl TxResponse {
	/// First value of `key` in an event of type `kind`.
	///
	/// Looks in the per-message logs first, then in the flat event list whose
	/// attributes older nodes return base64 encoded.
	pub fn attribute(&self, kind: &str, key: &str) -> Option<String> {
		let from_logs = self
			.logs
			.iter()
			.flat_map(|log| log.events.iter())
			.filter(|e| e.kind == kind)
			.flat_map(|e| e.attributes.iter())
			.find(|a| a.key == key)
			.and_then(|a| a.value.clone());
		if from_logs.is_some() {
			return from_logs;
		}

		self.events
			.iter()
			.filter(|e| e.kind == kind)
			.flat_map(|e| e.attributes.iter())
			.find_map(|a| {
				if a.key == key {
					return a.value.clone();
				}
				let decoded = decode_b64(&a.key)?;
				(decoded == key).then(|| a.value.as_deref().and_then(decode_b64))?
			})
	}

	/// Every event, per-message logs first.
	pub fn all_events(&self) -> Vec<Event> {
		if self.logs.iter().any(|l| !l.events.is_empty()) {
			self.logs.iter().flat_map(|l| l.events.clone()).collect()
		} else {
			self.events.clone()
		}
	}
}

impl RpcClient {
	pub fn new(url: &str) -> Self {
		Self {
			url: url.trim_end_matches('/').to_owned(),
			http: reqwest::Client::new(),
		}
	}

	// -- Auth / node --

	pub async fn account(&self, address: &str) -> Result<AccountInfo> {
		let body = self
			.get(&format!("/cosmos/auth/v1beta1/accounts/{address}"))
			.await?;
		let account = &body["account"];
		let base = ["", "/base_account", "/base_vesting_account/base_account"]
			.iter()
			.filter_map(|prefix| account.pointer(prefix))
			.find(|v| v.get("account_number").is_some())
			.ok_or_else(|| Error::Network(format!("Account {address} was not found on chain")))?;

		Ok(AccountInfo {
			account_number: number_field(base, "account_number")?,
			sequence: number_field(base, "sequence")?,
		})
	}

	pub async fn chain_id(&self) -> Result<String> {
		let body = self.get("/cosmos/base/tendermint/v1beta1/node_info").await?;
		body.pointer("/default_node_info/network")
			.and_then(Value::as_str)
			.map(str::to_owned)
			.ok_or_else(|| Error::Network("node_info response has no network id".into()))
	}

	// -- Transactions --

	/// Gas used by `tx_bytes` when executed in simulation mode.
	pub async fn simulate(&self, tx_bytes: &[u8]) -> Result<u64> {
		let body = self
			.post(
				"/cosmos/tx/v1beta1/simulate",
				json!({ "tx_bytes": STANDARD.encode(tx_bytes) }),
			)
			.await?;
		number_field(&body["gas_info"], "gas_used")
	}

	/// Broadcast in sync mode and return the transaction hash.
	pub async fn broadcast(&self, tx_bytes: &[u8]) -> Result<String> {
		let body = self
			.post(
				"/cosmos/tx/v1beta1/txs",
				json!({
					"tx_bytes": STANDARD.encode(tx_bytes),
					"mode": "BROADCAST_MODE_SYNC",
				}),
			)
			.await?;
		let response: TxResponse = serde_json::from_value(body["tx_response"].clone())?;
		if response.code != 0 {
			return Err(Error::Network(format!(
				"Broadcasting transaction failed with code {}. Log: {}",
				response.code, response.raw_log
			)));
		}
		Ok(response.txhash)
	}

	/// Look up an included transaction. `None` while it is not yet in a block.
	pub async fn tx(&self, hash: &str) -> Result<Option<TxResponse>> {
		let resp = self
			.http
			.get(format!("{}/cosmos/tx/v1beta1/txs/{hash}", self.url))
			.send()
			.await?;
		if resp.status() == StatusCode::NOT_FOUND {
			return Ok(None);
		}
		match read(resp).await {
			Ok(body) => Ok(Some(serde_json::from_value(body["tx_response"].clone())?)),
			Err(Error::Network(msg)) if msg.contains("not found") => Ok(None),
			Err(e) => Err(e),
		}
	}

	// -- Wasm module --

	pub async fn code_details(&self, code_id: u64) -> Result<CodeDetails> {
		let body = self
			.get(&format!("/cosmwasm/wasm/v1/code/{code_id}"))
			.await
			.map_err(|e| {
				Error::Network(format!(
					"Failed to get code details for code id: {code_id}. Error: {e}"
				))
			})?;
		let info = &body["code_info"];
		Ok(CodeDetails {
			code_id: number_field(info, "code_id").unwrap_or(code_id),
			creator: string_field(info, "creator")?,
			checksum: info
				.get("data_hash")
				.and_then(Value::as_str)
				.unwrap_or_default()
				.to_lowercase(),
		})
	}

	pub async fn contract_info(&self, address: &str) -> Result<ContractInfo> {
		let wrap = |e: Error| {
			Error::Network(format!(
				"Failed to get contract info from address: {address}. Error: {e}"
			))
		};
		let body = self
			.get(&format!("/cosmwasm/wasm/v1/contract/{address}"))
			.await
			.map_err(wrap)?;
		let info = &body["contract_info"];
		Ok(ContractInfo {
			address: body
				.get("address")
				.and_then(Value::as_str)
				.unwrap_or(address)
				.to_owned(),
			code_id: number_field(info, "code_id").map_err(wrap)?,
			creator: string_field(info, "creator").map_err(wrap)?,
			admin: info
				.get("admin")
				.and_then(Value::as_str)
				.filter(|a| !a.is_empty())
				.map(str::to_owned),
			label: string_field(info, "label").map_err(wrap)?,
		})
	}

	pub async fn query_contract_smart(&self, address: &str, msg: &Value) -> Result<Value> {
		let query = URL_SAFE.encode(serde_json::to_vec(msg)?);
		let body = self
			.get(&format!("/cosmwasm/wasm/v1/contract/{address}/smart/{query}"))
			.await?;
		Ok(body.get("data").cloned().unwrap_or(Value::Null))
	}

	// -- Private helpers --

	async fn get(&self, path: &str) -> Result<Value> {
		tracing::trace!(path, "GET");
		let resp = self.http.get(format!("{}{path}", self.url)).send().await?;
		read(resp).await
	}

	async fn post(&self, path: &str, body: Value) -> Result<Value> {
		tracing::trace!(path, "POST");
		let resp = self
			.http
			.post(format!("{}{path}", self.url))
			.json(&body)
			.send()
			.await?;
		read(resp).await
	}
}

async fn read(resp: reqwest::Response) -> Result<Value> {
	let status = resp.status();
	let text = resp.text().await?;
	let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

	if !status.is_success() {
		let message = body
			.get("message")
			.and_then(Value::as_str)
			.map(str::to_owned)
			.unwrap_or(text);
		return Err(Error::Network(format!("{status}: {message}")));
	}
	if body.is_null() {
		return Err(Error::Network(format!("node returned a non-JSON body: {text}")));
	}
	Ok(body)
}

fn number_field(v: &Value, key: &str) -> Result<u64> {
	match v.get(key) {
		Some(Value::String(s)) => s.parse().ok(),
		Some(Value::Number(n)) => n.as_u64(),
		_ => None,
	}
	.ok_or_else(|| Error::Network(format!("response field `{key}` is missing or not a number")))
}

fn string_field(v: &Value, key: &str) -> Result<String> {
	v.get(key)
		.and_then(Value::as_str)
		.map(str::to_owned)
		.ok_or_else(|| Error::Network(format!("response field `{key}` is missing")))
}

fn decode_b64(s: &str) -> Option<String> {
	let bytes = STANDARD.decode(s).ok()?;
	String::from_utf8(bytes).ok()
}

mod u64_string {
	use serde::{Deserialize, Deserializer, Serializer};

	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Raw {
		Str(String),
		Num(u64),
	}

	pub fn serialize<S: Serializer>(v: &u64, s: S) -> Result<S::Ok, S::Error> {
		s.serialize_str(&v.to_string())
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
		match Raw::deserialize(d)? {
			Raw::Str(s) if s.is_empty() => Ok(0),
			Raw::Str(s) => s.parse().map_err(serde::de::Error::custom),
			Raw::Num(n) => Ok(n),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn attribute_from_logs() {
		let tx: TxResponse = serde_json::from_value(json!({
			"txhash": "ABC",
			"height": "42",
			"gas_used": "1000",
			"logs": [{
				"events": [{
					"type": "store_code",
					"attributes": [{ "key": "code_id", "value": "7" }]
				}]
			}]
		}))
		.unwrap();

		assert_eq!(tx.height, 42);
		assert_eq!(tx.gas_used, 1000);
		assert_eq!(tx.attribute("store_code", "code_id").as_deref(), Some("7"));
		assert_eq!(tx.attribute("instantiate", "code_id"), None);
	}

	#[test]
	fn attribute_from_base64_events() {
		let tx: TxResponse = serde_json::from_value(json!({
			"txhash": "ABC",
			"height": 3,
			"events": [{
				"type": "instantiate",
				"attributes": [
					{ "key": STANDARD.encode("_contract_address"), "value": STANDARD.encode("cudos1xyz") }
				]
			}]
		}))
		.unwrap();

		assert_eq!(
			tx.attribute("instantiate", "_contract_address").as_deref(),
			Some("cudos1xyz")
		);
		assert_eq!(tx.all_events().len(), 1);
	}

	#[test]
	fn number_field_accepts_strings_and_numbers() {
		let v = json!({ "a": "12", "b": 13, "c": "x" });
		assert_eq!(number_field(&v, "a").unwrap(), 12);
		assert_eq!(number_field(&v, "b").unwrap(), 13);
		assert!(number_field(&v, "c").is_err());
		assert!(number_field(&v, "d").is_err());
	}
}
