use std::sync::Arc;

use cosmrs::cosmwasm::{MsgExecuteContract, MsgInstantiateContract, MsgStoreCode};
use cosmrs::crypto::secp256k1::SigningKey;
use cosmrs::tendermint::chain;
use cosmrs::tx::{self, Msg, SignDoc, SignerInfo};
use cosmrs::{AccountId, Any};
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::{ExecuteResult, InstantiateResult, Signer, UploadResult};
use crate::error::{Error, Result};
use crate::fee::{calculate_fee, Coin, Fee, GasPrice, StdFee, DEFAULT_GAS_MULTIPLIER};
use crate::helpers::delay;
use crate::rpc::{AccountInfo, RpcClient, TxResponse};

/// HD path of the first Cosmos account (coin type 118).
pub const HD_PATH: &str = "m/44'/118'/0'/0/0";

/// Seconds between inclusion checks after broadcasting.
const POLL_INTERVAL_SECS: u64 = 1;

/// Inclusion checks before giving up on a broadcast transaction.
const POLL_ATTEMPTS: u32 = 60;

/// Signs locally with a key derived from a mnemonic and submits through
/// the node's REST endpoints.
pub struct WalletSigner {
	address: String,
	key: SigningKey,
	rpc: Arc<RpcClient>,
	gas_price: Option<String>,
}

/// How the fee of one transaction is settled.
enum Pricing {
	Fixed(StdFee),
	Estimate { price: GasPrice, multiplier: f64 },
}

impl WalletSigner {
	/// Derive the account key from `mnemonic` and bind it to `rpc`.
	///
	/// `gas_price` is the configured price string. It is only parsed when a
	/// fee has to be estimated, so queries and explicit fees never need it.
	pub fn from_mnemonic(
		mnemonic: &str,
		prefix: &str,
		rpc: Arc<RpcClient>,
		gas_price: Option<String>,
	) -> Result<Self> {
		let key = derive_key(mnemonic)?;
		let address = key
			.public_key()
			.account_id(prefix)
			.map_err(sdk_err)?
			.to_string();
		Ok(Self {
			address,
			key,
			rpc,
			gas_price,
		})
	}

	async fn sign_and_broadcast(&self, msg: Any, fee: Fee) -> Result<TxResponse> {
		// Resolve the price before the node is contacted.
		let pricing = match fee {
			Fee::Explicit(fee) => Pricing::Fixed(fee),
			Fee::Auto => Pricing::Estimate {
				price: self.gas_price()?,
				multiplier: DEFAULT_GAS_MULTIPLIER,
			},
			Fee::Multiplier(multiplier) => Pricing::Estimate {
				price: self.gas_price()?,
				multiplier,
			},
		};

		let account = self.rpc.account(&self.address).await?;
		let chain_id: chain::Id = self.rpc.chain_id().await?.parse().map_err(sdk_err)?;
		let body = tx::Body::new(vec![msg], "", 0u32);

		let fee = match pricing {
			Pricing::Fixed(fee) => fee,
			Pricing::Estimate { price, multiplier } => {
				self.estimate_fee(&body, &chain_id, account, &price, multiplier)
					.await?
			}
		};
		tracing::debug!(gas = fee.gas, address = %self.address, "Signing transaction");

		let tx_bytes = self.sign(&body, &chain_id, account, &fee)?;
		let hash = self.rpc.broadcast(&tx_bytes).await?;
		tracing::info!(tx = %hash, "Broadcast transaction");
		self.wait_for_inclusion(&hash).await
	}

	async fn estimate_fee(
		&self,
		body: &tx::Body,
		chain_id: &chain::Id,
		account: AccountInfo,
		price: &GasPrice,
		multiplier: f64,
	) -> Result<StdFee> {
		let probe = StdFee {
			amount: Vec::new(),
			gas: 0,
		};
		let gas_used = self
			.rpc
			.simulate(&self.sign(body, chain_id, account, &probe)?)
			.await?;
		let gas = (gas_used as f64 * multiplier).ceil() as u64;
		tracing::debug!(gas_used, gas, multiplier, "Estimated gas");
		calculate_fee(gas, price)
	}

	fn gas_price(&self) -> Result<GasPrice> {
		self.gas_price
			.as_deref()
			.ok_or_else(|| Error::Config("Missing gasPrice in the config file.".into()))?
			.parse()
	}

	fn sign(
		&self,
		body: &tx::Body,
		chain_id: &chain::Id,
		account: AccountInfo,
		fee: &StdFee,
	) -> Result<Vec<u8>> {
		let fee = tx::Fee {
			amount: to_sdk_coins(&fee.amount)?,
			gas_limit: fee.gas,
			payer: None,
			granter: None,
		};
		let auth_info =
			SignerInfo::single_direct(Some(self.key.public_key()), account.sequence).auth_info(fee);
		let sign_doc = SignDoc::new(body, &auth_info, chain_id, account.account_number)
			.map_err(sdk_err)?;
		sign_doc
			.sign(&self.key)
			.and_then(|raw| raw.to_bytes())
			.map_err(sdk_err)
	}

	async fn wait_for_inclusion(&self, hash: &str) -> Result<TxResponse> {
		for _ in 0..POLL_ATTEMPTS {
			if let Some(tx) = self.rpc.tx(hash).await? {
				if tx.code != 0 {
					return Err(Error::Network(format!(
						"Transaction {hash} failed with code {}. Log: {}",
						tx.code, tx.raw_log
					)));
				}
				return Ok(tx);
			}
			delay(POLL_INTERVAL_SECS).await;
		}
		Err(Error::Network(format!(
			"Transaction {hash} was not included within {} seconds",
			POLL_INTERVAL_SECS * u64::from(POLL_ATTEMPTS)
		)))
	}

	fn sender(&self, sender: &str) -> Result<AccountId> {
		if sender != self.address {
			return Err(Error::Signer(format!(
				"cannot sign for {sender}, this signer controls {}",
				self.address
			)));
		}
		parse_account(sender)
	}
}

#[async_trait::async_trait]
impl Signer for WalletSigner {
	fn address(&self) -> &str {
		&self.address
	}

	async fn upload(&self, sender: &str, wasm: Vec<u8>, fee: Fee) -> Result<UploadResult> {
		let checksum = hex::encode(Sha256::digest(&wasm));
		let original_size = wasm.len();
		let msg = MsgStoreCode {
			sender: self.sender(sender)?,
			wasm_byte_code: wasm,
			instantiate_permission: None,
		}
		.to_any()
		.map_err(sdk_err)?;

		let tx = self.sign_and_broadcast(msg, fee).await?;
		let code_id = tx
			.attribute("store_code", "code_id")
			.and_then(|id| id.parse().ok())
			.ok_or_else(|| {
				Error::Network(format!("Transaction {} did not report a code id", tx.txhash))
			})?;

		Ok(UploadResult {
			code_id,
			checksum,
			original_size,
			tx: tx.into(),
		})
	}

	async fn instantiate(
		&self,
		sender: &str,
		code_id: u64,
		msg: &Value,
		label: &str,
		fee: Fee,
		funds: Vec<Coin>,
	) -> Result<InstantiateResult> {
		let msg = MsgInstantiateContract {
			sender: self.sender(sender)?,
			admin: None,
			code_id,
			label: Some(label.to_owned()),
			msg: serde_json::to_vec(msg)?,
			funds: to_sdk_coins(&funds)?,
		}
		.to_any()
		.map_err(sdk_err)?;

		let tx = self.sign_and_broadcast(msg, fee).await?;
		let contract_address = tx
			.attribute("instantiate", "_contract_address")
			.ok_or_else(|| {
				Error::Network(format!(
					"Transaction {} did not report a contract address",
					tx.txhash
				))
			})?;

		Ok(InstantiateResult {
			contract_address,
			tx: tx.into(),
		})
	}

	async fn execute(&self, sender: &str, contract: &str, msg: &Value, fee: Fee) -> Result<ExecuteResult> {
		let msg = MsgExecuteContract {
			sender: self.sender(sender)?,
			contract: parse_account(contract)?,
			msg: serde_json::to_vec(msg)?,
			funds: Vec::new(),
		}
		.to_any()
		.map_err(sdk_err)?;

		let tx = self.sign_and_broadcast(msg, fee).await?;
		Ok(ExecuteResult { tx: tx.into() })
	}

	async fn query_contract_smart(&self, contract: &str, msg: &Value) -> Result<Value> {
		self.rpc.query_contract_smart(contract, msg).await
	}
}

fn derive_key(mnemonic: &str) -> Result<SigningKey> {
	let mnemonic = bip39::Mnemonic::parse_in_normalized(bip39::Language::English, mnemonic.trim())
		.map_err(|e| Error::Signer(format!("invalid mnemonic: {e}")))?;
	let seed = mnemonic.to_seed_normalized("");
	let path: bip32::DerivationPath = HD_PATH.parse().map_err(sdk_err)?;
	SigningKey::derive_from_path(seed, &path).map_err(sdk_err)
}

fn parse_account(address: &str) -> Result<AccountId> {
	address
		.parse()
		.map_err(|e| Error::Signer(format!("invalid address {address}: {e}")))
}

fn to_sdk_coins(coins: &[Coin]) -> Result<Vec<cosmrs::Coin>> {
	coins
		.iter()
		.map(|c| {
			Ok(cosmrs::Coin {
				denom: c.denom.parse().map_err(sdk_err)?,
				amount: c.amount,
			})
		})
		.collect()
}

fn sdk_err(e: impl std::fmt::Display) -> Error {
	Error::Signer(e.to_string())
}
