use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::fee::{funds_from_amount, gas_fee, Coin, GasOptions};
use crate::network::Network;
use crate::signer::{ExecuteResult, InstantiateResult, Signer, UploadResult};

/// Directory, relative to the project root, holding compiled contracts.
pub const ARTIFACTS_DIR: &str = "artifacts";

/// Where a contract is in its on-chain lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractState {
	NotUploaded,
	Uploaded,
	Deployed,
}

#[derive(Debug, Clone)]
enum Lifecycle {
	NotUploaded {
		wasm_path: PathBuf,
	},
	Uploaded {
		wasm_path: Option<PathBuf>,
		code_id: u64,
		creator: String,
	},
	Deployed {
		wasm_path: Option<PathBuf>,
		code_id: u64,
		creator: String,
		address: String,
		label: String,
	},
}

/// Results of the two transactions sent by [`CudosContract::deploy`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeployResult {
	pub upload_tx: UploadResult,
	pub instantiate_tx: InstantiateResult,
}

/// One smart contract, tracked from local artifact to deployed instance.
///
/// Operations are only accepted in the state they make sense in: code is
/// uploaded once, instantiated any number of times, and executed or queried
/// only once this handle points at a deployed instance.
pub struct CudosContract {
	network: Arc<dyn Network>,
	lifecycle: Lifecycle,
}

impl CudosContract {
	/// Handle for `artifacts/<label>.wasm` under the project root.
	pub fn from_local(network: Arc<dyn Network>, label: &str) -> Result<Self> {
		if label.is_empty() || label.contains(['/', '\\']) || label.contains("..") {
			return Err(Error::NotFound(format!(
				"Contract with label {label} was not found. Only compiled contracts can be accepted"
			)));
		}
		let wasm_path = network
			.project_root()
			.join(ARTIFACTS_DIR)
			.join(format!("{label}.wasm"));
		if !wasm_path.is_file() {
			return Err(Error::NotFound(format!(
				"Contract with label {label} was not found. Only compiled contracts can be accepted"
			)));
		}
		Ok(Self {
			network,
			lifecycle: Lifecycle::NotUploaded { wasm_path },
		})
	}

	/// Handle for code already stored on chain.
	pub async fn from_code_id(network: Arc<dyn Network>, code_id: u64) -> Result<Self> {
		let details = network.code_details(code_id).await?;
		Ok(Self {
			network,
			lifecycle: Lifecycle::Uploaded {
				wasm_path: None,
				code_id,
				creator: details.creator,
			},
		})
	}

	/// Handle for a contract already instantiated on chain.
	pub async fn from_address(network: Arc<dyn Network>, address: &str) -> Result<Self> {
		let info = network.contract_info(address).await?;
		Ok(Self {
			network,
			lifecycle: Lifecycle::Deployed {
				wasm_path: None,
				code_id: info.code_id,
				creator: info.creator,
				address: info.address,
				label: info.label,
			},
		})
	}

	/// Store this contract's code and remember the assigned code id.
	pub async fn upload_code(
		&mut self,
		signer: Option<&dyn Signer>,
		gas: GasOptions,
	) -> Result<UploadResult> {
		let Lifecycle::NotUploaded { wasm_path } = &self.lifecycle else {
			return Err(Error::InvalidState(
				"Cannot upload contract that is already uploaded".into(),
			));
		};
		let wasm_path = wasm_path.clone();

		let owned;
		let signer = match signer {
			Some(signer) => signer,
			None => {
				owned = self.network.default_signer().await?;
				&*owned
			}
		};

		let upload = self.upload_contract(signer, &wasm_path, gas).await?;
		self.lifecycle = Lifecycle::Uploaded {
			wasm_path: Some(wasm_path),
			code_id: upload.code_id,
			creator: signer.address().to_owned(),
		};
		Ok(upload)
	}

	/// Create a new instance from this handle's code.
	///
	/// The handle keeps pointing where it did; the new instance is only
	/// reported through the result.
	pub async fn instantiate(
		&self,
		msg: &Value,
		label: &str,
		signer: Option<&dyn Signer>,
		funds: Option<&str>,
		gas: GasOptions,
	) -> Result<InstantiateResult> {
		let Some(code_id) = self.code_id() else {
			return Err(Error::InvalidState(
				"Cannot instantiate contract that is not uploaded. \
				 Contract's code must exist on the network before instantiating"
					.into(),
			));
		};
		let funds = parse_funds(funds)?;

		let owned;
		let signer = match signer {
			Some(signer) => signer,
			None => {
				owned = self.network.default_signer().await?;
				&*owned
			}
		};

		self.instantiate_contract(signer, code_id, msg, label, funds, gas)
			.await
	}

	/// Upload and instantiate in one go, binding this handle to the new
	/// instance. Fees are always estimated automatically.
	///
	/// If instantiation fails the code stays uploaded and the handle is
	/// left in the uploaded state.
	pub async fn deploy(
		&mut self,
		msg: &Value,
		label: &str,
		signer: Option<&dyn Signer>,
		funds: Option<&str>,
	) -> Result<DeployResult> {
		let Lifecycle::NotUploaded { wasm_path } = &self.lifecycle else {
			return Err(Error::InvalidState(
				"Cannot deploy contract that is already uploaded. \
				 Only new contracts can be deployed. Use \"instantiate\" for uploaded contracts"
					.into(),
			));
		};
		let wasm_path = wasm_path.clone();
		let funds = parse_funds(funds)?;

		let owned;
		let signer = match signer {
			Some(signer) => signer,
			None => {
				owned = self.network.default_signer().await?;
				&*owned
			}
		};
		let creator = signer.address().to_owned();

		let upload_tx = self
			.upload_contract(signer, &wasm_path, GasOptions::auto())
			.await?;
		self.lifecycle = Lifecycle::Uploaded {
			wasm_path: Some(wasm_path.clone()),
			code_id: upload_tx.code_id,
			creator: creator.clone(),
		};

		let instantiate_tx = self
			.instantiate_contract(signer, upload_tx.code_id, msg, label, funds, GasOptions::auto())
			.await?;
		self.lifecycle = Lifecycle::Deployed {
			wasm_path: Some(wasm_path),
			code_id: upload_tx.code_id,
			creator,
			address: instantiate_tx.contract_address.clone(),
			label: label.to_owned(),
		};
		tracing::info!(
			code_id = upload_tx.code_id,
			address = %instantiate_tx.contract_address,
			label,
			"Contract deployed"
		);

		Ok(DeployResult {
			upload_tx,
			instantiate_tx,
		})
	}

	pub async fn execute(
		&self,
		msg: &Value,
		signer: Option<&dyn Signer>,
		gas: GasOptions,
	) -> Result<ExecuteResult> {
		let Some(address) = self.address() else {
			return Err(Error::InvalidState(
				"Cannot use \"execute()\" on non-deployed contracts".into(),
			));
		};

		let owned;
		let signer = match signer {
			Some(signer) => signer,
			None => {
				owned = self.network.default_signer().await?;
				&*owned
			}
		};

		let fee = gas_fee(gas, || self.network.gas_price())?;
		tracing::debug!(contract = address, sender = signer.address(), "Executing contract");
		signer.execute(signer.address(), address, msg, fee).await
	}

	/// Smart query. The signer only supplies the connection.
	pub async fn query(&self, msg: &Value, signer: Option<&dyn Signer>) -> Result<Value> {
		let Some(address) = self.address() else {
			return Err(Error::InvalidState(
				"Cannot use \"query()\" on non-deployed contracts".into(),
			));
		};

		let owned;
		let signer = match signer {
			Some(signer) => signer,
			None => {
				owned = self.network.default_signer().await?;
				&*owned
			}
		};

		signer.query_contract_smart(address, msg).await
	}

	pub fn state(&self) -> ContractState {
		match self.lifecycle {
			Lifecycle::NotUploaded { .. } => ContractState::NotUploaded,
			Lifecycle::Uploaded { .. } => ContractState::Uploaded,
			Lifecycle::Deployed { .. } => ContractState::Deployed,
		}
	}

	pub fn address(&self) -> Option<&str> {
		match &self.lifecycle {
			Lifecycle::Deployed { address, .. } => Some(address),
			_ => None,
		}
	}

	pub fn code_id(&self) -> Option<u64> {
		match &self.lifecycle {
			Lifecycle::NotUploaded { .. } => None,
			Lifecycle::Uploaded { code_id, .. } | Lifecycle::Deployed { code_id, .. } => {
				Some(*code_id)
			}
		}
	}

	pub fn label(&self) -> Option<&str> {
		match &self.lifecycle {
			Lifecycle::Deployed { label, .. } => Some(label),
			_ => None,
		}
	}

	pub fn creator(&self) -> Option<&str> {
		match &self.lifecycle {
			Lifecycle::NotUploaded { .. } => None,
			Lifecycle::Uploaded { creator, .. } | Lifecycle::Deployed { creator, .. } => {
				Some(creator)
			}
		}
	}

	/// Local artifact backing this handle, if it was built locally.
	pub fn wasm_path(&self) -> Option<&Path> {
		match &self.lifecycle {
			Lifecycle::NotUploaded { wasm_path } => Some(wasm_path),
			Lifecycle::Uploaded { wasm_path, .. } | Lifecycle::Deployed { wasm_path, .. } => {
				wasm_path.as_deref()
			}
		}
	}

	// -- Private helpers --

	async fn upload_contract(
		&self,
		signer: &dyn Signer,
		wasm_path: &Path,
		gas: GasOptions,
	) -> Result<UploadResult> {
		let wasm = std::fs::read(wasm_path).map_err(|source| Error::Io {
			path: wasm_path.to_path_buf(),
			source,
		})?;
		let fee = gas_fee(gas, || self.network.gas_price())?;
		tracing::info!(
			path = %wasm_path.display(),
			bytes = wasm.len(),
			sender = signer.address(),
			"Uploading contract code"
		);
		signer.upload(signer.address(), wasm, fee).await
	}

	async fn instantiate_contract(
		&self,
		signer: &dyn Signer,
		code_id: u64,
		msg: &Value,
		label: &str,
		funds: Vec<Coin>,
		gas: GasOptions,
	) -> Result<InstantiateResult> {
		let fee = gas_fee(gas, || self.network.gas_price())?;
		tracing::info!(
			code_id,
			label,
			sender = signer.address(),
			funds = ?funds.iter().map(Coin::to_string).collect::<Vec<_>>(),
			"Instantiating contract"
		);
		signer
			.instantiate(signer.address(), code_id, msg, label, fee, funds)
			.await
	}
}

fn parse_funds(funds: Option<&str>) -> Result<Vec<Coin>> {
	match funds {
		Some(amount) if !amount.trim().is_empty() => funds_from_amount(amount),
		_ => Ok(Vec::new()),
	}
}
