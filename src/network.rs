use std::path::Path;
use std::sync::Arc;

use crate::config::{Accounts, Config};
use crate::error::{Error, Result};
use crate::fee::GasPrice;
use crate::rpc::{CodeDetails, ContractInfo, RpcClient};
use crate::signer::{Signer, WalletSigner};

/// What a contract handle needs from the network it lives on.
#[async_trait::async_trait]
pub trait Network: Send + Sync {
	/// Signer used when an operation is not given one explicitly.
	async fn default_signer(&self) -> Result<Box<dyn Signer>>;

	async fn code_details(&self, code_id: u64) -> Result<CodeDetails>;

	async fn contract_info(&self, address: &str) -> Result<ContractInfo>;

	/// Current gas price from config.
	fn gas_price(&self) -> Result<GasPrice>;

	/// Directory holding `artifacts/`.
	fn project_root(&self) -> &Path;
}

/// A configured connection to one Cudos node.
pub struct CudosNetwork {
	config: Config,
	url: String,
	rpc: Arc<RpcClient>,
}

impl CudosNetwork {
	/// Connect to the endpoint selected by config and `BLAST_NETWORK`.
	pub fn connect(config: Config) -> Result<Self> {
		let url = config.network_url()?;
		Ok(Self::with_url(config, &url))
	}

	pub fn with_url(config: Config, url: &str) -> Self {
		tracing::debug!(url, "Using network");
		Self {
			config,
			url: url.to_owned(),
			rpc: Arc::new(RpcClient::new(url)),
		}
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn url(&self) -> &str {
		&self.url
	}

	pub fn rpc(&self) -> &RpcClient {
		&self.rpc
	}

	/// Accounts file for this network.
	pub fn accounts(&self) -> Result<Accounts> {
		self.config.accounts(&self.url)
	}

	/// Signer for the account derived from `mnemonic`.
	pub fn signer(&self, mnemonic: &str) -> Result<WalletSigner> {
		WalletSigner::from_mnemonic(
			mnemonic,
			self.config.address_prefix()?,
			Arc::clone(&self.rpc),
			self.config.config.gas_price.clone(),
		)
	}

	/// Signer for the named account.
	pub fn signer_for(&self, name: &str) -> Result<WalletSigner> {
		let accounts = self.accounts()?;
		self.signer(&accounts.by_name(name)?.mnemonic)
	}

	/// One signer per account, in accounts-file order.
	pub fn signers(&self) -> Result<Vec<WalletSigner>> {
		self.accounts()?
			.iter()
			.map(|(_, account)| self.signer(&account.mnemonic))
			.collect()
	}

	/// The `default_account` from config, or the first account when unset.
	pub fn default_wallet(&self) -> Result<WalletSigner> {
		let accounts = self.accounts()?;
		let account = match self.config.config.default_account.as_deref() {
			Some(name) => accounts.by_name(name)?,
			None => {
				accounts
					.first()
					.ok_or_else(|| {
						Error::Config(
							"Cannot get default signer. First account from accounts file is missing"
								.into(),
						)
					})?
					.1
			}
		};
		self.signer(&account.mnemonic)
	}
}

#[async_trait::async_trait]
impl Network for CudosNetwork {
	async fn default_signer(&self) -> Result<Box<dyn Signer>> {
		Ok(Box::new(self.default_wallet()?))
	}

	async fn code_details(&self, code_id: u64) -> Result<CodeDetails> {
		self.rpc.code_details(code_id).await
	}

	async fn contract_info(&self, address: &str) -> Result<ContractInfo> {
		self.rpc.contract_info(address).await
	}

	fn gas_price(&self) -> Result<GasPrice> {
		self.config.gas_price()
	}

	fn project_root(&self) -> &Path {
		self.config.project_root()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::{CONFIG_FILE, LOCAL_ACCOUNTS_FILE};

	const MNEMONIC_A: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
	const MNEMONIC_B: &str = "legal winner thank year wave sausage worth useful legal winner thank yellow";

	fn project(default_account: Option<&str>) -> (tempfile::TempDir, CudosNetwork) {
		project_with_accounts(
			default_account,
			&format!(
				r#"{{ "alice": {{ "mnemonic": "{MNEMONIC_A}" }}, "bob": {{ "mnemonic": "{MNEMONIC_B}" }} }}"#
			),
		)
	}

	fn project_with_accounts(
		default_account: Option<&str>,
		accounts: &str,
	) -> (tempfile::TempDir, CudosNetwork) {
		let dir = tempfile::tempdir().unwrap();
		let default = default_account
			.map(|n| format!("default_account = \"{n}\"\n"))
			.unwrap_or_default();
		std::fs::write(
			dir.path().join(CONFIG_FILE),
			format!(
				"[config]\nnetwork_url = \"http://localhost:1317\"\naddress_prefix = \"cudos\"\ngas_price = \"5000000000000acudos\"\n{default}"
			),
		)
		.unwrap();
		std::fs::write(dir.path().join(LOCAL_ACCOUNTS_FILE), accounts).unwrap();
		let config = Config::load_from(dir.path()).unwrap();
		let network = CudosNetwork::with_url(config, "http://localhost:1317");
		(dir, network)
	}

	#[test]
	fn signers_follow_accounts_order() {
		let (_dir, network) = project(None);
		let signers = network.signers().unwrap();
		assert_eq!(signers.len(), 2);
		assert_eq!(signers[0].address(), "cudos19rl4cm2hmr8afy4kldpxz3fka4jguq0aa3yzpq");
		assert_eq!(signers[1].address(), "cudos1avgyh77ycn997ja45q5q8ss8y9mr424jpttvt5");
	}

	#[test]
	fn default_signer_uses_configured_account() {
		let (_dir, network) = project(Some("bob"));
		let bob = network.signer_for("bob").unwrap();
		assert_eq!(network.default_wallet().unwrap().address(), bob.address());
	}

	#[test]
	fn default_signer_falls_back_to_first_account() {
		let (_dir, network) = project(None);
		let alice = network.signer_for("alice").unwrap();
		assert_eq!(network.default_wallet().unwrap().address(), alice.address());
	}

	#[test]
	fn unknown_default_account_is_reported() {
		let (_dir, network) = project(Some("carol"));
		assert!(matches!(
			network.default_wallet(),
			Err(Error::UnknownAccount(ref n)) if n == "carol"
		));
	}

	#[test]
	fn empty_accounts_file_has_no_default_signer() {
		let (_dir, network) = project_with_accounts(None, "{}");
		assert!(network.signers().unwrap().is_empty());
		assert!(matches!(
			network.default_wallet(),
			Err(Error::Config(ref m)) if m.contains("Cannot get default signer")
		));
	}

	#[test]
	fn malformed_gas_price_only_fails_when_pricing() {
		let (dir, _) = project(None);
		std::fs::write(
			dir.path().join(CONFIG_FILE),
			"[config]\naddress_prefix = \"cudos\"\ngas_price = \"lots\"\n",
		)
		.unwrap();
		let config = Config::load_from(dir.path()).unwrap();
		let network = CudosNetwork::with_url(config, "http://localhost:1317");

		assert!(network.default_wallet().is_ok());
		assert!(matches!(Network::gas_price(&network), Err(Error::Config(_))));
	}

	#[test]
	fn remote_network_reads_private_accounts() {
		let (dir, _) = project(None);
		let config = Config::load_from(dir.path()).unwrap();
		let network = CudosNetwork::with_url(config, "https://example.invalid:1317");
		assert!(matches!(network.accounts(), Err(Error::Config(_))));
	}
}
