use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fee::GasPrice;

/// Project config file, looked up in the working directory.
pub const CONFIG_FILE: &str = "blast.config.toml";

/// Accounts used against the local node.
pub const LOCAL_ACCOUNTS_FILE: &str = "accounts.json";

/// Accounts used against any other network.
pub const PRIVATE_ACCOUNTS_FILE: &str = "private-accounts.json";

/// Environment variable naming an entry of `[networks]`.
pub const NETWORK_ENV: &str = "BLAST_NETWORK";

/// REST endpoint of a node started locally.
pub const LOCAL_NETWORK: &str = "http://localhost:1317";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub config: Settings,
	/// Named endpoints selectable through `BLAST_NETWORK`.
	#[serde(default)]
	pub networks: BTreeMap<String, String>,
	#[serde(skip)]
	root: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
	pub network_url: Option<String>,
	pub gas_price: Option<String>,
	pub address_prefix: Option<String>,
	pub default_account: Option<String>,
	pub additional_accounts: Option<u32>,
	pub custom_account_balances: Option<u64>,
}

impl Config {
	/// Load `blast.config.toml` from the current working directory.
	pub fn load() -> Result<Self> {
		let cwd = std::env::current_dir().map_err(|source| Error::Io {
			path: PathBuf::from("."),
			source,
		})?;
		Self::load_from(&cwd)
	}

	/// Load the config file of the project rooted at `root`.
	pub fn load_from(root: &Path) -> Result<Self> {
		let path = root.join(CONFIG_FILE);
		if !path.exists() {
			return Err(Error::Config(format!(
				"Config file was not found! Make sure that {CONFIG_FILE} exists at {}",
				path.display()
			)));
		}
		let content = std::fs::read_to_string(&path).map_err(|source| Error::Io {
			path: path.clone(),
			source,
		})?;
		tracing::debug!(path = %path.display(), "Loaded config");
		Self::from_toml(&content, root)
	}

	pub fn from_toml(content: &str, root: &Path) -> Result<Self> {
		let mut config: Self = toml::from_str(content)?;
		config.root = root.to_path_buf();
		Ok(config)
	}

	/// Directory holding the config file, `artifacts/` and the accounts files.
	pub fn project_root(&self) -> &Path {
		&self.root
	}

	/// Endpoint selected by `BLAST_NETWORK`, or `network_url` when unset.
	pub fn network_url(&self) -> Result<String> {
		let selected = std::env::var(NETWORK_ENV).ok().filter(|v| !v.is_empty());
		self.network_url_for(selected.as_deref())
	}

	pub fn network_url_for(&self, network: Option<&str>) -> Result<String> {
		match network {
			Some(name) => match self.networks.get(name) {
				Some(url) => Ok(url.clone()),
				None if name == "local" => Ok(LOCAL_NETWORK.to_owned()),
				None => Err(Error::Config(format!(
					"Missing network `{name}` in the [networks] section of the config file."
				))),
			},
			None => self
				.config
				.network_url
				.clone()
				.ok_or_else(|| Error::Config("Missing networkUrl in the config file.".into())),
		}
	}

	/// Whether `url` points at the local node.
	pub fn is_local(&self, url: &str) -> bool {
		let local = self
			.networks
			.get("local")
			.map(String::as_str)
			.unwrap_or(LOCAL_NETWORK);
		url.trim_end_matches('/') == local.trim_end_matches('/')
	}

	pub fn gas_price(&self) -> Result<GasPrice> {
		self.config
			.gas_price
			.as_deref()
			.ok_or_else(|| Error::Config("Missing gasPrice in the config file.".into()))?
			.parse()
	}

	pub fn address_prefix(&self) -> Result<&str> {
		self.config
			.address_prefix
			.as_deref()
			.ok_or_else(|| Error::Config("Missing addressPrefix in the config file.".into()))
	}

	pub fn default_account(&self) -> Result<&str> {
		self.config
			.default_account
			.as_deref()
			.ok_or_else(|| Error::Config("Missing defaultAccount in the config file.".into()))
	}

	pub fn additional_accounts(&self) -> u32 {
		self.config.additional_accounts.unwrap_or(0)
	}

	pub fn custom_account_balances(&self) -> Result<u64> {
		self.config.custom_account_balances.ok_or_else(|| {
			Error::Config("Missing [customAccountBalances] in the config file.".into())
		})
	}

	/// Accounts file matching the network at `network_url`.
	pub fn accounts_path(&self, network_url: &str) -> PathBuf {
		let file = if self.is_local(network_url) {
			LOCAL_ACCOUNTS_FILE
		} else {
			PRIVATE_ACCOUNTS_FILE
		};
		self.root.join(file)
	}

	pub fn accounts(&self, network_url: &str) -> Result<Accounts> {
		Accounts::load(&self.accounts_path(network_url))
	}
}

/// Credentials of one named account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
	pub mnemonic: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub address: Option<String>,
}

/// Named accounts in file order.
#[derive(Debug, Clone, Default)]
pub struct Accounts {
	entries: Vec<(String, Account)>,
}

impl Accounts {
	pub fn load(path: &Path) -> Result<Self> {
		if !path.exists() {
			return Err(Error::Config(format!(
				"Accounts file was not found! Make sure that {} exists at {}",
				path.file_name()
					.map(|n| n.to_string_lossy().into_owned())
					.unwrap_or_default(),
				path.display()
			)));
		}
		let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_json(&content)
	}

	pub fn from_json(content: &str) -> Result<Self> {
		let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_str(content)?;
		let entries = raw
			.into_iter()
			.map(|(name, value)| -> Result<(String, Account)> {
				Ok((name, serde_json::from_value(value)?))
			})
			.collect::<Result<_>>()?;
		Ok(Self { entries })
	}

	pub fn by_name(&self, name: &str) -> Result<&Account> {
		self.entries
			.iter()
			.find(|(n, _)| n == name)
			.map(|(_, account)| account)
			.ok_or_else(|| Error::UnknownAccount(name.to_owned()))
	}

	pub fn first(&self) -> Option<(&str, &Account)> {
		self.entries.first().map(|(n, a)| (n.as_str(), a))
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Account)> {
		self.entries.iter().map(|(n, a)| (n.as_str(), a))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const SAMPLE: &str = r#"
[config]
network_url = "http://localhost:1317"
gas_price = "5000000000000acudos"
address_prefix = "cudos"
default_account = "alice"

[networks]
testnet = "https://sentry1.gcp-uscentral1.cudos.org:1317"
"#;

	fn sample() -> Config {
		Config::from_toml(SAMPLE, Path::new("/project")).unwrap()
	}

	#[test]
	fn accessors_read_settings() {
		let c = sample();
		assert_eq!(c.address_prefix().unwrap(), "cudos");
		assert_eq!(c.default_account().unwrap(), "alice");
		assert_eq!(c.gas_price().unwrap().denom(), "acudos");
		assert_eq!(c.additional_accounts(), 0);
		assert_eq!(c.project_root(), Path::new("/project"));
	}

	#[test]
	fn missing_keys_fail_loudly() {
		let c = Config::from_toml("[config]\n", Path::new(".")).unwrap();
		for err in [
			c.network_url_for(None).unwrap_err(),
			c.gas_price().unwrap_err(),
			c.address_prefix().unwrap_err(),
			c.default_account().unwrap_err(),
			c.custom_account_balances().unwrap_err(),
		] {
			assert!(matches!(err, Error::Config(_)), "unexpected error {err:?}");
		}
		assert!(c.gas_price().unwrap_err().to_string().contains("gasPrice"));
	}

	#[test]
	fn network_selection() {
		let c = sample();
		assert_eq!(c.network_url_for(None).unwrap(), "http://localhost:1317");
		assert_eq!(
			c.network_url_for(Some("testnet")).unwrap(),
			"https://sentry1.gcp-uscentral1.cudos.org:1317"
		);
		assert_eq!(c.network_url_for(Some("local")).unwrap(), LOCAL_NETWORK);
		assert!(matches!(c.network_url_for(Some("mainnet")), Err(Error::Config(_))));
	}

	#[test]
	fn accounts_file_follows_network() {
		let c = sample();
		assert_eq!(
			c.accounts_path("http://localhost:1317/"),
			Path::new("/project").join(LOCAL_ACCOUNTS_FILE)
		);
		assert_eq!(
			c.accounts_path("https://sentry1.gcp-uscentral1.cudos.org:1317"),
			Path::new("/project").join(PRIVATE_ACCOUNTS_FILE)
		);
	}

	#[test]
	fn missing_config_file_is_config_error() {
		let dir = tempfile::tempdir().unwrap();
		let err = Config::load_from(dir.path()).unwrap_err();
		assert!(matches!(err, Error::Config(ref m) if m.contains(CONFIG_FILE)));
	}

	#[test]
	fn load_from_disk() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join(CONFIG_FILE), SAMPLE).unwrap();
		let c = Config::load_from(dir.path()).unwrap();
		assert_eq!(c.project_root(), dir.path());
		assert_eq!(c.address_prefix().unwrap(), "cudos");
	}

	#[test]
	fn accounts_keep_file_order_and_reject_unknown_names() {
		let accounts = Accounts::from_json(
			r#"{
				"zed": { "mnemonic": "one two" },
				"alice": { "mnemonic": "three four", "address": "cudos1alice" }
			}"#,
		)
		.unwrap();

		let names: Vec<_> = accounts.iter().map(|(n, _)| n).collect();
		assert_eq!(names, ["zed", "alice"]);
		assert_eq!(accounts.first().unwrap().0, "zed");
		assert_eq!(
			accounts.by_name("alice").unwrap().address.as_deref(),
			Some("cudos1alice")
		);
		assert!(matches!(
			accounts.by_name("carol"),
			Err(Error::UnknownAccount(ref n)) if n == "carol"
		));
	}

	#[test]
	fn missing_accounts_file_is_config_error() {
		let dir = tempfile::tempdir().unwrap();
		let err = Accounts::load(&dir.path().join(LOCAL_ACCOUNTS_FILE)).unwrap_err();
		assert!(matches!(err, Error::Config(ref m) if m.contains(LOCAL_ACCOUNTS_FILE)));
	}
}
