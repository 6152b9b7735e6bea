pub mod accounts;
pub mod contract;
pub mod init;

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::cli::{Cli, TxArgs};
use crate::config::Config;
use crate::fee::GasOptions;
use crate::network::CudosNetwork;
use crate::signer::WalletSigner;

/// Load the project config and connect to the endpoint chosen by CLI flags,
/// `BLAST_NETWORK` or the config file, in that order.
pub fn resolve_network(cli: &Cli) -> Result<Arc<CudosNetwork>> {
	let config = Config::load()?;
	let url = match &cli.rpc_url {
		Some(url) => url.clone(),
		None => config.network_url_for(cli.network.as_deref())?,
	};
	Ok(Arc::new(CudosNetwork::with_url(config, &url)))
}

/// Signer for `--account`, or `None` to let the contract use the default.
pub fn resolve_signer(network: &CudosNetwork, account: Option<&str>) -> Result<Option<WalletSigner>> {
	account
		.map(|name| network.signer_for(name))
		.transpose()
		.map_err(Into::into)
}

pub fn gas_options(tx: &TxArgs) -> GasOptions {
	GasOptions {
		limit: tx.gas_limit,
		multiplier: tx.gas_multiplier,
	}
}

pub fn parse_msg(msg: &str) -> Result<Value> {
	serde_json::from_str(msg).with_context(|| format!("--msg is not valid JSON: {msg}"))
}
