use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use crate::cli::TxArgs;
use crate::commands::{gas_options, parse_msg, resolve_signer};
use crate::contract::CudosContract;
use crate::network::CudosNetwork;
use crate::signer::{Signer, WalletSigner};

pub async fn upload(network: Arc<CudosNetwork>, artifact: &str, tx: &TxArgs) -> Result<()> {
	let signer = resolve_signer(&network, tx.account.as_deref())?;
	let mut contract = CudosContract::from_local(network, artifact)?;
	let result = contract
		.upload_code(as_dyn(&signer), gas_options(tx))
		.await?;

	println!("Uploaded {artifact}");
	println!("  Code ID: {}", result.code_id);
	println!("  Creator: {}", contract.creator().unwrap_or_default());
	print_json(&result)
}

pub async fn deploy(
	network: Arc<CudosNetwork>,
	artifact: &str,
	msg: &str,
	label: &str,
	funds: Option<&str>,
	account: Option<&str>,
) -> Result<()> {
	let msg = parse_msg(msg)?;
	let signer = resolve_signer(&network, account)?;
	let mut contract = CudosContract::from_local(network, artifact)?;
	let result = contract.deploy(&msg, label, as_dyn(&signer), funds).await?;

	println!("Deployed {artifact}");
	println!("  Code ID: {}", result.upload_tx.code_id);
	println!("  Address: {}", result.instantiate_tx.contract_address);
	println!("  Label:   {label}");
	print_json(&result)
}

pub async fn instantiate(
	network: Arc<CudosNetwork>,
	code_id: u64,
	msg: &str,
	label: &str,
	funds: Option<&str>,
	tx: &TxArgs,
) -> Result<()> {
	let msg = parse_msg(msg)?;
	let signer = resolve_signer(&network, tx.account.as_deref())?;
	let contract = CudosContract::from_code_id(network, code_id).await?;
	let result = contract
		.instantiate(&msg, label, as_dyn(&signer), funds, gas_options(tx))
		.await?;

	println!("Instantiated code {code_id}");
	println!("  Address: {}", result.contract_address);
	print_json(&result)
}

pub async fn execute(network: Arc<CudosNetwork>, address: &str, msg: &str, tx: &TxArgs) -> Result<()> {
	let msg = parse_msg(msg)?;
	let signer = resolve_signer(&network, tx.account.as_deref())?;
	let contract = CudosContract::from_address(network, address).await?;
	let result = contract
		.execute(&msg, as_dyn(&signer), gas_options(tx))
		.await?;

	println!("Executed on {address}");
	print_json(&result)
}

pub async fn query(
	network: Arc<CudosNetwork>,
	address: &str,
	msg: &str,
	account: Option<&str>,
) -> Result<()> {
	let msg = parse_msg(msg)?;
	let signer = resolve_signer(&network, account)?;
	let contract = CudosContract::from_address(network, address).await?;
	let result = contract.query(&msg, as_dyn(&signer)).await?;
	print_json(&result)
}

fn as_dyn(signer: &Option<WalletSigner>) -> Option<&dyn Signer> {
	signer.as_ref().map(|s| s as &dyn Signer)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}
