//! Query and increment a deployed counter contract.
//!
//! Run it from the project root with `cargo run --bin interact`.

use std::sync::Arc;

use cudos_blast::{Config, CudosContract, CudosNetwork, GasOptions, Signer};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let network = Arc::new(CudosNetwork::connect(Config::load()?)?);
	let signers = network.signers()?;
	let [alice, bob, ..] = signers.as_slice() else {
		anyhow::bail!("accounts file needs at least two accounts");
	};

	let contract =
		CudosContract::from_address(network.clone(), "cudos1uul3yzm2lgskp3dxpj0zg558hppxk6pt8t00qa")
			.await?;

	let query_get_count = json!({ "get_count": {} });
	let count = contract.query(&query_get_count, Some(bob as &dyn Signer)).await?;
	println!("Initial count: {}", count["count"]);

	let msg_increment = json!({ "increment": {} });
	let result = contract
		.execute(&msg_increment, Some(bob as &dyn Signer), GasOptions::default())
		.await?;
	println!("{}", serde_json::to_string_pretty(&result)?);

	let count = contract.query(&query_get_count, Some(alice as &dyn Signer)).await?;
	println!("Count after increment: {}", count["count"]);

	Ok(())
}
