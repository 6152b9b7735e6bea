use anyhow::Result;

use crate::network::CudosNetwork;
use crate::signer::Signer;

/// Print every account of the selected network with its derived address.
pub fn run(network: &CudosNetwork) -> Result<()> {
	let accounts = network.accounts()?;
	let default = network.config().config.default_account.as_deref();

	println!("Network: {}", network.url());
	for (name, account) in accounts.iter() {
		let signer = network.signer(&account.mnemonic)?;
		let marker = if Some(name) == default { " (default)" } else { "" };
		println!("  {name:<12} {}{marker}", signer.address());
	}

	if accounts.is_empty() {
		println!("No accounts found.");
	}
	Ok(())
}
