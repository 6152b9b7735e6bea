use std::time::Duration;

use crate::fee::DEFAULT_DENOM;

/// Sleep for `seconds`.
pub async fn delay(seconds: u64) {
	tokio::time::sleep(Duration::from_secs(seconds)).await;
}

/// Shell command that moves `amount` of the default denom between two keys
/// of a local node's test keyring.
pub fn transfer_tokens_by_name_command(from_name: &str, to_name: &str, amount: u128) -> String {
	format!(
		"cudos-noded tx bank send {from_name} $(cudos-noded keys show {to_name} --keyring-backend test -a) \
		 {amount}{DEFAULT_DENOM} --keyring-backend test --chain-id cudos-network --yes"
	)
}
