use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::fee::{GasLimit, GasMultiplier};

#[derive(Parser)]
#[command(
	name = "blast",
	about = "Scaffold, upload, instantiate and call CosmWasm contracts on Cudos.",
	version
)]
pub struct Cli {
	/// Named network from the [networks] section of blast.config.toml.
	#[arg(long, env = "BLAST_NETWORK", global = true)]
	pub network: Option<String>,

	/// Override the node REST endpoint URL.
	#[arg(long, global = true)]
	pub rpc_url: Option<String>,

	/// Log debug output to stderr.
	#[arg(short, long, global = true)]
	pub verbose: bool,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
	/// Create a sample project from the bundled template.
	Init {
		/// Target directory, created if missing.
		#[arg(long, default_value = ".")]
		dir: PathBuf,
	},

	/// Upload artifacts/<ARTIFACT>.wasm and print the code id.
	Upload {
		/// Artifact name without the .wasm extension.
		artifact: String,

		#[command(flatten)]
		tx: TxArgs,
	},

	/// Upload and instantiate a local artifact in one step.
	Deploy {
		/// Artifact name without the .wasm extension.
		artifact: String,

		/// Instantiate message as JSON.
		#[arg(long)]
		msg: String,

		/// Label of the new contract instance.
		#[arg(long)]
		label: String,

		/// Amount of acudos sent to the new contract.
		#[arg(long)]
		funds: Option<String>,

		/// Account from the accounts file to sign with.
		#[arg(long)]
		account: Option<String>,
	},

	/// Instantiate code already stored on chain.
	Instantiate {
		code_id: u64,

		/// Instantiate message as JSON.
		#[arg(long)]
		msg: String,

		/// Label of the new contract instance.
		#[arg(long)]
		label: String,

		/// Amount of acudos sent to the new contract.
		#[arg(long)]
		funds: Option<String>,

		#[command(flatten)]
		tx: TxArgs,
	},

	/// Execute a message on a deployed contract.
	Execute {
		/// Contract address.
		address: String,

		/// Execute message as JSON.
		#[arg(long)]
		msg: String,

		#[command(flatten)]
		tx: TxArgs,
	},

	/// Run a smart query against a deployed contract.
	Query {
		/// Contract address.
		address: String,

		/// Query message as JSON.
		#[arg(long)]
		msg: String,

		/// Account whose connection is used.
		#[arg(long)]
		account: Option<String>,
	},

	/// List accounts for the selected network.
	Accounts,
}

/// Signer and gas options shared by transaction commands.
#[derive(Args)]
pub struct TxArgs {
	/// Account from the accounts file to sign with.
	#[arg(long)]
	pub account: Option<String>,

	/// Gas limit, or "auto" to estimate.
	#[arg(long)]
	pub gas_limit: Option<GasLimit>,

	/// Multiplier applied to estimated gas, or "auto".
	#[arg(long)]
	pub gas_multiplier: Option<GasMultiplier>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::CommandFactory;

	#[test]
	fn cli_definition_is_valid() {
		Cli::command().debug_assert();
	}

	#[test]
	fn parses_gas_options() {
		let cli = Cli::try_parse_from([
			"blast",
			"execute",
			"cudos1abc",
			"--msg",
			"{}",
			"--gas-limit",
			"200000",
			"--gas-multiplier",
			"auto",
		])
		.unwrap();
		match cli.command {
			Command::Execute { address, tx, .. } => {
				assert_eq!(address, "cudos1abc");
				assert_eq!(tx.gas_limit, Some(GasLimit::Units(200_000)));
				assert_eq!(tx.gas_multiplier, Some(GasMultiplier::Auto));
			}
			_ => panic!("expected execute"),
		}
	}

	#[test]
	fn rejects_bad_gas_limit() {
		assert!(Cli::try_parse_from([
			"blast", "upload", "counter", "--gas-limit", "lots"
		])
		.is_err());
	}
}
