use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cudos_blast::cli::{Cli, Command};
use cudos_blast::commands::{self, resolve_network};

fn init_tracing(verbose: bool) {
	let fallback = if verbose { "cudos_blast=debug" } else { "cudos_blast=info" };

	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
		.with(
			tracing_subscriber::fmt::layer()
				.with_writer(std::io::stderr)
				.with_target(false),
		)
		.init();
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	init_tracing(cli.verbose);

	match &cli.command {
		Command::Init { dir } => commands::init::run(dir),
		Command::Accounts => {
			let network = resolve_network(&cli)?;
			commands::accounts::run(&network)
		}
		Command::Upload { artifact, tx } => {
			commands::contract::upload(resolve_network(&cli)?, artifact, tx).await
		}
		Command::Deploy {
			artifact,
			msg,
			label,
			funds,
			account,
		} => {
			commands::contract::deploy(
				resolve_network(&cli)?,
				artifact,
				msg,
				label,
				funds.as_deref(),
				account.as_deref(),
			)
			.await
		}
		Command::Instantiate {
			code_id,
			msg,
			label,
			funds,
			tx,
		} => {
			commands::contract::instantiate(
				resolve_network(&cli)?,
				*code_id,
				msg,
				label,
				funds.as_deref(),
				tx,
			)
			.await
		}
		Command::Execute { address, msg, tx } => {
			commands::contract::execute(resolve_network(&cli)?, address, msg, tx).await
		}
		Command::Query {
			address,
			msg,
			account,
		} => {
			commands::contract::query(resolve_network(&cli)?, address, msg, account.as_deref())
				.await
		}
	}
}
