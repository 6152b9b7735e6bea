use std::path::Path;

use anyhow::{Context, Result};

/// Files of the sample project, relative to its root.
const TEMPLATE: &[(&str, &str)] = &[
	("Cargo.toml", include_str!("../../template/Cargo.toml.in")),
	("blast.config.toml", include_str!("../../template/blast.config.toml")),
	("accounts.json", include_str!("../../template/accounts.json")),
	(
		"private-accounts.json",
		include_str!("../../template/private-accounts.json"),
	),
	("artifacts/.gitkeep", include_str!("../../template/artifacts/.gitkeep")),
	("scripts/interact.rs", include_str!("../../template/scripts/interact.rs")),
];

pub fn run(dir: &Path) -> Result<()> {
	if !dir.as_os_str().is_empty() && dir != Path::new(".") && !dir.exists() {
		println!("Directory does not exist, creating and initializing it...");
		if let Err(e) = std::fs::create_dir_all(dir) {
			println!(
				"Directory does not exist and was not able to create it, \
				 please check your write permissions and/or path itself"
			);
			return Err(e).with_context(|| format!("creating {}", dir.display()));
		}
	}

	write_template(dir)?;

	let shown = if dir == Path::new(".") {
		std::env::current_dir()?
	} else {
		dir.to_path_buf()
	};
	println!("Success! Sample project initialized in {}", shown.display());
	Ok(())
}

/// Write every template file under `dir`, replacing existing ones.
pub fn write_template(dir: &Path) -> Result<()> {
	for (relative, content) in TEMPLATE {
		let path = dir.join(relative);
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)
				.with_context(|| format!("creating {}", parent.display()))?;
		}
		std::fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
		tracing::debug!(path = %path.display(), "Wrote template file");
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::{Accounts, Config, LOCAL_ACCOUNTS_FILE};

	#[test]
	fn creates_missing_directory_and_writes_template() {
		let tmp = tempfile::tempdir().unwrap();
		let dir = tmp.path().join("nested/project");

		run(&dir).unwrap();

		for (relative, _) in TEMPLATE {
			assert!(dir.join(relative).is_file(), "{relative} missing");
		}
		assert!(dir.join("artifacts").is_dir());

		let manifest = std::fs::read_to_string(dir.join("Cargo.toml")).unwrap();
		let manifest: toml::Value = toml::from_str(&manifest).unwrap();
		let bin = &manifest["bin"][0];
		assert_eq!(bin["name"].as_str(), Some("interact"));
		assert_eq!(bin["path"].as_str(), Some("scripts/interact.rs"));
		assert!(dir.join(bin["path"].as_str().unwrap()).is_file());
		for dep in ["cudos-blast", "tokio", "serde_json", "anyhow"] {
			assert!(manifest["dependencies"].get(dep).is_some(), "{dep} missing");
		}
	}

	#[test]
	fn template_config_and_accounts_load() {
		let tmp = tempfile::tempdir().unwrap();
		write_template(tmp.path()).unwrap();

		let config = Config::load_from(tmp.path()).unwrap();
		assert_eq!(config.address_prefix().unwrap(), "cudos");
		assert_eq!(config.default_account().unwrap(), "alice");
		assert!(config.gas_price().is_ok());

		let url = config.network_url_for(None).unwrap();
		assert!(config.is_local(&url));
		let accounts = Accounts::load(&tmp.path().join(LOCAL_ACCOUNTS_FILE)).unwrap();
		assert!(accounts.by_name("alice").is_ok());
		assert!(accounts.len() >= 2);
	}

	#[test]
	fn overwrites_existing_files() {
		let tmp = tempfile::tempdir().unwrap();
		std::fs::write(tmp.path().join("blast.config.toml"), "stale").unwrap();

		write_template(tmp.path()).unwrap();

		let content = std::fs::read_to_string(tmp.path().join("blast.config.toml")).unwrap();
		assert!(content.contains("address_prefix"));
	}
}
