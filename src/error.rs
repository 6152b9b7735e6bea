use std::path::PathBuf;

/// Errors raised by the contract lifecycle, config and network layers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// A required configuration key or file is missing.
	#[error("{0}")]
	Config(String),

	/// A referenced local artifact does not exist.
	#[error("{0}")]
	NotFound(String),

	/// A lifecycle guard was violated.
	#[error("{0}")]
	InvalidState(String),

	/// The chain node or transport failed.
	#[error("{0}")]
	Network(String),

	/// The account name is not in the accounts file. Custom accounts are
	/// recognized but not supported.
	#[error("account `{0}` is not in the accounts file and custom accounts are not supported")]
	UnknownAccount(String),

	/// A coin string such as `100acudos` could not be parsed.
	#[error("invalid coin string: {0}")]
	InvalidCoin(String),

	/// Key derivation or transaction signing failed.
	#[error("signer error: {0}")]
	Signer(String),

	#[error("failed to read {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Toml(#[from] toml::de::Error),
}

impl From<reqwest::Error> for Error {
	fn from(err: reqwest::Error) -> Self {
		Self::Network(err.to_string())
	}
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
