pub mod cli;
pub mod commands;
pub mod config;
pub mod contract;
pub mod error;
pub mod fee;
pub mod helpers;
pub mod network;
pub mod rpc;
pub mod signer;

pub use config::{Account, Accounts, Config};
pub use contract::{ContractState, CudosContract, DeployResult};
pub use error::{Error, Result};
pub use fee::{Coin, Fee, GasLimit, GasMultiplier, GasOptions, GasPrice, StdFee};
pub use helpers::{delay, transfer_tokens_by_name_command};
pub use network::{CudosNetwork, Network};
pub use signer::{ExecuteResult, InstantiateResult, Signer, UploadResult, WalletSigner};
