use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Denomination used for bare numeric amounts.
pub const DEFAULT_DENOM: &str = "acudos";

/// Sentinel accepted wherever a gas limit or multiplier is expected.
pub const GAS_AUTO: &str = "auto";

/// Multiplier applied to simulated gas when the fee is fully automatic.
pub const DEFAULT_GAS_MULTIPLIER: f64 = 1.3;

/// Most fractional digits a gas price may carry; `10^38` is the largest
/// power of ten a `u128` holds.
const MAX_PRICE_DECIMALS: usize = 38;

/// An amount of a single denomination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
	pub denom: String,
	#[serde(with = "amount_string")]
	pub amount: u128,
}

impl Coin {
	pub fn new(amount: u128, denom: impl Into<String>) -> Self {
		Self { denom: denom.into(), amount }
	}
}

impl fmt::Display for Coin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}", self.amount, self.denom)
	}
}

impl FromStr for Coin {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		let s = s.trim();
		let split = s
			.find(|c: char| !c.is_ascii_digit())
			.ok_or_else(|| Error::InvalidCoin(s.to_owned()))?;
		let (amount, denom) = s.split_at(split);
		if amount.is_empty() || !is_valid_denom(denom) {
			return Err(Error::InvalidCoin(s.to_owned()));
		}
		let amount = amount
			.parse()
			.map_err(|_| Error::InvalidCoin(s.to_owned()))?;
		Ok(Self::new(amount, denom))
	}
}

/// Parse a comma separated coin list such as `100acudos,5stake`.
pub fn parse_coins(s: &str) -> Result<Vec<Coin>> {
	s.split(',')
		.filter(|part| !part.trim().is_empty())
		.map(Coin::from_str)
		.collect()
}

/// Convert a bare amount such as `"100"` into coins of the default denom.
pub fn funds_from_amount(amount: &str) -> Result<Vec<Coin>> {
	parse_coins(&format!("{}{DEFAULT_DENOM}", amount.trim()))
}

fn is_valid_denom(denom: &str) -> bool {
	let mut chars = denom.chars();
	matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
		&& denom.len() >= 3
		&& chars.all(|c| c.is_ascii_alphanumeric() || "/:._-".contains(c))
}

/// Price of one unit of gas, e.g. `5000000000000acudos` or `0.025acudos`.
///
/// The amount is kept as an integer scaled by `10^decimals` so that fee
/// computation is exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasPrice {
	scaled: u128,
	decimals: u32,
	denom: String,
}

impl GasPrice {
	pub fn denom(&self) -> &str {
		&self.denom
	}

	/// Fee amount for `gas` units, rounded up.
	pub fn amount_for(&self, gas: u64) -> Result<Coin> {
		let overflow = || {
			Error::Config(format!(
				"Fee for {gas} gas at gasPrice {self} does not fit in a coin amount."
			))
		};
		let divisor = 10u128.checked_pow(self.decimals).ok_or_else(overflow)?;
		let total = self
			.scaled
			.checked_mul(u128::from(gas))
			.ok_or_else(overflow)?;
		Ok(Coin::new(total.div_ceil(divisor), self.denom.clone()))
	}
}

impl fmt::Display for GasPrice {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let digits = format!("{:0>width$}", self.scaled, width = self.decimals as usize + 1);
		let (whole, frac) = digits.split_at(digits.len() - self.decimals as usize);
		if frac.is_empty() {
			write!(f, "{whole}{}", self.denom)
		} else {
			write!(f, "{whole}.{frac}{}", self.denom)
		}
	}
}

impl FromStr for GasPrice {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		let invalid = || Error::Config(format!("Invalid gasPrice `{s}` in the config file."));
		let s = s.trim();
		let split = s
			.find(|c: char| !c.is_ascii_digit() && c != '.')
			.ok_or_else(invalid)?;
		let (amount, denom) = s.split_at(split);
		if !is_valid_denom(denom) {
			return Err(invalid());
		}

		let (whole, frac) = match amount.split_once('.') {
			Some((whole, frac)) => (whole, frac),
			None => (amount, ""),
		};
		if (whole.is_empty() && frac.is_empty()) || frac.len() > MAX_PRICE_DECIMALS {
			return Err(invalid());
		}
		let digits = format!("{whole}{frac}");
		let scaled = digits.parse::<u128>().map_err(|_| invalid())?;

		Ok(Self {
			scaled,
			decimals: frac.len() as u32,
			denom: denom.to_owned(),
		})
	}
}

/// A fully computed fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdFee {
	pub amount: Vec<Coin>,
	pub gas: u64,
}

/// Fee requested for one transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Fee {
	/// Simulate and apply the default multiplier.
	Auto,
	/// Simulate and apply the given multiplier.
	Multiplier(f64),
	/// Use this exact fee.
	Explicit(StdFee),
}

/// Explicit gas limit or `auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GasLimit {
	#[default]
	Auto,
	Units(u64),
}

impl FromStr for GasLimit {
	type Err = String;

	fn from_str(s: &str) -> std::result::Result<Self, String> {
		if s.eq_ignore_ascii_case(GAS_AUTO) {
			return Ok(Self::Auto);
		}
		s.parse()
			.map(Self::Units)
			.map_err(|_| format!("expected `{GAS_AUTO}` or a positive integer, got `{s}`"))
	}
}

/// Gas multiplier or `auto`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GasMultiplier {
	#[default]
	Auto,
	Factor(f64),
}

impl FromStr for GasMultiplier {
	type Err = String;

	fn from_str(s: &str) -> std::result::Result<Self, String> {
		if s.eq_ignore_ascii_case(GAS_AUTO) {
			return Ok(Self::Auto);
		}
		match s.parse::<f64>() {
			Ok(factor) if factor.is_finite() && factor > 0.0 => Ok(Self::Factor(factor)),
			_ => Err(format!("expected `{GAS_AUTO}` or a positive number, got `{s}`")),
		}
	}
}

/// Optional gas overrides accepted by transaction-sending operations.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GasOptions {
	pub limit: Option<GasLimit>,
	pub multiplier: Option<GasMultiplier>,
}

impl GasOptions {
	pub fn auto() -> Self {
		Self {
			limit: Some(GasLimit::Auto),
			multiplier: Some(GasMultiplier::Auto),
		}
	}
}

/// Fee of `gas_limit` units at `price`.
pub fn calculate_fee(gas_limit: u64, price: &GasPrice) -> Result<StdFee> {
	Ok(StdFee {
		amount: vec![price.amount_for(gas_limit)?],
		gas: gas_limit,
	})
}

/// Pick the fee for a transaction: explicit limit, then multiplier, then
/// automatic estimation. `gas_price` is only consulted for an explicit limit.
pub fn gas_fee<F>(options: GasOptions, gas_price: F) -> Result<Fee>
where
	F: FnOnce() -> Result<GasPrice>,
{
	match options.limit {
		None | Some(GasLimit::Auto) => Ok(match options.multiplier {
			None | Some(GasMultiplier::Auto) => Fee::Auto,
			Some(GasMultiplier::Factor(factor)) => Fee::Multiplier(factor),
		}),
		Some(GasLimit::Units(limit)) => Ok(Fee::Explicit(calculate_fee(limit, &gas_price()?)?)),
	}
}

mod amount_string {
	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(amount: &u128, s: S) -> Result<S::Ok, S::Error> {
		s.serialize_str(&amount.to_string())
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u128, D::Error> {
		let raw = String::deserialize(d)?;
		raw.parse().map_err(serde::de::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn price() -> GasPrice {
		"5000000000000acudos".parse().unwrap()
	}

	#[test]
	fn auto_and_auto_is_auto() {
		let fee = gas_fee(GasOptions::auto(), || panic!("price not needed")).unwrap();
		assert_eq!(fee, Fee::Auto);

		let fee = gas_fee(GasOptions::default(), || panic!("price not needed")).unwrap();
		assert_eq!(fee, Fee::Auto);
	}

	#[test]
	fn multiplier_without_limit_passes_through() {
		let options = GasOptions {
			limit: Some(GasLimit::Auto),
			multiplier: Some(GasMultiplier::Factor(1.5)),
		};
		let fee = gas_fee(options, || panic!("price not needed")).unwrap();
		assert_eq!(fee, Fee::Multiplier(1.5));

		let options = GasOptions {
			limit: None,
			multiplier: Some(GasMultiplier::Factor(2.0)),
		};
		assert_eq!(gas_fee(options, || Ok(price())).unwrap(), Fee::Multiplier(2.0));
	}

	#[test]
	fn explicit_limit_uses_config_price() {
		let options = GasOptions {
			limit: Some(GasLimit::Units(200_000)),
			multiplier: Some(GasMultiplier::Factor(3.0)),
		};
		let fee = gas_fee(options, || Ok(price())).unwrap();
		assert_eq!(fee, Fee::Explicit(calculate_fee(200_000, &price()).unwrap()));
		match fee {
			Fee::Explicit(std) => {
				assert_eq!(std.gas, 200_000);
				assert_eq!(std.amount, vec![Coin::new(1_000_000_000_000_000_000, "acudos")]);
			}
			other => panic!("unexpected fee {other:?}"),
		}
	}

	#[test]
	fn explicit_limit_surfaces_missing_price() {
		let options = GasOptions {
			limit: Some(GasLimit::Units(10)),
			multiplier: None,
		};
		let err = gas_fee(options, || Err(Error::Config("Missing gasPrice in the config file.".into())))
			.unwrap_err();
		assert!(matches!(err, Error::Config(_)));
	}

	#[test]
	fn fractional_gas_price_rounds_up() {
		let price: GasPrice = "0.025ucudos".parse().unwrap();
		assert_eq!(price.denom(), "ucudos");
		assert_eq!(price.amount_for(100_001).unwrap(), Coin::new(2501, "ucudos"));
		assert_eq!(price.amount_for(0).unwrap(), Coin::new(0, "ucudos"));
		assert_eq!(price.to_string(), "0.025ucudos");
		assert_eq!(self::price().to_string(), "5000000000000acudos");
	}

	#[test]
	fn gas_price_precision_is_bounded() {
		let longest = format!("0.{}1acudos", "0".repeat(MAX_PRICE_DECIMALS - 1));
		let price: GasPrice = longest.parse().unwrap();
		assert_eq!(price.amount_for(1).unwrap(), Coin::new(1, "acudos"));

		let too_long = format!("0.{}1acudos", "0".repeat(40));
		assert!(matches!(too_long.parse::<GasPrice>(), Err(Error::Config(_))));
	}

	#[test]
	fn oversized_fee_is_config_error() {
		let price: GasPrice = format!("{}acudos", u128::MAX).parse().unwrap();
		assert_eq!(price.amount_for(1).unwrap(), Coin::new(u128::MAX, "acudos"));
		assert!(matches!(price.amount_for(2), Err(Error::Config(_))));

		let options = GasOptions {
			limit: Some(GasLimit::Units(2)),
			multiplier: None,
		};
		assert!(matches!(gas_fee(options, || Ok(price.clone())), Err(Error::Config(_))));
	}

	#[test]
	fn malformed_gas_price_is_config_error() {
		for bad in ["", "acudos", "12", "1.2.3acudos", "5a"] {
			assert!(
				matches!(bad.parse::<GasPrice>(), Err(Error::Config(_))),
				"{bad} should be rejected"
			);
		}
	}

	#[test]
	fn bare_funds_use_default_denom() {
		assert_eq!(funds_from_amount("100").unwrap(), vec![Coin::new(100, DEFAULT_DENOM)]);
		assert!(funds_from_amount("ten").is_err());
	}

	#[test]
	fn coin_list_parsing() {
		let coins = parse_coins("100acudos, 7ibc/ABCDEF").unwrap();
		assert_eq!(coins, vec![Coin::new(100, "acudos"), Coin::new(7, "ibc/ABCDEF")]);
		assert!(parse_coins("acudos").is_err());
		assert!(parse_coins("").unwrap().is_empty());
	}

	#[test]
	fn gas_setting_parsing() {
		assert_eq!("auto".parse::<GasLimit>().unwrap(), GasLimit::Auto);
		assert_eq!("250000".parse::<GasLimit>().unwrap(), GasLimit::Units(250_000));
		assert!("-1".parse::<GasLimit>().is_err());
		assert_eq!("AUTO".parse::<GasMultiplier>().unwrap(), GasMultiplier::Auto);
		assert_eq!("1.4".parse::<GasMultiplier>().unwrap(), GasMultiplier::Factor(1.4));
		assert!("0".parse::<GasMultiplier>().is_err());
	}

	#[test]
	fn coin_displays_as_amount_and_denom() {
		let coin = Coin::new(100, "acudos");
		assert_eq!(coin.to_string(), "100acudos");
		assert_eq!(coin.to_string().parse::<Coin>().unwrap(), coin);
	}

	#[test]
	fn coin_amount_serializes_as_string() {
		let json = serde_json::to_value(Coin::new(42, "acudos")).unwrap();
		assert_eq!(json, serde_json::json!({ "denom": "acudos", "amount": "42" }));
	}
}
