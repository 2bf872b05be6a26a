//! The fixed universe of tracked currency pairs.

use anyhow::Result;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum CurrencyPair {
    UsdEur,
    UsdGbp,
    UsdJpy,
    EurGbp,
    EurJpy,
    GbpJpy,
}

impl CurrencyPair {
    /// All tracked pairs, in display order.
    pub fn all() -> [CurrencyPair; 6] {
        [
            CurrencyPair::UsdEur,
            CurrencyPair::UsdGbp,
            CurrencyPair::UsdJpy,
            CurrencyPair::EurGbp,
            CurrencyPair::EurJpy,
            CurrencyPair::GbpJpy,
        ]
    }

    pub fn base(&self) -> &'static str {
        match self {
            CurrencyPair::UsdEur | CurrencyPair::UsdGbp | CurrencyPair::UsdJpy => "USD",
            CurrencyPair::EurGbp | CurrencyPair::EurJpy => "EUR",
            CurrencyPair::GbpJpy => "GBP",
        }
    }

    pub fn quote(&self) -> &'static str {
        match self {
            CurrencyPair::UsdEur => "EUR",
            CurrencyPair::UsdGbp | CurrencyPair::EurGbp => "GBP",
            CurrencyPair::UsdJpy | CurrencyPair::EurJpy | CurrencyPair::GbpJpy => "JPY",
        }
    }

    /// Decimal places for rendering rates in this pair. JPY quotes trade in
    /// larger units and are conventionally shown with two decimals.
    pub fn display_decimals(&self) -> usize {
        if self.quote() == "JPY" { 2 } else { 4 }
    }
}

impl Display for CurrencyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base(), self.quote())
    }
}

impl FromStr for CurrencyPair {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USD/EUR" => Ok(CurrencyPair::UsdEur),
            "USD/GBP" => Ok(CurrencyPair::UsdGbp),
            "USD/JPY" => Ok(CurrencyPair::UsdJpy),
            "EUR/GBP" => Ok(CurrencyPair::EurGbp),
            "EUR/JPY" => Ok(CurrencyPair::EurJpy),
            "GBP/JPY" => Ok(CurrencyPair::GbpJpy),
            _ => Err(anyhow::anyhow!("Unknown currency pair: {}", s)),
        }
    }
}

// Pairs travel on the wire as "BASE/QUOTE" strings, including as JSON map
// keys, so serde delegates to Display/FromStr.
impl Serialize for CurrencyPair {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CurrencyPair {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
