use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.08 = 8%). Hurdles, splits, cap rates, yields.
pub type Rate = Decimal;

/// Ratios and multiples (e.g., 1.25x DSCR, 1.8x equity multiple)
pub type Multiple = Decimal;

/// An annual interest rate quoted as a percentage (5.5 = 5.5%).
///
/// Loan-facing calculators take their rates in this form while hurdles and
/// cap rates are plain [`Rate`] fractions. Keeping the two apart in the type
/// system stops a `0.055` from being read as a 0.055% coupon.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Percent(pub Decimal);

impl Percent {
    pub const ZERO: Percent = Percent(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Percent(value)
    }

    /// The raw percentage figure (5.5 for 5.5%).
    pub fn value(self) -> Decimal {
        self.0
    }

    /// Decimal fraction equivalent (5.5% -> 0.055).
    pub fn to_rate(self) -> Rate {
        self.0 / dec!(100)
    }

    /// Monthly decimal rate for an annual percentage (5.5% -> 0.055 / 12).
    pub fn monthly_rate(self) -> Rate {
        self.0 / dec!(100) / dec!(12)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }
}

impl From<Decimal> for Percent {
    fn from(value: Decimal) -> Self {
        Percent(value)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_monthly_rate() {
        assert_eq!(Percent(dec!(12)).monthly_rate(), dec!(0.01));
        assert_eq!(Percent(dec!(5.5)).to_rate(), dec!(0.055));
    }

    #[test]
    fn test_percent_is_transparent_in_json() {
        let json = serde_json::to_string(&Percent(dec!(6.75))).unwrap();
        assert_eq!(json, "\"6.75\"");
        let back: Percent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Percent(dec!(6.75)));
    }

    #[test]
    fn test_envelope_carries_version_and_warnings() {
        let out = with_metadata("Test", &dec!(1), vec!["w".into()], 7, dec!(2));
        assert_eq!(out.result, dec!(2));
        assert_eq!(out.warnings, vec!["w".to_string()]);
        assert_eq!(out.metadata.computation_time_us, 7);
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    }
}
