use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::CreFinanceError;
use crate::types::*;
use crate::CreFinanceResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub name: String,
    pub contribution: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerAllocation {
    pub name: String,
    pub contribution: Money,
    /// Share of total contributions (decimal)
    pub ownership_pct: Rate,
    pub distribution: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerSplitResult {
    pub partners: Vec<PartnerAllocation>,
    pub total_contributed: Money,
    pub total_distributed: Money,
}

/// Pro-rata split of a distribution by capital contributed.
///
/// Partners keep their input order. If nobody contributed, every ownership
/// and distribution is zero.
pub fn partner_equity_split(partners: &[Partner], total_distribution: Money) -> PartnerSplitResult {
    let total_contributed: Money = partners.iter().map(|p| p.contribution).sum();

    let allocations: Vec<PartnerAllocation> = partners
        .iter()
        .map(|p| {
            let ownership_pct = if total_contributed.is_zero() {
                Decimal::ZERO
            } else {
                p.contribution / total_contributed
            };
            PartnerAllocation {
                name: p.name.clone(),
                contribution: p.contribution,
                ownership_pct,
                distribution: total_distribution * ownership_pct,
            }
        })
        .collect();

    let total_distributed = allocations.iter().map(|a| a.distribution).sum();

    PartnerSplitResult {
        partners: allocations,
        total_contributed,
        total_distributed,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerSplitInput {
    pub partners: Vec<Partner>,
    pub total_distribution: Money,
}

/// Partner-level distribution split with validation.
pub fn calculate_partner_split(
    input: &PartnerSplitInput,
) -> CreFinanceResult<ComputationOutput<PartnerSplitResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.partners.is_empty() {
        return Err(CreFinanceError::InsufficientData(
            "At least one partner is required".into(),
        ));
    }
    for (i, partner) in input.partners.iter().enumerate() {
        if partner.contribution < Decimal::ZERO {
            return Err(CreFinanceError::invalid(
                &format!("partners[{i}].contribution"),
                "Contribution cannot be negative",
            ));
        }
    }
    if input.total_distribution < Decimal::ZERO {
        return Err(CreFinanceError::invalid(
            "total_distribution",
            "Distribution cannot be negative",
        ));
    }

    let result = partner_equity_split(&input.partners, input.total_distribution);

    if result.total_contributed.is_zero() {
        warnings.push("No capital contributed; nothing is distributed".into());
    } else if (result.total_distributed - input.total_distribution).abs() > Decimal::new(1, 2) {
        warnings.push(format!(
            "Rounding left {} undistributed",
            input.total_distribution - result.total_distributed
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Pro-Rata Partner Split by Contributed Capital",
        input,
        warnings,
        elapsed,
        result,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn partner(name: &str, contribution: Decimal) -> Partner {
        Partner {
            name: name.into(),
            contribution,
        }
    }

    #[test]
    fn test_pro_rata_split() {
        let partners = vec![
            partner("Sponsor", dec!(100000)),
            partner("Fund I", dec!(600000)),
            partner("Family Office", dec!(300000)),
        ];
        let result = partner_equity_split(&partners, dec!(250000));

        assert_eq!(result.total_contributed, dec!(1000000));
        assert_eq!(result.partners[0].name, "Sponsor");
        assert_eq!(result.partners[0].ownership_pct, dec!(0.1));
        assert_eq!(result.partners[1].distribution, dec!(150000));
        assert_eq!(result.partners[2].distribution, dec!(75000));
        assert_eq!(result.total_distributed, dec!(250000));
    }

    #[test]
    fn test_ownership_sums_to_one() {
        let partners = vec![
            partner("A", dec!(1)),
            partner("B", dec!(1)),
            partner("C", dec!(1)),
        ];
        let result = partner_equity_split(&partners, dec!(1000000));
        let ownership: Decimal = result.partners.iter().map(|p| p.ownership_pct).sum();
        assert!((ownership - Decimal::ONE).abs() < dec!(0.0000000001));
        assert!((result.total_distributed - dec!(1000000)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_zero_contributions_distribute_nothing() {
        let partners = vec![partner("A", Decimal::ZERO), partner("B", Decimal::ZERO)];
        let result = partner_equity_split(&partners, dec!(500000));
        assert!(result
            .partners
            .iter()
            .all(|p| p.ownership_pct.is_zero() && p.distribution.is_zero()));
        assert_eq!(result.total_distributed, Decimal::ZERO);
    }

    #[test]
    fn test_empty_partner_list() {
        let result = partner_equity_split(&[], dec!(500000));
        assert!(result.partners.is_empty());
        assert_eq!(result.total_contributed, Decimal::ZERO);
    }

    #[test]
    fn test_calculate_partner_split_requires_partners() {
        let input = PartnerSplitInput {
            partners: vec![],
            total_distribution: dec!(100),
        };
        assert!(matches!(
            calculate_partner_split(&input),
            Err(CreFinanceError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_calculate_partner_split_warns_without_capital() {
        let input = PartnerSplitInput {
            partners: vec![partner("A", Decimal::ZERO)],
            total_distribution: dec!(100),
        };
        let out = calculate_partner_split(&input).unwrap();
        assert_eq!(out.warnings.len(), 1);
    }
}
