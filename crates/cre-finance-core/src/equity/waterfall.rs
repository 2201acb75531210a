use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::trace;

use crate::error::CreFinanceError;
use crate::types::*;
use crate::CreFinanceResult;

const RETURN_OF_CAPITAL_LABEL: &str = "Return of Capital";
const RESIDUAL_LABEL: &str = "Residual (50/50)";
const RESIDUAL_LP_SHARE: Rate = dec!(0.5);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A caller-defined hurdle tier. Tiers run in the order given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterfallTier {
    pub label: String,
    /// Tier size as a fraction of total equity (0.08 = 8%)
    pub hurdle_rate: Rate,
    /// LP share of this tier (decimal)
    pub lp_split: Rate,
    /// GP share of this tier (decimal); lp_split + gp_split should be 1
    pub gp_split: Rate,
}

/// Position of a result row in the distribution pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterfallStage {
    /// Pro-rata repayment of contributed equity, always first
    ReturnOfCapital,
    /// A caller-supplied tier
    Hurdle,
    /// Whatever is left after the last tier, split 50/50
    Residual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterfallTierResult {
    pub tier_label: String,
    pub stage: WaterfallStage,
    pub lp_amount: Money,
    pub gp_amount: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterfallResult {
    pub tiers: Vec<WaterfallTierResult>,
    pub total_to_lp: Money,
    pub total_to_gp: Money,
}

// ---------------------------------------------------------------------------
// Distribution
// ---------------------------------------------------------------------------

/// Distributes `total_distributable` through return of capital, the hurdle
/// tiers in order, then a 50/50 residual.
///
/// Each hurdle tier is sized at `total_equity * hurdle_rate` and paid up to
/// what remains. Tiers stop as soon as the pool is exhausted. Every stage
/// that runs appears in the result, so LP plus GP across all rows equals the
/// amount distributed.
pub fn equity_waterfall(
    total_distributable: Money,
    lp_equity: Money,
    gp_equity: Money,
    tiers: &[WaterfallTier],
) -> WaterfallResult {
    let total_equity = lp_equity + gp_equity;
    let mut remaining = total_distributable;
    let mut results = Vec::with_capacity(tiers.len() + 2);

    // Stage 1: return of capital, pro-rata to contributed equity
    let (roc_lp, roc_gp) = if total_equity.is_zero() {
        (Decimal::ZERO, Decimal::ZERO)
    } else {
        let paid = remaining.min(total_equity);
        let to_lp = paid * (lp_equity / total_equity);
        (to_lp, paid - to_lp)
    };
    remaining -= roc_lp + roc_gp;
    results.push(WaterfallTierResult {
        tier_label: RETURN_OF_CAPITAL_LABEL.into(),
        stage: WaterfallStage::ReturnOfCapital,
        lp_amount: roc_lp,
        gp_amount: roc_gp,
    });

    // Stage 2: hurdle tiers in priority order
    for tier in tiers {
        if remaining <= Decimal::ZERO {
            break;
        }
        let tier_target = total_equity * tier.hurdle_rate;
        let paid = remaining.min(tier_target);
        remaining -= paid;
        trace!(tier = %tier.label, %paid, %remaining, "waterfall tier");
        results.push(WaterfallTierResult {
            tier_label: tier.label.clone(),
            stage: WaterfallStage::Hurdle,
            lp_amount: paid * tier.lp_split,
            gp_amount: paid * tier.gp_split,
        });
    }

    // Stage 3: residual
    if remaining > Decimal::ZERO {
        let to_lp = remaining * RESIDUAL_LP_SHARE;
        results.push(WaterfallTierResult {
            tier_label: RESIDUAL_LABEL.into(),
            stage: WaterfallStage::Residual,
            lp_amount: to_lp,
            gp_amount: remaining - to_lp,
        });
    }

    let total_to_lp = results.iter().map(|r| r.lp_amount).sum();
    let total_to_gp = results.iter().map(|r| r.gp_amount).sum();

    WaterfallResult {
        tiers: results,
        total_to_lp,
        total_to_gp,
    }
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterfallInput {
    pub total_distributable: Money,
    pub lp_equity: Money,
    pub gp_equity: Money,
    #[serde(default)]
    pub tiers: Vec<WaterfallTier>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterfallOutput {
    pub tiers: Vec<WaterfallTierResult>,
    pub total_to_lp: Money,
    pub total_to_gp: Money,
    /// LP share of total distributions (decimal)
    pub lp_pct_of_total: Rate,
    /// GP share of total distributions (decimal)
    pub gp_pct_of_total: Rate,
}

/// LP/GP equity waterfall with per-tier audit trail.
pub fn calculate_equity_waterfall(
    input: &WaterfallInput,
) -> CreFinanceResult<ComputationOutput<WaterfallOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    for (field, value) in [
        ("total_distributable", input.total_distributable),
        ("lp_equity", input.lp_equity),
        ("gp_equity", input.gp_equity),
    ] {
        if value < Decimal::ZERO {
            return Err(CreFinanceError::invalid(field, "Value cannot be negative"));
        }
    }
    for (i, tier) in input.tiers.iter().enumerate() {
        if tier.hurdle_rate < Decimal::ZERO {
            return Err(CreFinanceError::invalid(
                &format!("tiers[{i}].hurdle_rate"),
                "Hurdle rate cannot be negative",
            ));
        }
        if tier.lp_split + tier.gp_split != Decimal::ONE {
            warnings.push(format!(
                "Tier '{}' splits sum to {} rather than 1; distributions will not conserve",
                tier.label,
                tier.lp_split + tier.gp_split
            ));
        }
    }
    if (input.lp_equity + input.gp_equity).is_zero() {
        warnings.push("Total equity is zero; no capital returned and hurdle tiers are empty".into());
    }

    let result = equity_waterfall(
        input.total_distributable,
        input.lp_equity,
        input.gp_equity,
        &input.tiers,
    );

    let (lp_pct_of_total, gp_pct_of_total) = if input.total_distributable.is_zero() {
        (Decimal::ZERO, Decimal::ZERO)
    } else {
        (
            result.total_to_lp / input.total_distributable,
            result.total_to_gp / input.total_distributable,
        )
    };

    let output = WaterfallOutput {
        tiers: result.tiers,
        total_to_lp: result.total_to_lp,
        total_to_gp: result.total_to_gp,
        lp_pct_of_total,
        gp_pct_of_total,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Equity Waterfall (Return of Capital, Hurdle Tiers, 50/50 Residual)",
        input,
        warnings,
        elapsed,
        output,
    ))
}
