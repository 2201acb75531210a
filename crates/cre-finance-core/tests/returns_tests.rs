use cre_finance_core::returns::irr::{self, IrrStatus};
use cre_finance_core::time_value::npv;
use cre_finance_core::CreFinanceError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// IRR solver
// ===========================================================================

#[test]
fn test_irr_single_period_ten_percent() {
    let result = irr::irr_and_equity_multiple(dec!(100), &[dec!(110)], Decimal::ZERO);
    assert!(
        (result.irr - dec!(0.10)).abs() < dec!(0.0001),
        "Expected IRR 10%, got {}",
        result.irr
    );
    assert!(result.status.is_converged());
}

#[test]
fn test_irr_zeroes_npv() {
    let flows = [dec!(-2500000), dec!(150000), dec!(160000), dec!(170000), dec!(3300000)];
    let (rate, status) = irr::solve_irr(&flows);
    assert_eq!(status, IrrStatus::Converged);
    let residual = npv(rate, &flows).unwrap();
    assert!(residual.abs() < dec!(0.01), "NPV at IRR was {}", residual);
}

#[test]
fn test_irr_even_annuity() {
    // -1000, +400 x3 => IRR ~9.7%
    let (rate, _) = irr::solve_irr(&[dec!(-1000), dec!(400), dec!(400), dec!(400)]);
    assert!((rate - dec!(0.097)).abs() < dec!(0.001), "IRR {}", rate);
}

#[test]
fn test_break_even_hold_has_zero_irr() {
    let result = irr::irr_and_equity_multiple(dec!(1000000), &[Decimal::ZERO; 4], dec!(1000000));
    assert!(result.irr.abs() < dec!(0.0000001));
    assert_eq!(result.equity_multiple, Decimal::ONE);
}

#[test]
fn test_irr_degenerate_inputs() {
    let zero = irr::irr_and_equity_multiple(Decimal::ZERO, &[dec!(50000)], dec!(1000000));
    assert_eq!(zero.irr, Decimal::ZERO);
    assert_eq!(zero.equity_multiple, Decimal::ZERO);

    let empty = irr::irr_and_equity_multiple(dec!(1000000), &[], dec!(1000000));
    assert_eq!(empty.irr, Decimal::ZERO);
    assert_eq!(empty.equity_multiple, Decimal::ZERO);
    assert_eq!(empty.status, IrrStatus::NotAttempted);
}

#[test]
fn test_irr_stays_within_clamp() {
    let patterns: [&[Decimal]; 4] = [
        &[dec!(-1), dec!(1000)],
        &[dec!(-100), dec!(-50), dec!(-50)],
        &[dec!(-100), dec!(230), dec!(-132)],
        &[dec!(-100), Decimal::ZERO, Decimal::ZERO, dec!(1)],
    ];
    for flows in patterns {
        let (rate, _) = irr::solve_irr(flows);
        assert!(rate >= dec!(-0.99) && rate <= dec!(10), "{:?} -> {}", flows, rate);
    }
}

#[test]
fn test_calculate_irr_flags_non_convergence() {
    let input = irr::IrrInput {
        initial_investment: dec!(100),
        cash_flows: vec![dec!(-10), dec!(-10)],
        exit_proceeds: Decimal::ZERO,
    };
    let out = irr::calculate_irr(&input).unwrap();
    assert!(!out.result.status.is_converged());
    assert_eq!(out.warnings.len(), 1);
}

#[test]
fn test_calculate_irr_rejects_negative_investment() {
    let input = irr::IrrInput {
        initial_investment: dec!(-100),
        cash_flows: vec![dec!(10)],
        exit_proceeds: dec!(100),
    };
    assert!(matches!(
        irr::calculate_irr(&input),
        Err(CreFinanceError::InvalidInput { .. })
    ));
}

#[test]
fn test_calculate_irr_json_shape() {
    let input: irr::IrrInput = serde_json::from_str(
        r#"{"initial_investment":"1000000","cash_flows":["80000","82000","84000","86000","88000"],"exit_proceeds":"1500000"}"#,
    )
    .unwrap();
    let out = irr::calculate_irr(&input).unwrap();
    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["result"]["status"], "converged");
    let multiple: Decimal = json["result"]["equity_multiple"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(multiple, dec!(1.92));
    assert_eq!(json["result"]["sensitivity"].as_array().unwrap().len(), 13);
}
