use serde_json::Value;

use super::{cell_text, result_of};

/// Headline figure of each calculator, checked in order.
const HEADLINE_KEYS: [&str; 15] = [
    "max_loan_amount",
    "dscr",
    "debt_yield",
    "ltv",
    "cap_rate",
    "property_value",
    "cash_on_cash",
    "blended_rate",
    "monthly_savings",
    "irr",
    "total_reserve",
    "total_to_lp",
    "total_distributed",
    "equity_multiple",
    "monthly_payment",
];

/// Print just the headline value of a calculation.
///
/// Falls back to the first field of the result when no headline key is
/// present.
pub fn print_minimal(value: &Value) {
    println!("{}", headline(value));
}

fn headline(value: &Value) -> String {
    let result = result_of(value);

    if let Value::Object(map) = result {
        for key in HEADLINE_KEYS {
            if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                return cell_text(val);
            }
        }
        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, cell_text(val));
        }
    }

    cell_text(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_loan_payment_headline() {
        let out = json!({"result": {"annual_payment": "681346.80", "monthly_payment": "56778.90"}});
        assert_eq!(headline(&out), "56778.90");
    }

    #[test]
    fn test_max_loan_wins_over_its_payment() {
        let out = json!({"result": {"monthly_payment": "46875", "max_loan_amount": "8806088.16"}});
        assert_eq!(headline(&out), "8806088.16");
    }

    #[test]
    fn test_null_headline_is_skipped() {
        let out = json!({"result": {"irr": null, "equity_multiple": "1.92"}});
        assert_eq!(headline(&out), "1.92");
    }
}
