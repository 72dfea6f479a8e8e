use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Unit meaning "a rough amount, use your judgement". Forces an entry out of numeric totals.
pub const ESTIMATE_UNIT: &str = "olhómetro";
/// How estimate rows render their quantity.
pub const ESTIMATE_TOKEN: &str = "q.b.";

/// Ingredient quantity as stored in the catalog: a JSON number, or anything else
/// ("to taste", null, a range object...) kept verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Quantity {
    Number(f64),
    Other(Value),
}

impl Default for Quantity {
    fn default() -> Self { Quantity::Other(Value::Null) }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Classified<'a> {
    Scalable(f64),
    Estimate(&'a Quantity),
}

/// Never fails: anything that is not a finite number under a regular unit is an estimate.
pub fn classify<'a>(quantity: &'a Quantity, unit: Option<&str>) -> Classified<'a> {
    if unit == Some(ESTIMATE_UNIT) {
        return Classified::Estimate(quantity);
    }
    match quantity {
        Quantity::Number(n) if n.is_finite() => Classified::Scalable(*n),
        _ => Classified::Estimate(quantity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn q(v: Value) -> Quantity { serde_json::from_value(v).unwrap() }

    #[test]
    fn numbers_with_regular_units_scale() {
        assert_eq!(classify(&q(json!(200)), Some("g")), Classified::Scalable(200.0));
        assert_eq!(classify(&q(json!(0.5)), None), Classified::Scalable(0.5));
    }

    #[test]
    fn estimate_unit_wins_over_numeric_quantity() {
        let quantity = q(json!(2));
        assert_eq!(classify(&quantity, Some(ESTIMATE_UNIT)), Classified::Estimate(&quantity));
    }

    #[test]
    fn text_and_null_quantities_are_estimates() {
        for raw in [json!("to taste"), json!("200"), json!(null), json!(true), json!({"min": 1, "max": 2})] {
            let quantity = q(raw.clone());
            assert!(matches!(classify(&quantity, Some("g")), Classified::Estimate(_)), "{raw}");
        }
    }

    #[test]
    fn non_finite_numbers_degrade_to_estimate() {
        let quantity = Quantity::Number(f64::NAN);
        assert!(matches!(classify(&quantity, Some("g")), Classified::Estimate(_)));
    }

    #[test]
    fn missing_quantity_deserializes_as_null() {
        assert_eq!(Quantity::default(), Quantity::Other(Value::Null));
    }
}
