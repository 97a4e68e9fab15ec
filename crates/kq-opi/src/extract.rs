//! Pull an OPI out of whatever JSON the endpoint returns.
//!
//! Several upstream schemas are recognized. Fields are checked in a fixed
//! order and the first one present wins; `null` counts as absent.

use kq_core::Opi;
use serde_json::Value;

use crate::error::FetchFailure;

/// How a recognized field maps onto `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scale {
    /// Already a percentage; rounded.
    PercentRounded,
    /// Already a percentage; truncated.
    PercentTruncated,
    /// Five-step level; each step is 20 points.
    FiveStep,
    /// Ratio in `0..=1`.
    Ratio,
}

/// Top-level fields in priority order.
const FIELDS: &[(&str, Scale)] = &[
    ("people_percent", Scale::PercentRounded),
    ("congestion_rate", Scale::PercentRounded),
    ("crowd_level", Scale::FiveStep),
    ("density", Scale::Ratio),
    ("traffic_index", Scale::PercentTruncated),
];

/// Extract and clamp an OPI from a response body.
pub fn opi_from_json(body: &Value) -> Result<Opi, FetchFailure> {
    for (field, scale) in FIELDS {
        if let Some(raw) = present(body.get(field)) {
            return convert(field, raw, *scale);
        }
    }

    if let Some(raw) = present(body.get("data").and_then(|d| d.get("congestion"))) {
        return convert("data.congestion", raw, Scale::PercentRounded);
    }

    if let Some(first) = body
        .get("results")
        .and_then(Value::as_array)
        .and_then(|items| items.first())
    {
        return opi_from_json(first);
    }

    Err(FetchFailure::NoSignal)
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn convert(field: &str, raw: &Value, scale: Scale) -> Result<Opi, FetchFailure> {
    let number = as_number(raw)
        .ok_or_else(|| FetchFailure::InvalidValue(format!("{field} = {raw}")))?;
    let scaled = match scale {
        Scale::PercentRounded => number.round(),
        Scale::PercentTruncated => number,
        Scale::FiveStep => number.trunc() * 20.0,
        Scale::Ratio => number * 100.0,
    };
    Opi::from_f64(scaled).ok_or_else(|| FetchFailure::InvalidValue(format!("{field} = {raw}")))
}

fn as_number(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn opi(body: Value) -> u8 {
        opi_from_json(&body).unwrap().value()
    }

    #[test]
    fn people_percent_is_rounded() {
        assert_eq!(opi(json!({ "people_percent": 72.6 })), 73);
    }

    #[test]
    fn congestion_rate_is_rounded() {
        assert_eq!(opi(json!({ "congestion_rate": 41.4 })), 41);
    }

    #[test]
    fn crowd_level_is_five_step() {
        assert_eq!(opi(json!({ "crowd_level": 3 })), 60);
        assert_eq!(opi(json!({ "crowd_level": 4.9 })), 80);
        assert_eq!(opi(json!({ "crowd_level": 7 })), 100);
    }

    #[test]
    fn density_is_ratio() {
        assert_eq!(opi(json!({ "density": 0.456 })), 45);
        assert_eq!(opi(json!({ "density": 1.5 })), 100);
    }

    #[test]
    fn traffic_index_is_truncated() {
        assert_eq!(opi(json!({ "traffic_index": 55.9 })), 55);
    }

    #[test]
    fn nested_congestion() {
        assert_eq!(opi(json!({ "data": { "congestion": 12.5 } })), 13);
    }

    #[test]
    fn first_result_is_used() {
        let body = json!({ "results": [{ "density": 0.2 }, { "density": 0.9 }] });
        assert_eq!(opi(body), 20);
    }

    #[test]
    fn priority_order() {
        let body = json!({ "traffic_index": 10, "congestion_rate": 90, "people_percent": 50 });
        assert_eq!(opi(body), 50);
    }

    #[test]
    fn null_counts_as_absent() {
        let body = json!({ "people_percent": null, "density": 0.3 });
        assert_eq!(opi(body), 30);
    }

    #[test]
    fn numeric_strings_accepted() {
        assert_eq!(opi(json!({ "people_percent": " 64 " })), 64);
    }

    #[test]
    fn negative_values_clamp_to_zero() {
        assert_eq!(opi(json!({ "congestion_rate": -20 })), 0);
    }

    #[test]
    fn unknown_schema_has_no_signal() {
        assert_eq!(
            opi_from_json(&json!({ "area": "shibuya" })),
            Err(FetchFailure::NoSignal)
        );
        assert_eq!(
            opi_from_json(&json!({ "results": [] })),
            Err(FetchFailure::NoSignal)
        );
        assert_eq!(opi_from_json(&json!([1, 2, 3])), Err(FetchFailure::NoSignal));
    }

    #[test]
    fn garbage_value_is_invalid() {
        assert!(matches!(
            opi_from_json(&json!({ "people_percent": "lots" })),
            Err(FetchFailure::InvalidValue(_))
        ));
        assert!(matches!(
            opi_from_json(&json!({ "density": true })),
            Err(FetchFailure::InvalidValue(_))
        ));
    }

    proptest! {
        #[test]
        fn any_finite_value_is_clamped(v in -1.0e6f64..1.0e6) {
            for field in ["people_percent", "congestion_rate", "crowd_level", "density", "traffic_index"] {
                let got = opi_from_json(&json!({ field: v })).unwrap().value();
                prop_assert!(got <= 100);
            }
        }
    }
}
