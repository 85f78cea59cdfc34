//! Transport encoding: significant-digit rounding and the NaN/infinity
//! markers. This is the only place non-finite numbers are translated; the
//! numerics keep NaN as their undefined-result sentinel.
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::result::{PlotResult, Representation, RoughnessParameterRow};

/// Significant digits used when displaying roughness parameters.
pub const NUM_SIGNIFICANT_DIGITS_RMS_VALUES: u32 = 5;

/// Round to `digits` significant digits. Zero and non-finite values pass
/// through unchanged.
pub fn round_to_significant_digits(value: f64, digits: u32) -> f64 {
    if value == 0.0 || !value.is_finite() || digits == 0 {
        return value;
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = digits as i32 - 1 - magnitude;
    // Format/parse avoids the representation error of multiply-round-divide.
    if decimals >= 0 {
        format!("{value:.prec$}", prec = decimals as usize)
            .parse()
            .unwrap_or(value)
    } else {
        let scale = 10f64.powi(-decimals);
        (value / scale).round() * scale
    }
}

/// A number as it crosses the transport boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportValue {
    Number(f64),
    Null,
    Infinity,
    NegativeInfinity,
}

impl TransportValue {
    pub fn encode(value: f64, digits: u32) -> Self {
        if value.is_nan() {
            TransportValue::Null
        } else if value == f64::INFINITY {
            TransportValue::Infinity
        } else if value == f64::NEG_INFINITY {
            TransportValue::NegativeInfinity
        } else {
            TransportValue::Number(round_to_significant_digits(value, digits))
        }
    }
}

impl Serialize for TransportValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TransportValue::Number(v) => serializer.serialize_f64(*v),
            TransportValue::Null => serializer.serialize_none(),
            TransportValue::Infinity => serializer.serialize_str("infinity"),
            TransportValue::NegativeInfinity => serializer.serialize_str("-infinity"),
        }
    }
}

impl From<TransportValue> for Value {
    fn from(v: TransportValue) -> Self {
        match v {
            TransportValue::Number(n) => json!(n),
            TransportValue::Null => Value::Null,
            TransportValue::Infinity => Value::from("infinity"),
            TransportValue::NegativeInfinity => Value::from("-infinity"),
        }
    }
}

fn encode_all(values: &[f64], digits: u32) -> Value {
    Value::Array(
        values
            .iter()
            .map(|v| TransportValue::encode(*v, digits).into())
            .collect(),
    )
}

/// Encode a plot-card result, rounding every number.
pub fn encode_plot_result(result: &PlotResult, digits: u32) -> Value {
    let mut out = Map::new();
    out.insert("name".into(), json!(result.name));
    out.insert("xlabel".into(), json!(result.xlabel));
    out.insert("ylabel".into(), json!(result.ylabel));
    out.insert("xunit".into(), json!(result.xunit));
    out.insert("yunit".into(), json!(result.yunit));
    if let Some(scale) = result.xscale {
        out.insert("xscale".into(), json!(scale));
    }
    if let Some(scale) = result.yscale {
        out.insert("yscale".into(), json!(scale));
    }
    let series = result
        .series
        .iter()
        .map(|s| {
            json!({
                "name": s.name,
                "x": encode_all(&s.x, digits),
                "y": encode_all(&s.y, digits),
            })
        })
        .collect();
    out.insert("series".into(), Value::Array(series));
    if let Some(scalars) = &result.scalars {
        let scalars = scalars
            .iter()
            .map(|(name, s)| {
                let value: Value = TransportValue::encode(s.value, digits).into();
                (name.clone(), json!({ "value": value, "unit": s.unit }))
            })
            .collect();
        out.insert("scalars".into(), Value::Object(scalars));
    }
    if let Some(alerts) = &result.alerts {
        out.insert("alerts".into(), json!(alerts));
    }
    Value::Object(out)
}

/// A roughness row as presented in a table: absent direction or symbol is
/// an empty string, the value is rounded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub quantity: String,
    pub direction: String,
    #[serde(rename = "from")]
    pub from: String,
    pub symbol: String,
    pub value: TransportValue,
    pub unit: String,
}

pub fn encode_roughness_table(rows: &[RoughnessParameterRow], digits: u32) -> Vec<TableRow> {
    rows.iter()
        .map(|row| TableRow {
            quantity: row.quantity.clone(),
            direction: row.direction.map(|a| a.label().to_string()).unwrap_or_default(),
            from: match row.from {
                Representation::Profile => "profile (1D)".to_string(),
                Representation::Area => "area (2D)".to_string(),
            },
            symbol: row.symbol.clone(),
            value: TransportValue::encode(row.value, digits),
            unit: row.unit.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heightfield::Axis;
    use crate::result::Series;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn rounds_to_five_significant_digits() {
        assert_eq!(round_to_significant_digits(1.2345678, 5), 1.2346);
        assert_eq!(round_to_significant_digits(-0.000123456, 3), -0.000123);
        assert_eq!(round_to_significant_digits(123456.0, 2), 120000.0);
        assert_eq!(round_to_significant_digits(0.0, 5), 0.0);
    }

    #[test]
    fn non_finite_values_become_markers() {
        assert_eq!(TransportValue::encode(f64::NAN, 5), TransportValue::Null);
        assert_eq!(TransportValue::encode(f64::INFINITY, 5), TransportValue::Infinity);
        assert_eq!(serde_json::to_value(TransportValue::Infinity).unwrap(), json!("infinity"));
        assert_eq!(serde_json::to_value(TransportValue::Null).unwrap(), Value::Null);
    }

    #[test]
    fn plot_result_encoding_rounds_series_and_scalars() {
        let mut r = PlotResult::new("Height distribution", ("Height", "Probability density"), ("nm".into(), "nm⁻¹".into()));
        r.series.push(Series::new("Height distribution", vec![1.2345678, f64::NAN], vec![f64::INFINITY, 2.0]));
        r.push_scalar("RMS Height", 3.14159265, "nm");
        let v = encode_plot_result(&r, 5);
        assert_eq!(v["series"][0]["x"], json!([1.2346, null]));
        assert_eq!(v["series"][0]["y"], json!(["infinity", 2.0]));
        assert_eq!(v["scalars"]["RMS Height"], json!({"value": 3.1416, "unit": "nm"}));
        assert!(v.get("alerts").is_none());
    }

    #[test]
    fn table_rows_fill_absent_fields() {
        let rows = vec![RoughnessParameterRow {
            quantity: "RMS gradient".into(),
            direction: None,
            from: Representation::Area,
            symbol: String::new(),
            value: 2.0000004,
            unit: "1".into(),
        }, RoughnessParameterRow {
            quantity: "RMS slope".into(),
            direction: Some(Axis::Y),
            from: Representation::Profile,
            symbol: "R&Delta;q".into(),
            value: f64::NAN,
            unit: "1".into(),
        }];
        let table = encode_roughness_table(&rows, NUM_SIGNIFICANT_DIGITS_RMS_VALUES);
        assert_eq!(table[0].direction, "");
        assert_eq!(table[0].value, TransportValue::Number(2.0));
        assert_eq!(table[1].direction, "y");
        assert_eq!(table[1].from, "profile (1D)");
        assert_eq!(table[1].value, TransportValue::Null);
    }

    proptest! {
        #[test]
        fn rounding_stays_within_half_a_unit_in_the_last_digit(
            value in prop_oneof![-1e12f64..-1e-12, 1e-12f64..1e12],
            digits in 1u32..10,
        ) {
            let rounded = round_to_significant_digits(value, digits);
            let magnitude = value.abs().log10().floor();
            let ulp = 10f64.powf(magnitude - digits as f64 + 1.0);
            prop_assert!((rounded - value).abs() <= ulp * 0.5 * (1.0 + 1e-6));
        }

        #[test]
        fn rounding_is_idempotent(value in 1e-6f64..1e6, digits in 1u32..10) {
            let once = round_to_significant_digits(value, digits);
            assert_relative_eq!(round_to_significant_digits(once, digits), once, max_relative = 1e-15);
        }
    }
}
