//! Length units and the labels used on plot axes and table rows.
//!
//! Only lengths appear in this domain: every reported quantity is some power
//! of the topography's length unit (heights L, slopes L⁰, curvatures L⁻¹,
//! PSD L³, ACF L²). A quantity of dimension `L^e` converts between units by
//! multiplying with `factor^e`.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Label of a dimensionless quantity.
pub const DIMENSIONLESS: &str = "1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LengthUnit {
    Kilometre,
    Metre,
    Millimetre,
    Micrometre,
    Nanometre,
    Angstrom,
    Picometre,
}

impl LengthUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            LengthUnit::Kilometre => "km",
            LengthUnit::Metre => "m",
            LengthUnit::Millimetre => "mm",
            LengthUnit::Micrometre => "µm",
            LengthUnit::Nanometre => "nm",
            LengthUnit::Angstrom => "Å",
            LengthUnit::Picometre => "pm",
        }
    }

    /// Size of one unit in metres.
    pub fn metres(self) -> f64 {
        match self {
            LengthUnit::Kilometre => 1e3,
            LengthUnit::Metre => 1.0,
            LengthUnit::Millimetre => 1e-3,
            LengthUnit::Micrometre => 1e-6,
            LengthUnit::Nanometre => 1e-9,
            LengthUnit::Angstrom => 1e-10,
            LengthUnit::Picometre => 1e-12,
        }
    }

    /// Multiplier converting a length expressed in `self` into `target`.
    pub fn factor_to(self, target: LengthUnit) -> f64 {
        self.metres() / target.metres()
    }

    /// Label for `unit^exponent`, e.g. `nm⁻¹` or `nm³`. Exponent zero is "1".
    pub fn label(self, exponent: i32) -> String {
        match exponent {
            0 => DIMENSIONLESS.to_string(),
            1 => self.symbol().to_string(),
            e => format!("{}{}", self.symbol(), superscript(e)),
        }
    }

    /// The smallest unit of a collection; `None` when empty.
    pub fn finest<I: IntoIterator<Item = LengthUnit>>(units: I) -> Option<LengthUnit> {
        units
            .into_iter()
            .min_by(|a, b| a.metres().total_cmp(&b.metres()))
    }
}

fn superscript(exponent: i32) -> String {
    let mut out = String::new();
    if exponent < 0 {
        out.push('⁻');
    }
    for digit in exponent.unsigned_abs().to_string().chars() {
        out.push(match digit {
            '0' => '⁰',
            '1' => '¹',
            '2' => '²',
            '3' => '³',
            '4' => '⁴',
            '5' => '⁵',
            '6' => '⁶',
            '7' => '⁷',
            '8' => '⁸',
            _ => '⁹',
        });
    }
    out
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for LengthUnit {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "km" => Ok(LengthUnit::Kilometre),
            "m" => Ok(LengthUnit::Metre),
            "mm" => Ok(LengthUnit::Millimetre),
            "um" | "µm" | "μm" => Ok(LengthUnit::Micrometre),
            "nm" => Ok(LengthUnit::Nanometre),
            "A" | "Å" => Ok(LengthUnit::Angstrom),
            "pm" => Ok(LengthUnit::Picometre),
            other => Err(AnalysisError::MalformedInput(format!(
                "unknown length unit '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for LengthUnit {
    type Error = AnalysisError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LengthUnit> for String {
    fn from(unit: LengthUnit) -> Self {
        unit.symbol().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_render_superscript_powers() {
        assert_eq!(LengthUnit::Nanometre.label(1), "nm");
        assert_eq!(LengthUnit::Nanometre.label(-1), "nm⁻¹");
        assert_eq!(LengthUnit::Nanometre.label(2), "nm²");
        assert_eq!(LengthUnit::Nanometre.label(3), "nm³");
        assert_eq!(LengthUnit::Micrometre.label(-2), "µm⁻²");
        assert_eq!(LengthUnit::Metre.label(0), "1");
    }

    #[test]
    fn micrometre_aliases_parse() {
        for s in ["um", "µm", "μm"] {
            assert_eq!(s.parse::<LengthUnit>().unwrap(), LengthUnit::Micrometre);
        }
        assert!("furlong".parse::<LengthUnit>().is_err());
    }

    #[test]
    fn conversion_factor_between_micro_and_nano() {
        let f = LengthUnit::Micrometre.factor_to(LengthUnit::Nanometre);
        assert!((f - 1000.0).abs() < 1e-9, "1 µm should be 1000 nm, got {f}");
    }

    #[test]
    fn finest_unit_is_smallest() {
        let units = [LengthUnit::Micrometre, LengthUnit::Nanometre, LengthUnit::Metre];
        assert_eq!(LengthUnit::finest(units), Some(LengthUnit::Nanometre));
        assert_eq!(LengthUnit::finest([]), None);
    }

    #[test]
    fn serde_round_trips_through_symbol() {
        let json = serde_json::to_string(&LengthUnit::Micrometre).unwrap();
        assert_eq!(json, "\"µm\"");
        let back: LengthUnit = serde_json::from_str("\"um\"").unwrap();
        assert_eq!(back, LengthUnit::Micrometre);
    }
}
