//! Quantity model
//!
//! A [`NumberWithUnits`] is a [`Value`] (real or fraction) with an ordered
//! list of [`UnitTerm`]s. [`NumberWithUnitsDict`] is the serializable form
//! used by callers to send answers and rule inputs.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{
    convert::{currency, Converter},
    parser::{self, ParserError},
};

/// A number paired with an ordered list of unit terms
#[derive(Debug, Clone, PartialEq)]
pub struct NumberWithUnits {
    pub value: Value,
    pub units: Vec<UnitTerm>,
}

/// Numeric part of a [`NumberWithUnits`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Real(f64),
    Fraction(Fraction),
}

/// Kind of a [`Value`], the `type` field of [`NumberWithUnitsDict`]
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ValueKind {
    #[default]
    Real,
    Fraction,
}

/// A mixed fraction with an explicit sign
///
/// `-1 2/3` is `{ is_negative: true, whole_number: 1, numerator: 2, denominator: 3 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fraction {
    pub is_negative: bool,
    pub whole_number: u64,
    pub numerator: u64,
    pub denominator: u64,
}

/// A unit symbol with its exponent, like `s^-1`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitTerm {
    pub unit: String,
    pub exponent: i32,
}

/// Dictionary form of a [`NumberWithUnits`]
///
/// ```
/// # use number_with_units::NumberWithUnitsDict;
/// let dict: NumberWithUnitsDict = serde_json::from_str(r#"{
///     "type": "real",
///     "real": 5,
///     "fraction": { "isNegative": false, "wholeNumber": 0, "numerator": 0, "denominator": 1 },
///     "units": [{ "unit": "km", "exponent": 1 }]
/// }"#).unwrap();
/// assert_eq!(dict.real, 5.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberWithUnitsDict {
    #[serde(rename = "type")]
    pub kind: ValueKind,
    #[serde(default)]
    pub real: f64,
    #[serde(default)]
    pub fraction: Fraction,
    #[serde(default)]
    pub units: Vec<UnitTerm>,
}

impl Fraction {
    pub fn new(is_negative: bool, whole_number: u64, numerator: u64, denominator: u64) -> Self {
        Self {
            is_negative,
            whole_number,
            numerator,
            denominator,
        }
    }

    /// Floating point value of the fraction. This may lose precision.
    pub fn to_float(&self) -> f64 {
        let total_parts = self.whole_number as f64 * self.denominator as f64 + self.numerator as f64;
        let value = total_parts / self.denominator as f64;
        if self.is_negative {
            -value
        } else {
            value
        }
    }
}

impl Default for Fraction {
    fn default() -> Self {
        Self::new(false, 0, 0, 1)
    }
}

impl Display for Fraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fraction = match (self.whole_number, self.numerator) {
            (0, _) if self.denominator == 0 => format!("{}/0", self.numerator),
            (whole, num) if self.denominator == 0 => format!("{whole} {num}/0"),
            (0, 0) => return write!(f, "0"),
            (0, num) => format!("{num}/{}", self.denominator),
            (whole, 0) => format!("{whole}"),
            (whole, num) => format!("{whole} {num}/{}", self.denominator),
        };
        if self.is_negative {
            write!(f, "-")?;
        }
        write!(f, "{fraction}")
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Real(_) => ValueKind::Real,
            Value::Fraction(_) => ValueKind::Fraction,
        }
    }

    pub fn to_float(&self) -> f64 {
        match self {
            Value::Real(n) => *n,
            Value::Fraction(fraction) => fraction.to_float(),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Real(n) => write!(f, "{n}"),
            Value::Fraction(fraction) => fraction.fmt(f),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<Fraction> for Value {
    fn from(value: Fraction) -> Self {
        Self::Fraction(value)
    }
}

impl UnitTerm {
    pub fn new(unit: impl Into<String>, exponent: i32) -> Self {
        Self {
            unit: unit.into(),
            exponent,
        }
    }
}

impl Display for UnitTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.exponent == 1 {
            write!(f, "{}", self.unit)
        } else {
            write!(f, "{}^{}", self.unit, self.exponent)
        }
    }
}

impl NumberWithUnits {
    pub fn new(value: impl Into<Value>, units: Vec<UnitTerm>) -> Self {
        Self {
            value: value.into(),
            units,
        }
    }

    /// Parse a raw input like `"2 1/2 km/hr"` or `"$ 5"`
    ///
    /// Every unit has to be known by the `converter`.
    pub fn from_raw_input(input: &str, converter: &Converter) -> Result<Self, ParserError> {
        parser::parse_number_with_units(input, converter)
    }

    /// Render the quantity as a string the [`Converter`] understands
    ///
    /// The value comes first, then every unit term in the order they were
    /// written, all separated by a single space. Currency aliases are replaced
    /// by the currency name.
    ///
    /// ```
    /// # use number_with_units::quantity::*;
    /// let q = NumberWithUnits::new(
    ///     5.0,
    ///     vec![UnitTerm::new("km", 1), UnitTerm::new("s", -1)],
    /// );
    /// assert_eq!(q.to_canonical_string(), "5 km s^-1");
    ///
    /// let q = NumberWithUnits::new(5.0, vec![UnitTerm::new("$", 1)]);
    /// assert_eq!(q.to_canonical_string(), "5 dollar");
    /// ```
    pub fn to_canonical_string(&self) -> String {
        let mut s = self.value.to_string();
        for term in &self.units {
            s.push(' ');
            match currency::canonical_name(&term.unit) {
                Some(name) => s += &UnitTerm::new(name, term.exponent).to_string(),
                None => s += &term.to_string(),
            }
        }
        s
    }

    /// A copy of the quantity with the value as a real number
    ///
    /// Fractions are converted with [`Fraction::to_float`].
    pub fn to_real(&self) -> Self {
        Self {
            value: Value::Real(self.value.to_float()),
            units: self.units.clone(),
        }
    }

    pub fn to_dict(&self) -> NumberWithUnitsDict {
        let (real, fraction) = match self.value {
            Value::Real(n) => (n, Fraction::default()),
            Value::Fraction(fraction) => (0.0, fraction),
        };
        NumberWithUnitsDict {
            kind: self.value.kind(),
            real,
            fraction,
            units: self.units.clone(),
        }
    }
}

impl From<&NumberWithUnitsDict> for NumberWithUnits {
    fn from(dict: &NumberWithUnitsDict) -> Self {
        let value = match dict.kind {
            ValueKind::Real => Value::Real(dict.real),
            ValueKind::Fraction => Value::Fraction(dict.fraction),
        };
        Self {
            value,
            units: dict.units.clone(),
        }
    }
}

impl From<NumberWithUnitsDict> for NumberWithUnits {
    fn from(dict: NumberWithUnitsDict) -> Self {
        Self::from(&dict)
    }
}

impl From<&NumberWithUnits> for NumberWithUnitsDict {
    fn from(value: &NumberWithUnits) -> Self {
        value.to_dict()
    }
}

impl Display for NumberWithUnits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)?;
        for term in &self.units {
            write!(f, " {term}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Fraction::new(false, 0, 1, 2) => "1/2")]
    #[test_case(Fraction::new(false, 1, 1, 2) => "1 1/2")]
    #[test_case(Fraction::new(true, 0, 2, 3) => "-2/3")]
    #[test_case(Fraction::new(true, 3, 0, 4) => "-3")]
    #[test_case(Fraction::new(true, 0, 0, 4) => "0")]
    #[test_case(Fraction::new(false, 0, 0, 0) => "0/0"; "zero over zero")]
    #[test_case(Fraction::new(false, 3, 0, 0) => "3 0/0"; "whole over zero")]
    fn fraction_display(fraction: Fraction) -> String {
        fraction.to_string()
    }

    #[test]
    fn fraction_to_float() {
        assert_eq!(Fraction::new(false, 0, 1, 2).to_float(), 0.5);
        assert_eq!(Fraction::new(true, 1, 1, 4).to_float(), -1.25);
        assert_eq!(Fraction::new(false, 2, 0, 1).to_float(), 2.0);
    }

    #[test]
    fn canonical_string() {
        let q = NumberWithUnits::new(
            Fraction::new(false, 1, 1, 2),
            vec![UnitTerm::new("kg", 1)],
        );
        assert_eq!(q.to_canonical_string(), "1 1/2 kg");

        let q = NumberWithUnits::new(
            Fraction::new(true, 0, 2, 3),
            vec![UnitTerm::new("m", 2)],
        );
        assert_eq!(q.to_canonical_string(), "-2/3 m^2");

        let q = NumberWithUnits::new(0.5, vec![]);
        assert_eq!(q.to_canonical_string(), "0.5");

        let q = NumberWithUnits::new(
            2.0,
            vec![UnitTerm::new("Rs", 1), UnitTerm::new("kg", -1)],
        );
        assert_eq!(q.to_canonical_string(), "2 rupee kg^-1");
    }

    #[test]
    fn to_real_returns_a_copy() {
        let q = NumberWithUnits::new(Fraction::new(false, 0, 1, 2), vec![UnitTerm::new("m", 1)]);
        let real = q.to_real();
        assert_eq!(real.value, Value::Real(0.5));
        assert_eq!(real.units, q.units);
        assert_eq!(q.value.kind(), ValueKind::Fraction);
    }

    #[test]
    fn dict_conversion() {
        let q = NumberWithUnits::new(Fraction::new(false, 0, 3, 4), vec![UnitTerm::new("l", 1)]);
        let dict = q.to_dict();
        assert_eq!(dict.kind, ValueKind::Fraction);
        assert_eq!(dict.real, 0.0);
        assert_eq!(NumberWithUnits::from(&dict), q);

        let q = NumberWithUnits::new(7.5, vec![]);
        let dict = q.to_dict();
        assert_eq!(dict.fraction, Fraction::default());
        assert_eq!(NumberWithUnits::from(dict), q);
    }

    #[test]
    fn dict_serde() {
        let q = NumberWithUnits::new(Fraction::new(true, 1, 1, 2), vec![UnitTerm::new("km", -2)]);
        let json = serde_json::to_value(q.to_dict()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "fraction",
                "real": 0.0,
                "fraction": {
                    "isNegative": true,
                    "wholeNumber": 1,
                    "numerator": 1,
                    "denominator": 2
                },
                "units": [{ "unit": "km", "exponent": -2 }]
            })
        );
    }
}
