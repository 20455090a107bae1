//! Unit registry and the conversion primitive
//!
//! A [`Converter`] knows a set of units, each one with a [`Dimension`] and a
//! ratio to the coherent SI unit of that dimension. [`Converter::parse`]
//! reads strings like `"5 km s^-1"` into a [`PhysicalValue`], and two
//! physical values compare with [`PhysicalValue::equals`].
//!
//! The units come from layered [`UnitsFile`]s, see [`ConverterBuilder`].

use std::{collections::HashMap, sync::Arc};

use enum_map::EnumMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    lexer::T,
    parser::{token_stream::TokenStream, TokenParser},
    span::Span,
};

pub use builder::{ConverterBuilder, ConverterBuilderError};
pub use units_file::UnitsFile;

mod builder;
pub mod currency;
pub mod units_file;

/// Registry of known units
///
/// Build one with [`Converter::builder`]. [`Converter::default`] is
/// [`Converter::bundled`] with the `bundled_units` feature and
/// [`Converter::empty`] without it.
///
/// Currency units are not included by default, see
/// [`Converter::register_currency_units`].
#[derive(Debug, Clone)]
pub struct Converter {
    all_units: Vec<Arc<Unit>>,
    unit_index: UnitIndex,
}

impl Converter {
    pub fn builder() -> ConverterBuilder {
        ConverterBuilder::new()
    }

    /// Converter without units, only bare numbers can be parsed
    pub fn empty() -> Self {
        Self {
            all_units: Vec::new(),
            unit_index: UnitIndex::default(),
        }
    }

    /// Converter with the units of the bundled `units.toml`
    ///
    /// Only available with the `bundled_units` feature.
    #[cfg(feature = "bundled_units")]
    pub fn bundled() -> Self {
        Self::builder()
            .with_bundled_units()
            .and_then(ConverterBuilder::finish)
            .expect("bundled units are valid")
    }

    /// Number of distinct units, not of keys
    pub fn unit_count(&self) -> usize {
        self.all_units.len()
    }

    pub fn all_units(&self) -> impl Iterator<Item = &Unit> {
        self.all_units.iter().map(Arc::as_ref)
    }

    /// Look up a unit by a name, symbol or alias
    pub fn find_unit(&self, key: &str) -> Option<Arc<Unit>> {
        self.get_unit(key).ok().cloned()
    }

    /// Check if a name, symbol or alias is known
    pub fn is_known(&self, key: &str) -> bool {
        self.unit_index.get_unit_id(key).is_ok()
    }

    pub(crate) fn get_unit(&self, key: &str) -> Result<&Arc<Unit>, UnknownUnit> {
        let id = self.unit_index.get_unit_id(key)?;
        Ok(&self.all_units[id])
    }

    /// Add a unit after the converter is built
    pub(crate) fn push_unit(&mut self, unit: Unit) -> Result<usize, ConverterBuilderError> {
        let id = self.all_units.len();
        self.unit_index.add_unit(&unit, id)?;
        self.all_units.push(Arc::new(unit));
        Ok(id)
    }
}

impl Default for Converter {
    fn default() -> Self {
        #[cfg(feature = "bundled_units")]
        return Self::bundled();
        #[cfg(not(feature = "bundled_units"))]
        return Self::empty();
    }
}

impl PartialEq for Converter {
    fn eq(&self, other: &Self) -> bool {
        self.all_units == other.all_units && self.unit_index == other.unit_index
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct UnitIndex(HashMap<Arc<str>, usize>);

impl UnitIndex {
    fn get_unit_id(&self, key: &str) -> Result<usize, UnknownUnit> {
        self.0
            .get(key)
            .copied()
            .ok_or_else(|| UnknownUnit(key.to_string()))
    }
}

/// A known unit
///
/// `value` of this unit is `(value + difference) * ratio` in the coherent SI
/// unit of its [`Dimension`].
///
/// Displays as its [`Self::symbol`], or the first name with `{:#}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unit {
    /// Long names, like `millilitres`
    pub names: Vec<Arc<str>>,
    /// Short names, like `ml`
    pub symbols: Vec<Arc<str>>,
    /// Other accepted spellings
    pub aliases: Vec<Arc<str>>,
    pub ratio: f64,
    pub difference: f64,
    /// Name of the group this unit was declared in, like `volume`
    pub quantity: Arc<str>,
    #[serde(skip)]
    pub dimension: Dimension,
}

impl Unit {
    fn all_keys(&self) -> impl Iterator<Item = &Arc<str>> {
        self.names.iter().chain(&self.symbols).chain(&self.aliases)
    }

    /// First symbol, or first name, or first alias
    ///
    /// Units in a [`Converter`] always have at least one of them.
    pub fn symbol(&self) -> &str {
        self.symbols
            .iter()
            .chain(&self.names)
            .chain(&self.aliases)
            .next()
            .map(|s| &**s)
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.names.first() {
            Some(name) if f.alternate() => f.write_str(name),
            _ => f.write_str(self.symbol()),
        }
    }
}

/// Axis of a [`Dimension`]
///
/// Currencies are base quantities of their own, so dollars and rupees never
/// convert into each other.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Deserialize,
    Serialize,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    enum_map::Enum,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum BaseQuantity {
    Length,
    Mass,
    Time,
    Current,
    Temperature,
    Amount,
    Luminosity,
    Angle,
    Information,
    Dollar,
    Rupee,
}

/// Exponents over every [`BaseQuantity`]
///
/// ```
/// # use number_with_units::convert::{BaseQuantity, Dimension};
/// let speed = Dimension::of(BaseQuantity::Length) * Dimension::of(BaseQuantity::Time).powi(-1);
/// assert_eq!(speed.to_string(), "length time^-1");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dimension(EnumMap<BaseQuantity, i32>);

impl Dimension {
    /// Dimension of a pure number
    pub fn dimensionless() -> Self {
        Self::default()
    }

    /// A single base quantity
    pub fn of(quantity: BaseQuantity) -> Self {
        let mut d = Self::default();
        d.0[quantity] = 1;
        d
    }

    pub fn from_exponents(exponents: &HashMap<BaseQuantity, i32>) -> Self {
        let mut d = Self::default();
        for (&q, &e) in exponents {
            d.0[q] = e;
        }
        d
    }

    /// Exponent of a base quantity
    pub fn exponent(&self, quantity: BaseQuantity) -> i32 {
        self.0[quantity]
    }

    pub fn is_dimensionless(&self) -> bool {
        self.0.values().all(|&e| e == 0)
    }

    pub fn powi(&self, exponent: i32) -> Self {
        let mut d = self.clone();
        d.0.values_mut().for_each(|e| *e *= exponent);
        d
    }
}

impl std::ops::Mul for Dimension {
    type Output = Dimension;

    fn mul(mut self, rhs: Self) -> Self::Output {
        self *= rhs;
        self
    }
}

impl std::ops::MulAssign for Dimension {
    fn mul_assign(&mut self, rhs: Self) {
        for (q, e) in rhs.0 {
            self.0[q] += e;
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "dimensionless");
        }
        let mut first = true;
        for (q, &e) in self.0.iter().filter(|(_, e)| **e != 0) {
            if !first {
                write!(f, " ")?;
            }
            first = false;
            if e == 1 {
                write!(f, "{q}")?;
            } else {
                write!(f, "{q}^{e}")?;
            }
        }
        Ok(())
    }
}

/// A magnitude in coherent SI units with its [`Dimension`]
///
/// Created with [`Converter::parse`].
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalValue {
    value: f64,
    dimension: Dimension,
}

/// Relative tolerance used by [`PhysicalValue::equals`]
pub const RELATIVE_TOLERANCE: f64 = 1e-12;

impl PhysicalValue {
    pub fn new(value: f64, dimension: Dimension) -> Self {
        Self { value, dimension }
    }

    /// Magnitude in the coherent SI unit
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn dimension(&self) -> &Dimension {
        &self.dimension
    }

    /// Check if both values can be converted into each other
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.dimension == other.dimension
    }

    /// Check if both values are the same physical magnitude
    ///
    /// Incompatible dimensions are never equal. Magnitudes are compared with
    /// a relative tolerance of [`RELATIVE_TOLERANCE`], so only an exact zero
    /// equals zero.
    pub fn equals(&self, other: &Self) -> bool {
        self.is_compatible(other) && nearly_equal(self.value, other.value)
    }
}

fn nearly_equal(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    if !a.is_finite() || !b.is_finite() {
        return false;
    }
    (a - b).abs() <= a.abs().max(b.abs()) * RELATIVE_TOLERANCE
}

impl Converter {
    /// Parse a quantity string into a [`PhysicalValue`]
    ///
    /// The grammar is a decimal number followed by unit factors separated by
    /// whitespace or `*`. A factor can have an integer exponent (`s^-1`) and a
    /// `/` divides by the next factor.
    ///
    /// ```
    /// # use number_with_units::Converter;
    /// let converter = Converter::bundled();
    /// let a = converter.parse("5 km")?;
    /// let b = converter.parse("5000 m")?;
    /// assert!(a.equals(&b));
    /// # Ok::<(), number_with_units::convert::ConvertError>(())
    /// ```
    #[tracing::instrument(level = "trace", skip(self), ret, err)]
    pub fn parse(&self, input: &str) -> Result<PhysicalValue, ConvertError> {
        let tokens: Vec<_> = TokenStream::new(input).collect();
        let mut line = TokenParser::new(&tokens, input);

        line.ws();
        let value = {
            let start = line.current_offset();
            line.consume(T![-]);
            let number = line.capture_slice(|line| {
                line.consume(T![int]);
                if line.consume(T![.]).is_some() {
                    line.consume(T![int]);
                }
            });
            if number.is_empty() {
                return Err(ConvertError::MissingValue);
            }
            let text = &input[start..line.current_offset()];
            text.parse::<f64>()
                .map_err(|_| ConvertError::InvalidNumber(text.to_string()))?
        };

        let mut factors: SmallVec<[(&Arc<Unit>, i32); 4]> = SmallVec::new();
        let mut divide = false;
        loop {
            line.ws();
            match line.peek() {
                T![eof] => break,
                T![*] if !divide && !factors.is_empty() => {
                    line.bump_any();
                }
                T![/] if !divide => {
                    line.bump_any();
                    divide = true;
                }
                T![word] => {
                    let tok = line.bump_any();
                    let unit = self.get_unit(line.token_str(tok))?;
                    let exponent = match line.exponent() {
                        Some(Ok(e)) => e,
                        Some(Err(span)) => return Err(syntax(input, span)),
                        None => 1,
                    };
                    factors.push((unit, if divide { -exponent } else { exponent }));
                    divide = false;
                }
                _ => {
                    let tok = line.bump_any();
                    return Err(syntax(input, tok.span));
                }
            }
        }
        if divide {
            return Err(ConvertError::Syntax {
                found: "end of input".into(),
                offset: input.len(),
            });
        }

        Ok(normalize(value, &factors))
    }
}

fn syntax(input: &str, span: Span) -> ConvertError {
    ConvertError::Syntax {
        found: input[span.range()].to_string(),
        offset: span.start(),
    }
}

fn normalize(value: f64, factors: &[(&Arc<Unit>, i32)]) -> PhysicalValue {
    // offsets only make sense when the unit is alone, like `20 degC`
    if let &[(unit, 1)] = factors {
        return PhysicalValue::new(
            (value + unit.difference) * unit.ratio,
            unit.dimension.clone(),
        );
    }

    let mut magnitude = value;
    let mut dimension = Dimension::dimensionless();
    for &(unit, exponent) in factors {
        magnitude *= unit.ratio.powi(exponent);
        dimension *= unit.dimension.powi(exponent);
    }
    PhysicalValue::new(magnitude, dimension)
}

/// Error when try to convert an unknown unit
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Unknown unit: '{0}'")]
pub struct UnknownUnit(pub String);

/// Errors from parsing a quantity string
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConvertError {
    #[error("Missing numeric value")]
    MissingValue,

    #[error("Invalid number: '{0}'")]
    InvalidNumber(String),

    #[error("Unexpected '{found}' at {offset}")]
    Syntax { found: String, offset: usize },

    #[error(transparent)]
    UnknownUnit(#[from] UnknownUnit),
}

#[cfg(all(test, feature = "bundled_units"))]
mod tests {
    use super::*;
    use test_case::test_case;

    fn converter() -> Converter {
        let mut converter = Converter::bundled();
        converter.register_currency_units().unwrap();
        converter
    }

    #[test_case("5 km", "5000 m")]
    #[test_case("1 kg", "1000 g")]
    #[test_case("2 hr", "120 min")]
    #[test_case("1 l", "1000 ml")]
    #[test_case("1 L", "0.001 m^3")]
    #[test_case("18 km hr^-1", "5 m s^-1")]
    #[test_case("18 km/hr", "5 m/s")]
    #[test_case("1 N", "1 kg m s^-2")]
    #[test_case("0 degC", "273.15 K")]
    #[test_case("32 degF", "0 degC")]
    #[test_case("1 ft", "12 in")]
    #[test_case("1 dollar", "100 cent")]
    #[test_case("5", "5")]
    fn equivalent(a: &str, b: &str) {
        let converter = converter();
        let a = converter.parse(a).unwrap();
        let b = converter.parse(b).unwrap();
        assert!(a.equals(&b), "{a:?} != {b:?}");
    }

    #[test_case("5 km", "5 kg")]
    #[test_case("5 km", "5 m")]
    #[test_case("1 dollar", "1 rupee")]
    #[test_case("5 m", "5")]
    #[test_case("5 km s^-1", "5 km s")]
    #[test_case("1 pm^2", "5 pm^2")]
    #[test_case("1 nm^2", "100 nm^2")]
    #[test_case("0.1 pg", "0.2 pg")]
    fn not_equivalent(a: &str, b: &str) {
        let converter = converter();
        let a = converter.parse(a).unwrap();
        let b = converter.parse(b).unwrap();
        assert!(!a.equals(&b));
    }

    #[test]
    fn dimensions() {
        let converter = converter();
        let v = converter.parse("3 km s^-1").unwrap();
        assert_eq!(v.value(), 3000.0);
        assert_eq!(v.dimension().exponent(BaseQuantity::Length), 1);
        assert_eq!(v.dimension().exponent(BaseQuantity::Time), -1);

        let v = converter.parse("2 l").unwrap();
        assert_eq!(v.dimension(), &Dimension::of(BaseQuantity::Length).powi(3));
        assert!(converter.parse("7").unwrap().dimension().is_dimensionless());
    }

    #[test]
    fn offsets_ignored_in_compound_units() {
        let converter = converter();
        let v = converter.parse("1 degC^1 m").unwrap();
        assert_eq!(v.value(), 1.0);
    }

    #[test]
    fn errors() {
        let converter = converter();
        assert_eq!(
            converter.parse("5 parsecs"),
            Err(ConvertError::UnknownUnit(UnknownUnit("parsecs".into())))
        );
        assert_eq!(converter.parse("km"), Err(ConvertError::MissingValue));
        assert_eq!(
            converter.parse("1/2 km"),
            Err(ConvertError::Syntax {
                found: "2".into(),
                offset: 2
            })
        );
        assert!(matches!(
            converter.parse("5 km^"),
            Err(ConvertError::Syntax { .. })
        ));
        assert!(matches!(
            converter.parse("5 km/"),
            Err(ConvertError::Syntax { .. })
        ));
    }

    #[test]
    fn tolerance() {
        let a = PhysicalValue::new(0.1 + 0.2, Dimension::dimensionless());
        let b = PhysicalValue::new(0.3, Dimension::dimensionless());
        assert!(a.equals(&b));
        let c = PhysicalValue::new(0.3000001, Dimension::dimensionless());
        assert!(!a.equals(&c));
        let tiny = PhysicalValue::new(1e-24, Dimension::dimensionless());
        let tiny_close = PhysicalValue::new(1e-24 * (1.0 + 1e-14), Dimension::dimensionless());
        let tiny_far = PhysicalValue::new(5e-24, Dimension::dimensionless());
        assert!(tiny.equals(&tiny_close));
        assert!(!tiny.equals(&tiny_far));
        let zero = PhysicalValue::new(0.0, Dimension::dimensionless());
        assert!(zero.equals(&PhysicalValue::new(-0.0, Dimension::dimensionless())));
        assert!(!zero.equals(&tiny));
        let nan = PhysicalValue::new(f64::NAN, Dimension::dimensionless());
        assert!(!nan.equals(&nan));
    }
}
