//! Units file format
//!
//! A units file declares groups of units that share a [`Dimension`](super::Dimension),
//! the SI prefixes used to expand them and edits to units of earlier files.
//! The bundled `units.toml` is an example of a complete file.

use enum_map::EnumMap;
use serde::Deserialize;
use std::{collections::HashMap, fmt::Debug, sync::Arc};

use super::BaseQuantity;

/// One layer of units for a [`ConverterBuilder`](super::ConverterBuilder)
///
/// Usually read from [TOML](https://toml.io/en/), any serde format works.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct UnitsFile {
    /// Prefixes used by [`UnitEntry::expand_si`]. Some layer has to set them
    /// if any unit expands.
    pub si: Option<SI>,
    /// Edits to units declared by this or earlier layers
    pub extend: Option<Extend>,
    /// New units, grouped by dimension
    #[serde(default)]
    pub quantity: Vec<QuantityGroup>,
}

/// Name and symbol prefixes for each [`SIPrefix`]
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SI {
    /// Prepended to unit names, like `kilo`
    pub prefixes: Option<EnumMap<SIPrefix, Vec<String>>>,
    /// Prepended to unit symbols, like `k`
    pub symbol_prefixes: Option<EnumMap<SIPrefix, Vec<String>>>,
    /// How these lists join the ones of earlier layers
    #[serde(default)]
    pub precedence: Precedence,
}

/// Supported SI prefixes, from tera to pico
#[derive(
    Debug, Deserialize, Clone, Copy, strum::Display, strum::AsRefStr, enum_map::Enum, PartialEq,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum SIPrefix {
    Tera,
    Giga,
    Mega,
    Kilo,
    Hecto,
    Deca,
    Deci,
    Centi,
    Milli,
    Micro,
    Nano,
    Pico,
}

impl SIPrefix {
    /// Multiplier of the prefix
    ///
    /// ```
    /// # use number_with_units::convert::units_file::SIPrefix;
    /// assert_eq!(SIPrefix::Kilo.ratio(), 1000.0);
    /// ```
    pub fn ratio(&self) -> f64 {
        match self {
            SIPrefix::Tera => 1e12,
            SIPrefix::Giga => 1e9,
            SIPrefix::Mega => 1e6,
            SIPrefix::Kilo => 1e3,
            SIPrefix::Hecto => 1e2,
            SIPrefix::Deca => 1e1,
            SIPrefix::Deci => 1e-1,
            SIPrefix::Centi => 1e-2,
            SIPrefix::Milli => 1e-3,
            SIPrefix::Micro => 1e-6,
            SIPrefix::Nano => 1e-9,
            SIPrefix::Pico => 1e-12,
        }
    }
}

/// Edits to already declared units
///
/// Keys are any name, symbol or alias of the unit to edit.
///
/// ```toml
/// [extend.units.m]
/// aliases = ["mtr"]
/// ```
#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Extend {
    /// How the new names, symbols and aliases join the current ones
    pub precedence: Precedence,
    pub units: HashMap<String, ExtendUnitEntry>,
}

/// Where a list from a new layer goes relative to the current one
///
/// The first symbol of a unit is used to display it, so this decides which
/// one wins.
#[derive(Debug, Default, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Precedence {
    /// New items first
    #[default]
    Before,
    /// New items last
    After,
    /// Only the new items
    Override,
}

/// Fields of a [`Unit`](super::Unit) an extend can change
///
/// Units generated by SI expansion only accept `aliases`.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ExtendUnitEntry {
    pub ratio: Option<f64>,
    pub difference: Option<f64>,
    #[serde(alias = "name")]
    pub names: Option<Vec<Arc<str>>>,
    #[serde(alias = "symbol")]
    pub symbols: Option<Vec<Arc<str>>>,
    #[serde(alias = "alias")]
    pub aliases: Option<Vec<Arc<str>>>,
}

/// Configuration of a group of units sharing a dimension
///
/// ```toml
/// [[quantity]]
/// quantity = "velocity"
/// dimension = { length = 1, time = -1 }
/// ```
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct QuantityGroup {
    /// Name of the group
    ///
    /// When [`Self::dimension`] is not given, this has to be the name of a
    /// [`BaseQuantity`] and the units will have that dimension.
    pub quantity: String,
    /// Exponents of the base quantities
    #[serde(default)]
    pub dimension: Option<HashMap<BaseQuantity, i32>>,
    /// Definition of units
    #[serde(default)]
    pub units: Vec<UnitEntry>,
}

/// A unit declared in a [`QuantityGroup`]
///
/// A value converts to the coherent SI unit of the group's dimension with
/// `(value + difference) * ratio`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct UnitEntry {
    /// Long names, like `grams`. Prefixed when expanding.
    #[serde(default, alias = "name")]
    pub names: Vec<Arc<str>>,
    /// Short symbols, like `g`. Prefixed when expanding.
    #[serde(default, alias = "symbol")]
    pub symbols: Vec<Arc<str>>,
    /// Other spellings. Never prefixed.
    #[serde(default, alias = "alias")]
    pub aliases: Vec<Arc<str>>,
    /// The coherent unit of mass is the kilogram, so `gram` has `0.001`.
    pub ratio: f64,
    /// Offset added before the ratio, only used by temperatures like `degC`
    #[serde(default)]
    pub difference: f64,
    /// Generate a unit for every [`SIPrefix`], `kilogram` and `kg` from
    /// `gram` and `g`
    #[serde(default)]
    pub expand_si: bool,
}

#[cfg(feature = "bundled_units")]
static BUNDLED: once_cell::sync::Lazy<UnitsFile> = once_cell::sync::Lazy::new(|| {
    toml::from_str(include_str!("../../units.toml")).expect("bundled units file is valid")
});

#[cfg(feature = "bundled_units")]
impl UnitsFile {
    /// Get the bundled units file
    ///
    /// This is only available with the `bundled_units` feature.
    pub fn bundled() -> Self {
        BUNDLED.clone()
    }
}

#[cfg(all(test, feature = "bundled_units"))]
mod tests {
    use super::*;

    #[test]
    fn bundled_file_parses() {
        let file = UnitsFile::bundled();
        assert!(file.si.is_some());
        let length = file
            .quantity
            .iter()
            .find(|q| q.quantity == "length")
            .unwrap();
        assert!(length.units.iter().any(|u| u.symbols.contains(&"m".into())));
    }

    #[test]
    fn group_with_dimension() {
        let text = r#"
            [[quantity]]
            quantity = "speed"
            dimension = { length = 1, time = -1 }

            [[quantity.units]]
            names = ["knot", "knots"]
            symbols = ["kn"]
            ratio = 0.514444
        "#;
        let file: UnitsFile = toml::from_str(text).unwrap();
        let group = &file.quantity[0];
        assert_eq!(
            group.dimension,
            Some(HashMap::from([
                (BaseQuantity::Length, 1),
                (BaseQuantity::Time, -1)
            ]))
        );
        assert_eq!(group.units[0].symbols, vec![Arc::<str>::from("kn")]);
    }
}
