//! Currency units
//!
//! Currencies are not part of the units file. They are registered on an
//! existing [`Converter`] with [`Converter::register_currency_units`], each
//! currency with its own [`BaseQuantity`] so they never convert into each
//! other.

use std::sync::Arc;

use super::{BaseQuantity, Converter, ConverterBuilderError, Dimension, Unit};

/// A currency and its subunits
#[derive(Debug, Clone, Copy)]
pub struct CurrencyUnit {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    /// Symbols that are written before the number, like `$ 5`
    pub front_units: &'static [&'static str],
    pub quantity: BaseQuantity,
    /// Ratio to the main unit of the currency
    pub ratio: f64,
}

pub const CURRENCY_UNITS: &[CurrencyUnit] = &[
    CurrencyUnit {
        name: "dollar",
        aliases: &["$", "dollars", "Dollars", "Dollar", "USD"],
        front_units: &["$"],
        quantity: BaseQuantity::Dollar,
        ratio: 1.0,
    },
    CurrencyUnit {
        name: "rupee",
        aliases: &["Rs", "rupees", "₹", "Rupees", "Rupee"],
        front_units: &["Rs", "₹"],
        quantity: BaseQuantity::Rupee,
        ratio: 1.0,
    },
    CurrencyUnit {
        name: "cent",
        aliases: &["cents", "Cents", "Cent"],
        front_units: &[],
        quantity: BaseQuantity::Dollar,
        ratio: 0.01,
    },
    CurrencyUnit {
        name: "paise",
        aliases: &["paisa", "Paise", "Paisa"],
        front_units: &[],
        quantity: BaseQuantity::Rupee,
        ratio: 0.01,
    },
];

impl CurrencyUnit {
    fn to_unit(self) -> Unit {
        Unit {
            names: vec![self.name.into()],
            symbols: vec![],
            aliases: self.aliases.iter().map(|&a| Arc::from(a)).collect(),
            ratio: self.ratio,
            difference: 0.0,
            quantity: self.quantity.to_string().into(),
            dimension: Dimension::of(self.quantity),
        }
    }

    fn matches(&self, unit: &str) -> bool {
        self.name == unit || self.aliases.contains(&unit)
    }
}

/// Name of the currency a unit refers to, like `dollar` for `$`
pub fn canonical_name(unit: &str) -> Option<&'static str> {
    CURRENCY_UNITS
        .iter()
        .find(|c| c.matches(unit))
        .map(|c| c.name)
}

/// Check if the unit is a currency symbol written before the number
pub fn is_front_unit(unit: &str) -> bool {
    CURRENCY_UNITS.iter().any(|c| c.front_units.contains(&unit))
}

impl Converter {
    /// Add the currency units to this converter
    ///
    /// Units are added one by one. If one fails, the ones before it stay
    /// registered. Calling this twice fails with
    /// [`ConverterBuilderError::DuplicateUnit`].
    pub fn register_currency_units(&mut self) -> Result<(), ConverterBuilderError> {
        for currency in CURRENCY_UNITS {
            self.push_unit(currency.to_unit())?;
        }
        tracing::trace!(count = CURRENCY_UNITS.len(), "registered currency units");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical() {
        assert_eq!(canonical_name("$"), Some("dollar"));
        assert_eq!(canonical_name("Dollars"), Some("dollar"));
        assert_eq!(canonical_name("₹"), Some("rupee"));
        assert_eq!(canonical_name("paisa"), Some("paise"));
        assert_eq!(canonical_name("cent"), Some("cent"));
        assert_eq!(canonical_name("km"), None);
        assert_eq!(canonical_name("dollar "), None);
    }

    #[test]
    fn front_units() {
        assert!(is_front_unit("$"));
        assert!(is_front_unit("Rs"));
        assert!(is_front_unit("₹"));
        assert!(!is_front_unit("dollar"));
        assert!(!is_front_unit("cents"));
    }

    #[test]
    fn register() {
        let mut converter = Converter::empty();
        converter.register_currency_units().unwrap();
        assert_eq!(converter.unit_count(), CURRENCY_UNITS.len());
        let unit = converter.find_unit("USD").unwrap();
        assert_eq!(unit.names[0].as_ref(), "dollar");
        assert_eq!(unit.quantity.as_ref(), "dollar");

        let err = converter.register_currency_units().unwrap_err();
        assert!(matches!(err, ConverterBuilderError::DuplicateUnit { .. }));
        assert_eq!(converter.unit_count(), CURRENCY_UNITS.len());
    }

    #[cfg(feature = "bundled_units")]
    #[test]
    fn partial_registration_keeps_earlier_units() {
        let mut converter = Converter::builder()
            .with_units_file(
                toml::from_str(
                    r#"
                    [[quantity]]
                    quantity = "length"
                    [[quantity.units]]
                    names = ["centimetre"]
                    aliases = ["cents"]
                    ratio = 0.01
                    "#,
                )
                .unwrap(),
            )
            .unwrap()
            .finish()
            .unwrap();
        let err = converter.register_currency_units().unwrap_err();
        assert!(matches!(err, ConverterBuilderError::DuplicateUnit { name } if name == "cents"));
        assert!(converter.is_known("dollar"));
        assert!(converter.is_known("₹"));
        assert!(!converter.is_known("cent"));
        assert!(!converter.is_known("paise"));
    }
}
