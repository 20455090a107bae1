//! Answer checking rules
//!
//! [`NumberWithUnitsRules`] holds the [`Converter`] with the currency units
//! registered and evaluates the two rules:
//! - [`NumberWithUnitsRules::is_equal_to`]: same value and same unit terms, in
//!   the same order.
//! - [`NumberWithUnitsRules::is_equivalent_to`]: same physical magnitude, so
//!   `5 km` is equivalent to `5000 m`.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    convert::{ConvertError, Converter, ConverterBuilderError},
    parser::ParserError,
    quantity::{NumberWithUnits, NumberWithUnitsDict},
};

/// Inputs of a rule, the value the answer is compared with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleInputs {
    pub f: NumberWithUnitsDict,
}

/// Result of [`NumberWithUnitsRules::check_equal_to`]
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    Match,
    Mismatch,
    /// The rule input itself is not valid
    InvalidInput(InvalidInput),
}

impl RuleOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, RuleOutcome::Match)
    }
}

/// Why a rule input was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInput {
    #[error("Duplicate unit '{unit}' is not allowed.")]
    DuplicateUnit { unit: String },
}

/// Errors generated by the rules
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuleError {
    #[error(transparent)]
    Parser(#[from] ParserError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
}

/// Receives user facing messages
///
/// Implemented for any `Fn(&str)`.
pub trait Alert {
    fn alert(&self, message: &str);
}

impl<F> Alert for F
where
    F: Fn(&str),
{
    fn alert(&self, message: &str) {
        self(message)
    }
}

/// Default [`Alert`], emits a `tracing` warning
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlert;

impl Alert for LogAlert {
    fn alert(&self, message: &str) {
        tracing::warn!("{message}");
    }
}

/// Find the first unit written more than once
///
/// The string is split by spaces and the tokens are compared exactly, so
/// `kg` and `Kg` are different, and so are `km` and `km^2`. The returned
/// token is the first one, in order of appearance, that appears again later.
///
/// ```
/// # use number_with_units::rules::find_duplicate_unit;
/// assert_eq!(find_duplicate_unit("5 km s km"), Some("km"));
/// assert_eq!(find_duplicate_unit("5 km s^-1"), None);
/// assert_eq!(find_duplicate_unit("5 km km^2"), None);
/// ```
pub fn find_duplicate_unit(canonical: &str) -> Option<&str> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for token in canonical.split(' ').map(str::trim).filter(|t| !t.is_empty()) {
        *counts.entry(token).or_default() += 1;
    }
    counts
        .into_iter()
        .find(|&(_, count)| count > 1)
        .map(|(token, _)| token)
}

/// Rules for number with units answers
///
/// This is `Send + Sync`, one instance can be shared to check answers from
/// many threads.
#[derive(Clone)]
pub struct NumberWithUnitsRules {
    converter: Converter,
    alert: Arc<dyn Alert + Send + Sync>,
}

impl std::fmt::Debug for NumberWithUnitsRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NumberWithUnitsRules")
            .field("converter", &self.converter)
            .finish_non_exhaustive()
    }
}

impl Default for NumberWithUnitsRules {
    fn default() -> Self {
        let (rules, status) = Self::with_currency_units();
        if let Err(err) = status {
            tracing::debug!("ignoring currency units setup error: {err}");
        }
        rules
    }
}

impl NumberWithUnitsRules {
    /// Use a custom converter
    ///
    /// The converter is used as is, register the currency units before if
    /// they are needed.
    pub fn new(converter: Converter) -> Self {
        Self {
            converter,
            alert: Arc::new(LogAlert),
        }
    }

    /// Default [`Converter`] with the currency units
    ///
    /// The rules are usable even if the registration fails, but some currency
    /// units may be missing.
    pub fn with_currency_units() -> (Self, Result<(), ConverterBuilderError>) {
        let mut converter = Converter::default();
        let status = converter.register_currency_units();
        (Self::new(converter), status)
    }

    /// Change where the user facing messages go
    pub fn with_alert(mut self, alert: impl Alert + Send + Sync + 'static) -> Self {
        self.alert = Arc::new(alert);
        self
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    /// Check if the answer is exactly the rule input
    ///
    /// Value and unit terms have to be the same, in the same order, after
    /// normalizing both through their canonical string. A rule input with a
    /// duplicated unit is [`RuleOutcome::InvalidInput`].
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn check_equal_to(
        &self,
        answer: &NumberWithUnitsDict,
        inputs: &RuleInputs,
    ) -> Result<RuleOutcome, RuleError> {
        let answer = NumberWithUnits::from(answer).to_canonical_string();
        let input = NumberWithUnits::from(&inputs.f).to_canonical_string();

        if let Some(unit) = find_duplicate_unit(&input) {
            return Ok(RuleOutcome::InvalidInput(InvalidInput::DuplicateUnit {
                unit: unit.to_string(),
            }));
        }

        let answer = NumberWithUnits::from_raw_input(&answer, &self.converter)?.to_dict();
        let input = NumberWithUnits::from_raw_input(&input, &self.converter)?.to_dict();

        Ok(if answer == input {
            RuleOutcome::Match
        } else {
            RuleOutcome::Mismatch
        })
    }

    /// Same as [`Self::check_equal_to`], but an invalid rule input is sent to
    /// the alert and the answer is not equal.
    pub fn is_equal_to(
        &self,
        answer: &NumberWithUnitsDict,
        inputs: &RuleInputs,
    ) -> Result<bool, RuleError> {
        match self.check_equal_to(answer, inputs)? {
            RuleOutcome::Match => Ok(true),
            RuleOutcome::Mismatch => Ok(false),
            RuleOutcome::InvalidInput(invalid) => {
                self.alert.alert(&invalid.to_string());
                Ok(false)
            }
        }
    }

    /// Check if the answer is the same physical magnitude as the rule input
    ///
    /// Fractions are converted to real numbers first. Quantities with
    /// different dimensions are never equivalent.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn is_equivalent_to(
        &self,
        answer: &NumberWithUnitsDict,
        inputs: &RuleInputs,
    ) -> Result<bool, RuleError> {
        let answer = NumberWithUnits::from(answer).to_real().to_canonical_string();
        let input = NumberWithUnits::from(&inputs.f).to_real().to_canonical_string();

        let answer = self.converter.parse(&answer)?;
        let input = self.converter.parse(&input)?;
        Ok(answer.equals(&input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::{Fraction, UnitTerm};
    use std::sync::Mutex;
    use test_case::test_case;

    fn dict(value: f64, units: &[(&str, i32)]) -> NumberWithUnitsDict {
        NumberWithUnits::new(
            value,
            units.iter().map(|&(u, e)| UnitTerm::new(u, e)).collect(),
        )
        .to_dict()
    }

    #[test_case("" => None; "empty")]
    #[test_case("5" => None; "only value")]
    #[test_case("5 km s" => None; "no duplicates")]
    #[test_case("5 km km" => Some("km"); "duplicate")]
    #[test_case("5 m s m s" => Some("m"); "first inserted wins")]
    #[test_case("5 s m m s" => Some("s"); "insertion order")]
    #[test_case("5 kg Kg" => None; "case sensitive")]
    #[test_case("5  km   km " => Some("km"); "extra spaces")]
    fn duplicates(input: &str) -> Option<&str> {
        find_duplicate_unit(input)
    }

    #[test]
    fn alert_on_duplicate_input() {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&messages);
        let rules = NumberWithUnitsRules::default()
            .with_alert(move |m: &str| sink.lock().unwrap().push(m.to_string()));

        let answer = dict(5.0, &[("kg", 1)]);
        let inputs = RuleInputs {
            f: dict(5.0, &[("kg", 1), ("kg", 1)]),
        };
        assert_eq!(
            rules.check_equal_to(&answer, &inputs).unwrap(),
            RuleOutcome::InvalidInput(InvalidInput::DuplicateUnit { unit: "kg".into() })
        );
        assert!(!rules.is_equal_to(&answer, &inputs).unwrap());
        assert_eq!(
            messages.lock().unwrap().as_slice(),
            ["Duplicate unit 'kg' is not allowed."]
        );
    }

    #[cfg(feature = "bundled_units")]
    #[test]
    fn equal_and_equivalent() {
        let rules = NumberWithUnitsRules::default();
        let answer = dict(5.0, &[("km", 1), ("s", -1)]);
        let inputs = RuleInputs {
            f: dict(5.0, &[("s", -1), ("km", 1)]),
        };
        assert_eq!(
            rules.check_equal_to(&answer, &inputs).unwrap(),
            RuleOutcome::Mismatch
        );
        assert!(rules.is_equivalent_to(&answer, &inputs).unwrap());

        let half = NumberWithUnits::new(Fraction::new(false, 0, 1, 2), vec![UnitTerm::new("kg", 1)])
            .to_dict();
        let inputs = RuleInputs {
            f: dict(500.0, &[("g", 1)]),
        };
        assert!(rules.is_equivalent_to(&half, &inputs).unwrap());
        assert!(!rules.is_equal_to(&half, &inputs).unwrap());
    }

    #[cfg(feature = "bundled_units")]
    #[test]
    fn zero_denominator_is_rejected() {
        let rules = NumberWithUnitsRules::default();
        let zero = NumberWithUnits::new(Fraction::new(false, 0, 0, 0), vec![UnitTerm::new("m", 1)])
            .to_dict();
        let inputs = RuleInputs {
            f: dict(0.0, &[("m", 1)]),
        };
        assert!(matches!(
            rules.check_equal_to(&zero, &inputs),
            Err(RuleError::Parser(ParserError::DivisionByZero { .. }))
        ));
        assert!(rules.is_equal_to(&zero, &inputs).is_err());
        assert!(rules.is_equivalent_to(&zero, &inputs).is_err());
    }

    #[test]
    fn rules_are_send_and_sync() {
        fn check<T: Send + Sync>() {}
        check::<NumberWithUnitsRules>();
    }
}
