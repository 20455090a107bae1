//! Answer checking for "number with units" exercises.
//!
//! A learner answers with a number and some units, like `5 km/hr` or
//! `$ 2 1/2`, and the answer is compared against a rule input with one of two
//! rules:
//! - **equal to**: the same number written with the same units in the same
//!   order.
//! - **equivalent to**: the same physical magnitude, so `5 km` is equivalent
//!   to `5000 m`.
//!
//! Also includes:
//! - A parser for raw inputs with fractions, currencies and unit expressions.
//! - Rich error report with annotated code spans.
//! - A configurable unit registry with SI prefix expansion.
//!
//! # Basic usage
//! If you just want **to check a single** answer, see [`is_equal_to`] and
//! [`is_equivalent_to`].
//!
//! ```rust
//! # use number_with_units::{NumberWithUnits, RuleInputs, UnitTerm};
//! let answer = NumberWithUnits::new(5.0, vec![UnitTerm::new("km", 1)]).to_dict();
//! let inputs = RuleInputs {
//!     f: NumberWithUnits::new(5000.0, vec![UnitTerm::new("m", 1)]).to_dict(),
//! };
//! assert!(!number_with_units::is_equal_to(&answer, &inputs)?);
//! assert!(number_with_units::is_equivalent_to(&answer, &inputs)?);
//! # Ok::<(), number_with_units::RuleError>(())
//! ```
//!
//! If you are going to use a custom set of units or want to handle the
//! messages for invalid rule inputs, construct a [`NumberWithUnitsRules`]
//! yourself.
//!
//! ```rust
//! # use number_with_units::{Converter, NumberWithUnitsRules};
//! let mut converter = Converter::default();
//! converter.register_currency_units().unwrap();
//! let rules = NumberWithUnitsRules::new(converter)
//!     .with_alert(|message: &str| eprintln!("{message}"));
//! ```

#![warn(rustdoc::broken_intra_doc_links, clippy::doc_markdown)]

#[cfg(doc)]
pub mod _features {
    //! This lib has 1 feature, enabled by default:
    //! - `bundled_units`. Includes a units file with SI and common imperial
    //!   units. The default [`Converter`](crate::convert::Converter) use them
    //!   if this feature is enabled.
}

pub mod convert;
pub mod error;
pub mod parser;
pub mod quantity;
pub mod rules;
pub mod span;

mod lexer;

use once_cell::sync::Lazy;

pub use convert::Converter;
pub use error::RichError;
pub use parser::{parse_number_with_units, ParserError};
pub use quantity::{Fraction, NumberWithUnits, NumberWithUnitsDict, UnitTerm, Value, ValueKind};
pub use rules::{NumberWithUnitsRules, RuleError, RuleInputs, RuleOutcome};
pub use span::Span;

static DEFAULT_RULES: Lazy<NumberWithUnitsRules> = Lazy::new(NumberWithUnitsRules::default);

/// Check if an answer is exactly the rule input with the default rules
///
/// See [`NumberWithUnitsRules::is_equal_to`].
pub fn is_equal_to(answer: &NumberWithUnitsDict, inputs: &RuleInputs) -> Result<bool, RuleError> {
    DEFAULT_RULES.is_equal_to(answer, inputs)
}

/// Check if an answer is equivalent to the rule input with the default rules
///
/// See [`NumberWithUnitsRules::is_equivalent_to`].
pub fn is_equivalent_to(
    answer: &NumberWithUnitsDict,
    inputs: &RuleInputs,
) -> Result<bool, RuleError> {
    DEFAULT_RULES.is_equivalent_to(answer, inputs)
}
