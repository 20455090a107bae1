//! Raw input parser
//!
//! Grammar:
//! ```txt
//! input      = ws? front_unit? ws? number ws? units? ws? Eof
//! front_unit = Word                       (only currency symbols like "$" or "Rs")
//!
//! number     = Minus? (mixed | frac | decimal)
//! mixed      = Int Whitespace frac
//! frac       = Int Slash Int
//! decimal    = Int (Dot Int?)? | Dot Int
//!
//! units      = factor (sep factor)*
//! sep        = Whitespace | ws? Star ws? | ws? Slash ws? | Whitespace "per" Whitespace
//! factor     = (Word | group) exponent? | "1" &(ws? Slash)
//! group      = OpenParen ws? units ws? CloseParen
//! exponent   = Caret (signed | OpenParen signed CloseParen)
//! signed     = (Minus | Plus)? Int
//! ```
//! A slash or "per" only divides the factor right after it, so `J/kg K` is
//! `J kg^-1 K`. Use a group to divide more: `J/(kg K)`.

mod token_parser;
pub(crate) mod token_stream;
mod units;

use std::borrow::Cow;

use thiserror::Error;

use crate::{
    convert::{currency, Converter},
    error::RichError,
    lexer::T,
    quantity::{Fraction, NumberWithUnits, UnitTerm, Value},
    span::Span,
};

pub(crate) use token_parser::TokenParser;
use token_stream::{Token, TokenStream};

/// Parse a raw input like `"2 1/2 km/hr"`, `"$ 5"` or `"-0.5 m s^-2"`
///
/// Every unit has to be known by the `converter`. Currency units need to be
/// registered first with [`Converter::register_currency_units`].
#[tracing::instrument(level = "debug", skip_all, fields(len = input.len()))]
pub fn parse_number_with_units(
    input: &str,
    converter: &Converter,
) -> Result<NumberWithUnits, ParserError> {
    let tokens: Vec<_> = TokenStream::new(input).collect();
    let mut line = TokenParser::new(&tokens, input);
    let mut terms = Vec::new();

    line.ws();
    if line.at(T![word]) {
        let tok = line.bump_any();
        let unit = line.token_str(tok);
        if !currency::is_front_unit(unit) {
            return Err(ParserError::MissingNumber {
                expected_pos: tok.span,
            });
        }
        check_known(unit, tok.span, converter)?;
        terms.push(UnitTerm::new(unit, 1));
        line.ws();
    }

    let value = number(&mut line)?;
    units::unit_expression(&mut line, converter, &mut terms)?;

    Ok(NumberWithUnits::new(value, terms))
}

fn check_known(unit: &str, span: Span, converter: &Converter) -> Result<(), ParserError> {
    if converter.is_known(unit) {
        Ok(())
    } else {
        Err(ParserError::UnknownUnit {
            unit: unit.to_string(),
            unit_span: span,
        })
    }
}

fn number(line: &mut TokenParser) -> Result<Value, ParserError> {
    let start = line.peek_span();
    let is_negative = line.consume(T![-]).is_some();

    if let Some(fraction) = line.with_recover(fraction) {
        let (whole, num, den) = fraction;
        let whole = match whole {
            Some(tok) => parse_int(line, tok)?,
            None => 0,
        };
        let numerator = parse_int(line, num)?;
        let denominator = parse_int(line, den)?;
        if denominator == 0 {
            return Err(ParserError::DivisionByZero {
                bad_bit: start.to(den.span),
            });
        }
        return Ok(Value::Fraction(Fraction::new(
            is_negative,
            whole,
            numerator,
            denominator,
        )));
    }

    let decimal = line.capture_slice(|line| {
        if line.consume(T![int]).is_some() {
            if line.consume(T![.]).is_some() {
                line.consume(T![int]);
            }
        } else if line.at(T![.]) && line.peek_nth(1) == T![int] {
            line.bump_any();
            line.bump_any();
        }
    });
    if decimal.is_empty() {
        return Err(ParserError::MissingNumber {
            expected_pos: line.peek_span(),
        });
    }
    let text = line.slice_str(decimal);
    let n = text.parse::<f64>().map_err(|source| ParserError::ParseFloat {
        bad_bit: Span::new(start.start(), line.current_offset()),
        source,
    })?;
    Ok(Value::Real(if is_negative { -n } else { n }))
}

/// `Int Slash Int` or `Int Whitespace Int Slash Int`
fn fraction(line: &mut TokenParser) -> Option<(Option<Token>, Token, Token)> {
    let first = line.consume(T![int])?;
    if line.consume(T![/]).is_some() {
        let den = line.consume(T![int])?;
        return Some((None, first, den));
    }
    line.consume(T![ws])?;
    let num = line.consume(T![int])?;
    line.consume(T![/])?;
    let den = line.consume(T![int])?;
    Some((Some(first), num, den))
}

fn parse_int(line: &TokenParser, tok: Token) -> Result<u64, ParserError> {
    line.token_str(tok)
        .parse::<u64>()
        .map_err(|source| ParserError::ParseInt {
            bad_bit: tok.span,
            source,
        })
}

/// Errors generated by [`parse_number_with_units`]
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParserError {
    #[error("Expected a number")]
    MissingNumber { expected_pos: Span },

    #[error("Error parsing integer number")]
    ParseInt {
        bad_bit: Span,
        source: std::num::ParseIntError,
    },

    #[error("Error parsing decimal number")]
    ParseFloat {
        bad_bit: Span,
        source: std::num::ParseFloatError,
    },

    #[error("Division by zero")]
    DivisionByZero { bad_bit: Span },

    #[error("Unknown unit: '{unit}'")]
    UnknownUnit { unit: String, unit_span: Span },

    #[error("Currency units must be at the beginning: '{unit}'")]
    CurrencyNotInFront { unit: String, unit_span: Span },

    #[error("Unexpected '{found}'")]
    UnexpectedToken { found: String, bad_bit: Span },

    #[error("Expected a unit")]
    ExpectedUnit { operator: Span, expected_pos: Span },

    #[error("Invalid exponent")]
    InvalidExponent { bad_bit: Span },

    #[error("Unclosed parenthesis")]
    UnclosedParen { open: Span, expected_pos: Span },
}

impl RichError for ParserError {
    fn labels(&self) -> Vec<(Span, Option<Cow<'static, str>>)> {
        use crate::error::label;
        match self {
            ParserError::MissingNumber { expected_pos } => {
                vec![label!(expected_pos, "expected a number here")]
            }
            ParserError::ParseInt { bad_bit, .. } => vec![label!(bad_bit)],
            ParserError::ParseFloat { bad_bit, .. } => vec![label!(bad_bit)],
            ParserError::DivisionByZero { bad_bit } => vec![label!(bad_bit)],
            ParserError::UnknownUnit { unit_span, .. } => vec![label!(unit_span)],
            ParserError::CurrencyNotInFront { unit_span, .. } => {
                vec![label!(unit_span, "move this before the number")]
            }
            ParserError::UnexpectedToken { bad_bit, .. } => vec![label!(bad_bit)],
            ParserError::ExpectedUnit {
                operator,
                expected_pos,
            } => vec![
                label!(operator, "after this"),
                label!(expected_pos, "expected a unit"),
            ],
            ParserError::InvalidExponent { bad_bit } => vec![label!(bad_bit)],
            ParserError::UnclosedParen { open, expected_pos } => vec![
                label!(open, "opened here"),
                label!(expected_pos, "expected ')'"),
            ],
        }
    }

    fn help(&self) -> Option<Cow<'static, str>> {
        use crate::error::help;
        match self {
            ParserError::MissingNumber { .. } => {
                help!("Write a number like 5, 2.5, 1/2 or 1 1/2 before the units")
            }
            ParserError::DivisionByZero { .. } => help!("The denominator cannot be 0"),
            ParserError::CurrencyNotInFront { unit, .. } => {
                help!(format!("Write it as '{unit} 5' instead of '5 {unit}'"))
            }
            ParserError::InvalidExponent { .. } => {
                help!("Exponents are integers, like m^2 or s^-1")
            }
            _ => None,
        }
    }

    fn code(&self) -> Option<&'static str> {
        Some("parser")
    }
}
