use super::{check_known, token_stream::Token, ParserError, TokenParser};
use crate::{
    convert::{currency, Converter},
    lexer::T,
    quantity::UnitTerm,
    span::Span,
};

/// Operator waiting for the factor it applies to
#[derive(Debug, Clone, Copy)]
enum Pending {
    Multiply(Span),
    Divide(Span),
}

impl Pending {
    fn span(self) -> Span {
        match self {
            Pending::Multiply(s) | Pending::Divide(s) => s,
        }
    }

    fn sign(pending: Option<Self>) -> i32 {
        match pending {
            Some(Pending::Divide(_)) => -1,
            _ => 1,
        }
    }
}

/// Parses the rest of the input as a unit expression and appends the terms
pub(super) fn unit_expression(
    line: &mut TokenParser,
    converter: &Converter,
    terms: &mut Vec<UnitTerm>,
) -> Result<(), ParserError> {
    let has_factor = !terms.is_empty();
    group_body(line, converter, None, has_factor, terms)
}

/// Parses factors until the end of the input or, if `open` is given, the
/// matching close paren.
fn group_body(
    line: &mut TokenParser,
    converter: &Converter,
    open: Option<Token>,
    mut has_factor: bool,
    terms: &mut Vec<UnitTerm>,
) -> Result<(), ParserError> {
    let mut pending: Option<Pending> = None;

    loop {
        let ws = !line.ws().is_empty();
        let next = line.peek_span();
        match line.peek() {
            T![eof] | T![')'] => {
                if let Some(op) = pending {
                    return Err(ParserError::ExpectedUnit {
                        operator: op.span(),
                        expected_pos: next,
                    });
                }
                match (line.peek(), open) {
                    (T![eof], None) => return Ok(()),
                    (T![eof], Some(open)) => {
                        return Err(ParserError::UnclosedParen {
                            open: open.span,
                            expected_pos: next,
                        })
                    }
                    (_, Some(_)) => {
                        line.bump_any();
                        return Ok(());
                    }
                    (_, None) => return Err(unexpected(line)),
                }
            }
            T![*] => {
                if !has_factor || pending.is_some() {
                    return Err(unexpected(line));
                }
                let tok = line.bump_any();
                pending = Some(Pending::Multiply(tok.span));
            }
            T![/] => {
                if pending.is_some() {
                    return Err(unexpected(line));
                }
                let tok = line.bump_any();
                pending = Some(Pending::Divide(tok.span));
            }
            T![word] if has_factor && pending.is_none() && ws && is_per(line) => {
                let tok = line.bump_any();
                pending = Some(Pending::Divide(tok.span));
            }
            T![int] if !has_factor && pending.is_none() && is_coefficient(line) => {
                line.bump_any();
                has_factor = true;
            }
            T![word] => {
                let tok = line.bump_any();
                let unit = line.token_str(tok);
                if currency::is_front_unit(unit) {
                    return Err(ParserError::CurrencyNotInFront {
                        unit: unit.to_string(),
                        unit_span: tok.span,
                    });
                }
                check_known(unit, tok.span, converter)?;
                let exponent = signed_exponent(line, pending)?;
                terms.push(UnitTerm::new(unit, exponent));
                pending = None;
                has_factor = true;
            }
            T!['('] => {
                let open = line.bump_any();
                let mut group = Vec::new();
                group_body(line, converter, Some(open), false, &mut group)?;
                if group.is_empty() {
                    return Err(ParserError::ExpectedUnit {
                        operator: open.span,
                        expected_pos: Span::pos(open.span.end()),
                    });
                }
                let exponent_start = line.current_offset();
                let exponent = signed_exponent(line, pending)?;
                for mut t in group {
                    t.exponent = t.exponent.checked_mul(exponent).ok_or_else(|| {
                        ParserError::InvalidExponent {
                            bad_bit: Span::new(exponent_start, line.current_offset()),
                        }
                    })?;
                    terms.push(t);
                }
                pending = None;
                has_factor = true;
            }
            _ => return Err(unexpected(line)),
        }
    }
}

/// Exponent of the next factor, negated if it is divided
fn signed_exponent(line: &mut TokenParser, pending: Option<Pending>) -> Result<i32, ParserError> {
    let start = line.current_offset();
    let exponent = match line.exponent() {
        Some(Ok(e)) => e,
        Some(Err(bad_bit)) => return Err(ParserError::InvalidExponent { bad_bit }),
        None => 1,
    };
    exponent
        .checked_mul(Pending::sign(pending))
        .ok_or_else(|| ParserError::InvalidExponent {
            bad_bit: Span::new(start, line.current_offset()),
        })
}

fn is_per(line: &TokenParser) -> bool {
    line.peek_token().is_some_and(|t| line.token_str(t) == "per")
        && line.peek_nth(1) == T![ws]
}

/// A `1` that is only there to write `1/s`
fn is_coefficient(line: &TokenParser) -> bool {
    line.peek_token().is_some_and(|t| line.token_str(t) == "1")
        && (line.peek_nth(1) == T![/]
            || (line.peek_nth(1) == T![ws] && line.peek_nth(2) == T![/]))
}

fn unexpected(line: &mut TokenParser) -> ParserError {
    let tok = line.bump_any();
    ParserError::UnexpectedToken {
        found: line.token_str(tok).to_string(),
        bad_bit: tok.span,
    }
}
