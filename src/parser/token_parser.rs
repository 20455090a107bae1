use super::token_stream::Token;
use crate::{
    lexer::{TokenKind, T},
    span::Span,
};

/// Cursor over the tokens of a whole input
///
/// - tokens must be adjacent and start at offset 0 (checked in debug)
/// - input is the whole input str given to the lexer
pub(crate) struct TokenParser<'t, 'i> {
    tokens: &'t [Token],
    current: usize,
    input: &'i str,
}

impl<'t, 'i> TokenParser<'t, 'i> {
    pub(crate) fn new(tokens: &'t [Token], input: &'i str) -> Self {
        debug_assert!(
            tokens.windows(2).all(|w| w[0].span.end() == w[1].span.start()),
            "tokens are not adjacent"
        );
        debug_assert!(
            tokens.last().map_or(true, |t| t.span.end() == input.len()),
            "tokens do not cover the input"
        );
        Self {
            tokens,
            current: 0,
            input,
        }
    }

    /// Returns the slice of tokens consumed inside the given function
    pub(crate) fn capture_slice<F>(&mut self, f: F) -> &'t [Token]
    where
        F: FnOnce(&mut Self),
    {
        let start = self.current;
        f(self);
        let end = self.current;
        &self.tokens[start..end]
    }

    /// Gets a token's matching str from the input
    pub(crate) fn token_str(&self, token: Token) -> &'i str {
        &self.input[token.span.range()]
    }

    pub(crate) fn slice_str(&self, s: &[Token]) -> &'i str {
        match (s.first(), s.last()) {
            (Some(first), Some(last)) => &self.input[first.span.start()..last.span.end()],
            _ => "",
        }
    }

    /// Returns the current offset from the start of input
    pub(crate) fn current_offset(&self) -> usize {
        self.parsed().last().map(|t| t.span.end()).unwrap_or(0)
    }

    pub(crate) fn parsed(&self) -> &'t [Token] {
        self.tokens.split_at(self.current).0
    }

    /// Span of the next token, or an empty span at the end of the input
    pub(crate) fn peek_span(&self) -> Span {
        self.tokens
            .get(self.current)
            .map(|t| t.span)
            .unwrap_or_else(|| Span::pos(self.input.len()))
    }

    pub(crate) fn peek_token(&self) -> Option<Token> {
        self.tokens.get(self.current).copied()
    }

    /// Peeks the next token without consuming it.
    pub(crate) fn peek(&self) -> TokenKind {
        self.peek_nth(0)
    }

    /// Peeks `n` tokens ahead without consuming anything.
    pub(crate) fn peek_nth(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.current + n)
            .map(|token| token.kind)
            .unwrap_or(TokenKind::Eof)
    }

    /// Checks the next token without consuming it.
    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    /// Advance to the next token.
    pub(crate) fn next_token(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.current).copied()?;
        self.current += 1;
        Some(token)
    }

    /// Same as [`Self::next_token`] but panics if there are no more tokens.
    pub(crate) fn bump_any(&mut self) -> Token {
        self.next_token()
            .expect("Expected token, but there was none")
    }

    /// Consumes while the closure returns true or the input ends
    pub(crate) fn consume_while(&mut self, f: impl Fn(TokenKind) -> bool) -> &'t [Token] {
        let rest = self.tokens.split_at(self.current).1;
        let pos = rest.iter().position(|t| !f(t.kind)).unwrap_or(rest.len());
        let s = &rest[..pos];
        self.current += pos;
        s
    }

    pub(crate) fn ws(&mut self) -> &'t [Token] {
        self.consume_while(|t| t == T![ws])
    }

    /// Call [`Self::next_token`] if the next token is `expected`.
    pub(crate) fn consume(&mut self, expected: TokenKind) -> Option<Token> {
        if self.at(expected) {
            Some(self.bump_any())
        } else {
            None
        }
    }

    /// Runs a function that can fail to parse the input.
    ///
    /// If the function fails, any token eaten by it will be restored.
    pub(crate) fn with_recover<F, O>(&mut self, f: F) -> Option<O>
    where
        F: FnOnce(&mut Self) -> Option<O>,
    {
        let old_current = self.current;
        let r = f(self);
        if r.is_none() {
            self.current = old_current;
        }
        r
    }

    /// Parses an exponent like `^2`, `^-1` or `^(-3)`
    ///
    /// Returns `None` if the next token is not `^`. On error, the span covers
    /// what was consumed of the exponent.
    pub(crate) fn exponent(&mut self) -> Option<Result<i32, Span>> {
        let caret = self.consume(T![^])?;
        let start = caret.span.start();
        let in_paren = self.consume(T!['(']).is_some();
        let sign = self.capture_slice(|line| {
            let _ = line.consume(T![-]).or_else(|| line.consume(T![+]));
        });
        let Some(int) = self.consume(T![int]) else {
            return Some(Err(Span::new(start, self.current_offset())));
        };
        if in_paren && self.consume(T![')']).is_none() {
            return Some(Err(Span::new(start, self.current_offset())));
        }
        let text = format!("{}{}", self.slice_str(sign), self.token_str(int));
        let r = text
            .parse::<i32>()
            .map_err(|_| Span::new(start, self.current_offset()));
        Some(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::token_stream::TokenStream;

    fn exponent(input: &str) -> Option<Result<i32, Span>> {
        let tokens: Vec<_> = TokenStream::new(input).collect();
        let mut line = TokenParser::new(&tokens, input);
        line.exponent()
    }

    #[test]
    fn exponents() {
        assert_eq!(exponent("^2"), Some(Ok(2)));
        assert_eq!(exponent("^-1"), Some(Ok(-1)));
        assert_eq!(exponent("^+3"), Some(Ok(3)));
        assert_eq!(exponent("^(-3)"), Some(Ok(-3)));
        assert_eq!(exponent("2"), None);
        assert_eq!(exponent("^"), Some(Err(Span::new(0, 1))));
        assert_eq!(exponent("^(2"), Some(Err(Span::new(0, 3))));
        assert_eq!(exponent("^99999999999"), Some(Err(Span::new(0, 12))));
    }

    #[test]
    fn recover() {
        let input = "km s";
        let tokens: Vec<_> = TokenStream::new(input).collect();
        let mut line = TokenParser::new(&tokens, input);
        let r: Option<()> = line.with_recover(|line| {
            line.bump_any();
            None
        });
        assert!(r.is_none());
        assert_eq!(line.current_offset(), 0);
        assert_eq!(line.peek_nth(2), T![word]);
        assert_eq!(line.peek_nth(3), T![eof]);
    }
}
