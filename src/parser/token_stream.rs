use crate::{
    lexer::{self, Cursor, TokenKind},
    span::Span,
};

/// Lexer tokens with their location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Iterator over the tokens of an input. It does not yield [`TokenKind::Eof`].
pub struct TokenStream<'i> {
    cursor: Cursor<'i>,
    consumed: usize,
}

impl<'i> TokenStream<'i> {
    pub fn new(input: &'i str) -> Self {
        Self {
            cursor: Cursor::new(input),
            consumed: 0,
        }
    }
}

impl Iterator for TokenStream<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let lexer::Token { kind, len } = self.cursor.advance_token();
        if kind == TokenKind::Eof {
            return None;
        }
        let start = self.consumed;
        self.consumed += len as usize;
        Some(Token {
            kind,
            span: Span::new(start, self.consumed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::T;

    #[test]
    fn spans() {
        let tokens: Vec<_> = TokenStream::new("5 km^2").collect();
        assert_eq!(
            tokens,
            vec![
                Token {
                    kind: T![int],
                    span: Span::new(0, 1)
                },
                Token {
                    kind: T![ws],
                    span: Span::new(1, 2)
                },
                Token {
                    kind: T![word],
                    span: Span::new(2, 4)
                },
                Token {
                    kind: T![^],
                    span: Span::new(4, 5)
                },
                Token {
                    kind: T![int],
                    span: Span::new(5, 6)
                },
            ]
        );
    }
}
