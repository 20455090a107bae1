mod cursor;

pub use cursor::Cursor;

use finl_unicode::categories::CharacterCategories;

#[derive(Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub len: u32,
}

impl Token {
    fn new(kind: TokenKind, len: u32) -> Token {
        Token { kind, len }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// "+"
    Plus,
    /// "-"
    Minus,
    /// "/"
    Slash,
    /// "*"
    Star,
    /// "^"
    Caret,
    /// "("
    OpenParen,
    /// ")"
    CloseParen,
    /// "."
    Dot,

    /// "14", "014"
    Int,
    /// any other unicode punctuation characters
    Punctuation,
    /// Everything else. Unit symbols like "km", "$" or "µm"
    Word,

    /// " ", \t and newlines
    Whitespace,

    /// End of input
    Eof,
}

fn is_whitespace(c: char) -> bool {
    c.is_separator_space() || matches!(c, '\t' | '\n' | '\r')
}

fn is_word_char(c: char) -> bool {
    match c {
        c if c.is_alphabetic() => true,
        ' ' | '\n' | '\r' | '\t' | '0'..='9' | '.' => false,
        '+' | '-' | '/' | '*' | '^' | '(' | ')' => false,
        c if c.is_separator_space() || c.is_punctuation() => false,
        _ => true,
    }
}

impl Cursor<'_> {
    pub fn advance_token(&mut self) -> Token {
        let current = match self.bump() {
            Some(c) => c,
            None => return Token::new(TokenKind::Eof, 0),
        };

        let token_kind = match current {
            '0'..='9' => self.number(),

            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '/' => TokenKind::Slash,
            '*' => TokenKind::Star,
            '^' => TokenKind::Caret,
            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,
            '.' => TokenKind::Dot,

            c if is_whitespace(c) => self.whitespace(),
            c if c.is_punctuation() => TokenKind::Punctuation,

            // anything else, word
            _ => self.word(),
        };
        let token = Token::new(token_kind, self.pos_within_token());
        self.reset_pos_within_token();
        token
    }

    fn word(&mut self) -> TokenKind {
        debug_assert!(self.pos_within_token() > 0); // at least one char
        self.eat_while(is_word_char);
        TokenKind::Word
    }

    fn whitespace(&mut self) -> TokenKind {
        debug_assert!(is_whitespace(self.prev()));
        self.eat_while(is_whitespace);
        TokenKind::Whitespace
    }

    fn number(&mut self) -> TokenKind {
        debug_assert!(self.prev().is_ascii_digit());
        self.eat_while(|c| c.is_ascii_digit());
        TokenKind::Int
    }
}

/// Shorthand macro for [`TokenKind`]
macro_rules! T {
    [+] => {
        $crate::lexer::TokenKind::Plus
    };
    [-] => {
        $crate::lexer::TokenKind::Minus
    };
    [*] => {
        $crate::lexer::TokenKind::Star
    };
    [/] => {
        $crate::lexer::TokenKind::Slash
    };
    [^] => {
        $crate::lexer::TokenKind::Caret
    };
    ['('] => {
        $crate::lexer::TokenKind::OpenParen
    };
    [')'] => {
        $crate::lexer::TokenKind::CloseParen
    };
    [.] => {
        $crate::lexer::TokenKind::Dot
    };
    [word] => {
        $crate::lexer::TokenKind::Word
    };
    [int] => {
        $crate::lexer::TokenKind::Int
    };
    [ws] => {
        $crate::lexer::TokenKind::Whitespace
    };
    [punctuation] => {
        $crate::lexer::TokenKind::Punctuation
    };
    [eof] => {
        $crate::lexer::TokenKind::Eof
    };
}
pub(crate) use T;

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind::*;

    fn tokenize(input: &str) -> impl Iterator<Item = Token> + '_ {
        let mut cursor = Cursor::new(input);
        std::iter::from_fn(move || {
            let token = cursor.advance_token();
            if token.kind != TokenKind::Eof {
                Some(token)
            } else {
                None
            }
        })
    }

    macro_rules! t {
        ($input:expr, $token_kinds:expr) => {
            let got: Vec<TokenKind> = tokenize($input).map(|t| t.kind).collect();
            assert_eq!(got, $token_kinds, "Input was: '{}'", $input)
        };
    }

    #[test]
    fn word() {
        t!("km", vec![Word]);
        t!("degC", vec![Word]);
        t!("µm", vec![Word]);
        t!("km hr", vec![Word, Whitespace, Word]);
        t!("km\u{2009}hr", vec![Word, Whitespace, Word]); // unicode whitespace U+2009
        t!("m2", vec![Word, Int]);
        t!("a_b", vec![Word, Punctuation, Word]);
    }

    #[test]
    fn currency() {
        t!("$5", vec![Word, Int]);
        t!("₹ 5", vec![Word, Whitespace, Int]);
        t!("Rs5", vec![Word, Int]);
    }

    #[test]
    fn number() {
        t!("1", vec![Int]);
        t!("014", vec![Int]);
        t!("1.3", vec![Int, Dot, Int]);
        t!(".3", vec![Dot, Int]);
        t!("-2", vec![Minus, Int]);
        t!("2/3", vec![Int, Slash, Int]);
        t!("1 2/3", vec![Int, Whitespace, Int, Slash, Int]);
    }

    #[test]
    fn unit_expression() {
        t!("s^-1", vec![Word, Caret, Minus, Int]);
        t!("kg*m/s^2", vec![Word, Star, Word, Slash, Word, Caret, Int]);
        t!(
            "J/(kg K)",
            vec![Word, Slash, OpenParen, Word, Whitespace, Word, CloseParen]
        );
    }

    #[test]
    fn token_lengths() {
        let lens: Vec<u32> = tokenize("5 µm").map(|t| t.len).collect();
        assert_eq!(lens, vec![1, 1, 3]);
    }
}
