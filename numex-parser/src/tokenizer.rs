use logos::{Lexer, Logos};
use std::ops::Range;

/// The different kinds of tokens that can be produced by the tokenizer.
#[derive(Logos, Clone, Copy, Debug, PartialEq)]
pub enum TokenKind {
    #[regex(r"[ \t\n\r]+")]
    Whitespace,

    #[regex(r"\(\*([^*]|\*+[^*)])*\*+\)")]
    Comment,

    #[token("==")]
    Eq,

    #[token("!=")]
    NotEq,

    #[token("+")]
    Add,

    #[token("-")]
    Sub,

    #[token("*")]
    Mul,

    #[token("/")]
    Div,

    #[token("^")]
    Exp,

    #[token("++")]
    Increment,

    #[token("--")]
    Decrement,

    #[token(">")]
    Greater,

    #[token(">=")]
    GreaterEq,

    #[token("<")]
    Less,

    #[token("<=")]
    LessEq,

    #[token("!")]
    Not,

    #[token("&&")]
    And,

    #[token("||")]
    Or,

    #[token("=")]
    Assign,

    #[token("+=")]
    AddAssign,

    #[token("-=")]
    SubAssign,

    #[token("*=")]
    MulAssign,

    #[token("/=")]
    DivAssign,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token("(")]
    OpenParen,

    #[token(")")]
    CloseParen,

    #[token("[")]
    OpenBracket,

    #[token("]")]
    CloseBracket,

    #[token("{")]
    OpenBrace,

    #[token("}")]
    CloseBrace,

    #[regex(r"`?[a-zA-Z$][a-zA-Z0-9$]*(`[a-zA-Z$][a-zA-Z0-9$]*)*")]
    Name,

    #[regex(r"[0-9]+")]
    Int,

    #[regex(r"[0-9]+\.[0-9]*|\.[0-9]+")]
    Real,

    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    #[regex(r".", priority = 0)]
    Symbol,
}

impl TokenKind {
    /// Returns true if the token carries no meaning for the parser.
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }
}

/// A token produced by the tokenizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'source> {
    /// The region of the source code that this token originated from.
    pub span: Range<usize>,

    /// The kind of token.
    pub kind: TokenKind,

    /// The raw lexeme that was parsed into this token.
    pub lexeme: &'source str,
}

/// Returns an iterator over the token kinds produced by the tokenizer.
pub fn tokenize(input: &str) -> Lexer<TokenKind> {
    TokenKind::lexer(input)
}

/// Returns all the meaningful tokens produced by the tokenizer, dropping whitespace and comments.
/// Input the tokenizer cannot match at all becomes [`TokenKind::Symbol`] tokens, which the parser
/// then reports.
pub fn tokenize_complete(input: &str) -> Box<[Token]> {
    let mut lexer = tokenize(input);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let kind = result.unwrap_or(TokenKind::Symbol);
        if kind.is_trivia() {
            continue;
        }
        tokens.push(Token {
            span: lexer.span(),
            kind,
            lexeme: lexer.slice(),
        });
    }

    tokens.into_boxed_slice()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Compares the tokens produced by the tokenizer to the raw expected tokens.
    fn compare_tokens<'source, const N: usize>(input: &'source str, expected: [(TokenKind, &'source str); N]) {
        let mut lexer = tokenize(input);

        for (expected_kind, expected_lexeme) in expected.into_iter() {
            assert_eq!(lexer.next(), Some(Ok(expected_kind)));
            assert_eq!(lexer.slice(), expected_lexeme);
        }

        assert_eq!(lexer.next(), None);
    }

    #[test]
    fn basic_expr() {
        compare_tokens(
            "1 + 2.5",
            [
                (TokenKind::Int, "1"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Add, "+"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Real, "2.5"),
            ],
        );
    }

    #[test]
    fn application() {
        compare_tokens(
            "Sin[x^2]",
            [
                (TokenKind::Name, "Sin"),
                (TokenKind::OpenBracket, "["),
                (TokenKind::Name, "x"),
                (TokenKind::Exp, "^"),
                (TokenKind::Int, "2"),
                (TokenKind::CloseBracket, "]"),
            ],
        );
    }

    #[test]
    fn contexts_and_operators() {
        compare_tokens(
            "System`Pi i++ x+=1.",
            [
                (TokenKind::Name, "System`Pi"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Name, "i"),
                (TokenKind::Increment, "++"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Name, "x"),
                (TokenKind::AddAssign, "+="),
                (TokenKind::Real, "1."),
            ],
        );
    }

    #[test]
    fn comments_and_strings() {
        compare_tokens(
            "(* a ** comment *)\"s\\\"t\"",
            [
                (TokenKind::Comment, "(* a ** comment *)"),
                (TokenKind::String, "\"s\\\"t\""),
            ],
        );
    }

    #[test]
    fn complete_drops_trivia() {
        let tokens = tokenize_complete("a (* b *) c");
        let kinds = tokens.iter().map(|t| t.kind).collect::<Vec<_>>();
        assert_eq!(kinds, vec![TokenKind::Name, TokenKind::Name]);
        assert_eq!(tokens[1].span, 10..11);
    }
}
