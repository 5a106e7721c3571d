use crate::{
    error::{ExpectedEof, InvalidNumber, UnexpectedEof, UnexpectedToken},
    tokenizer::{tokenize_complete, Token, TokenKind},
};
use numex_error::{Error, ErrorKind};
use numex_expr::{symbol::GLOBAL, Atom, Expr, Symbol};
use rug::{Integer, Rational};
use std::ops::Range;

/// Names that resolve to the ``System` `` context when written without one. Everything else
/// lands in ``Global` ``.
const SYSTEM_NAMES: &[&str] = &[
    "Abs", "AddTo", "And", "ArcCos", "ArcCosh", "ArcSin", "ArcSinh", "ArcTan", "ArcTanh", "Arg",
    "Block", "Ceiling", "Complex", "CompoundExpression", "Conjugate", "Cos", "Cosh", "Cot", "Csc",
    "CubeRoot", "Decrement", "Degree", "DirectedInfinity", "Divide", "DivideBy", "Do", "E",
    "Equal", "Erf", "EulerGamma", "Exp", "False", "Floor", "For", "Gamma", "GoldenRatio",
    "Graphics3D", "GraphicsComplex", "Greater", "GreaterEqual", "Hypergeometric1F1",
    "HypergeometricPFQ", "I", "If", "Im", "Increment", "Indeterminate", "Infinity", "Less",
    "LessEqual", "List", "Log", "Log10", "Log2", "Max", "Min", "Minus", "Mod", "Module", "Not",
    "Null", "NumericArray", "Or", "Pi", "Plus", "Polygon", "Power", "PreDecrement", "PreIncrement",
    "Rational", "Re", "Round", "Sec", "Set", "Sign", "Sin", "Sinh", "Sqrt", "Subtract",
    "SubtractFrom", "Tan", "Tanh", "Times", "TimesBy", "True", "Unequal", "While", "With",
];

/// Resolves a name as written in the source to a symbol.
fn resolve_name(name: &str) -> Symbol {
    match name.rfind('`') {
        Some(idx) => {
            let (context, short) = (&name[..=idx], &name[idx + 1..]);
            match context.strip_prefix('`') {
                // a leading backtick is relative to the current context
                Some(relative) => Symbol::new(&format!("{}{}", GLOBAL, relative), short),
                None => Symbol::new(context, short),
            }
        },
        None if SYSTEM_NAMES.binary_search(&name).is_ok() => Symbol::system(name),
        None => Symbol::global(name),
    }
}

/// The precedence of an operation, in order from lowest precedence (evaluated last) to highest
/// precedence (evaluated first).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Precedence {
    /// Any precedence.
    Any,

    /// Precedence of `;`.
    Compound,

    /// Precedence of assignments (`=`, `+=`, `-=`, `*=`, `/=`).
    Assign,

    /// Precedence of logical or (`||`).
    Or,

    /// Precedence of logical and (`&&`).
    And,

    /// Precedence of logical not (`!`).
    Not,

    /// Precedence of comparisons (`==`, `!=`, `<`, `<=`, `>`, `>=`).
    Compare,

    /// Precedence of addition and subtraction, which separate terms.
    Term,

    /// Precedence of multiplication and division, explicit or implicit, which separate factors.
    Factor,

    /// Precedence of unary minus.
    Neg,

    /// Precedence of exponentiation (`^`).
    Exp,

    /// Precedence of postfix `++` and `--`.
    Postfix,

    /// Precedence of application (`f[x]`).
    Apply,
}

impl PartialOrd for Precedence {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        let left = *self as u8;
        let right = *other as u8;
        left.partial_cmp(&right)
    }
}

/// Negates an expression, folding numeric literals.
fn negate(expr: Expr) -> Expr {
    match expr {
        Expr::Atom(Atom::Integer(n)) => Expr::Atom(Atom::Integer(-n)),
        Expr::Atom(Atom::Rational(q)) => Expr::Atom(Atom::Rational(-q)),
        Expr::Atom(Atom::Real(x)) => Expr::Atom(Atom::Real(-x)),
        Expr::Atom(Atom::Complex(z)) => Expr::Atom(Atom::Complex(-z)),
        other => flat("Times", Expr::from(-1i64), other),
    }
}

/// Divides two expressions, folding the quotient of two integer literals into an exact rational.
fn divide(numerator: Expr, denominator: Expr) -> Expr {
    if let (Expr::Atom(Atom::Integer(n)), Expr::Atom(Atom::Integer(d))) = (&numerator, &denominator) {
        if *d != 0 {
            let q = Rational::from((n.clone(), d.clone()));
            return if *q.denom() == 1 {
                Expr::Atom(Atom::Integer(q.numer().clone()))
            } else {
                Expr::Atom(Atom::Rational(q))
            };
        }
    }
    flat("Times", numerator, Expr::call("Power", vec![denominator, Expr::from(-1i64)]))
}

/// Combines two operands of an associative operator, extending `lhs` if it already is an
/// application of the same operator.
fn flat(name: &str, lhs: Expr, rhs: Expr) -> Expr {
    match lhs {
        Expr::Apply(mut apply) if apply.head.as_symbol().is_some_and(|s| s.is_system_named(name)) => {
            apply.elements.push(rhs);
            Expr::Apply(apply)
        },
        lhs => Expr::call(name, vec![lhs, rhs]),
    }
}

/// Reads the contents of a string literal, including the surrounding quotes.
fn unescape(lexeme: &str) -> String {
    let inner = &lexeme[1..lexeme.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// A parser for the InputForm subset understood by numex.
#[derive(Debug, Clone)]
pub struct Parser<'source> {
    /// The meaningful tokens of the source.
    tokens: Box<[Token<'source>]>,

    /// The index of the **next** token to be parsed.
    cursor: usize,
}

impl<'source> Parser<'source> {
    /// Create a new parser for the given source.
    pub fn new(source: &'source str) -> Self {
        Self {
            tokens: tokenize_complete(source),
            cursor: 0,
        }
    }

    /// Creates an error that points at the current token, or the end of the source code if the
    /// cursor is at the end of the stream.
    pub fn error(&self, kind: impl ErrorKind) -> Error {
        Error::new(vec![self.span()], kind)
    }

    /// Returns a span pointing at the end of the source code.
    pub fn eof_span(&self) -> Range<usize> {
        self.tokens.last().map_or(0..0, |token| token.span.end..token.span.end)
    }

    /// Returns the span of the current token, or the end of the source code if the cursor is at
    /// the end of the stream.
    pub fn span(&self) -> Range<usize> {
        self.tokens
            .get(self.cursor)
            .map_or(self.eof_span(), |token| token.span.clone())
    }

    /// Returns the kind of the current token without moving the cursor.
    fn peek_kind(&self) -> Option<TokenKind> {
        self.tokens.get(self.cursor).map(|token| token.kind)
    }

    /// Returns the next token to be parsed, then advances the cursor.
    ///
    /// Returns an EOF error if there are no more tokens.
    pub fn next_token(&mut self) -> Result<Token<'source>, Error> {
        match self.tokens.get(self.cursor) {
            Some(token) => {
                self.cursor += 1;
                // cloning is cheap: only Range<_> is cloned
                Ok(token.clone())
            },
            None => Err(self.error(UnexpectedEof)),
        }
    }

    /// Creates the error for finding something other than `expected` at the cursor.
    fn unexpected(&self, expected: &'static str) -> Error {
        match self.tokens.get(self.cursor) {
            Some(token) => self.error(UnexpectedToken {
                expected,
                found: token.lexeme.to_string(),
            }),
            None => self.error(UnexpectedEof),
        }
    }

    /// Consumes a token of the given kind, or fails without moving the cursor.
    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token<'source>, Error> {
        if self.peek_kind() == Some(kind) {
            self.next_token()
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Returns true if the current token can start an operand, which makes it an implicit
    /// multiplication when it follows another operand.
    fn at_operand_start(&self) -> bool {
        matches!(
            self.peek_kind(),
            Some(TokenKind::Int | TokenKind::Real | TokenKind::String | TokenKind::Name
                | TokenKind::OpenParen | TokenKind::OpenBrace)
        )
    }

    /// Returns true if the current token ends an enclosing construct, or there is none.
    fn at_closing(&self) -> bool {
        matches!(
            self.peek_kind(),
            None | Some(TokenKind::Comma | TokenKind::CloseParen | TokenKind::CloseBracket
                | TokenKind::CloseBrace)
        )
    }

    /// Parses a complete expression. All tokens must be consumed.
    pub fn parse_full(&mut self) -> Result<Expr, Error> {
        let expr = self.parse_expr(Precedence::Any)?;
        if self.cursor == self.tokens.len() {
            Ok(expr)
        } else {
            Err(self.error(ExpectedEof))
        }
    }

    /// Parses an expression whose operators all bind tighter than `min`.
    pub fn parse_expr(&mut self, min: Precedence) -> Result<Expr, Error> {
        let mut lhs = self.parse_prefix()?;

        while let Some(kind) = self.peek_kind() {
            lhs = match kind {
                TokenKind::Semicolon if Precedence::Compound > min => self.parse_compound(lhs)?,
                TokenKind::Assign
                | TokenKind::AddAssign
                | TokenKind::SubAssign
                | TokenKind::MulAssign
                | TokenKind::DivAssign if Precedence::Assign > min => {
                    self.cursor += 1;
                    let rhs = self.parse_expr(Precedence::Compound)?;
                    let head = match kind {
                        TokenKind::Assign => "Set",
                        TokenKind::AddAssign => "AddTo",
                        TokenKind::SubAssign => "SubtractFrom",
                        TokenKind::MulAssign => "TimesBy",
                        _ => "DivideBy",
                    };
                    Expr::call(head, vec![lhs, rhs])
                },
                TokenKind::Or if Precedence::Or > min => {
                    self.cursor += 1;
                    flat("Or", lhs, self.parse_expr(Precedence::Or)?)
                },
                TokenKind::And if Precedence::And > min => {
                    self.cursor += 1;
                    flat("And", lhs, self.parse_expr(Precedence::And)?)
                },
                TokenKind::Eq
                | TokenKind::NotEq
                | TokenKind::Less
                | TokenKind::LessEq
                | TokenKind::Greater
                | TokenKind::GreaterEq if Precedence::Compare > min => self.parse_comparison(lhs)?,
                TokenKind::Add | TokenKind::Sub if Precedence::Term > min => {
                    self.cursor += 1;
                    let rhs = self.parse_expr(Precedence::Term)?;
                    let rhs = if kind == TokenKind::Sub { negate(rhs) } else { rhs };
                    flat("Plus", lhs, rhs)
                },
                TokenKind::Mul if Precedence::Factor > min => {
                    self.cursor += 1;
                    flat("Times", lhs, self.parse_expr(Precedence::Factor)?)
                },
                TokenKind::Div if Precedence::Factor > min => {
                    self.cursor += 1;
                    divide(lhs, self.parse_expr(Precedence::Factor)?)
                },
                _ if self.at_operand_start() && Precedence::Factor > min => {
                    flat("Times", lhs, self.parse_expr(Precedence::Factor)?)
                },
                TokenKind::Exp if Precedence::Exp > min => {
                    self.cursor += 1;
                    // right-associative
                    let rhs = self.parse_expr(Precedence::Neg)?;
                    Expr::call("Power", vec![lhs, rhs])
                },
                TokenKind::Increment | TokenKind::Decrement if Precedence::Postfix > min => {
                    self.cursor += 1;
                    let head = if kind == TokenKind::Increment { "Increment" } else { "Decrement" };
                    Expr::call(head, vec![lhs])
                },
                TokenKind::OpenBracket if Precedence::Apply > min => {
                    self.cursor += 1;
                    let args = self.parse_sequence(TokenKind::CloseBracket, "`,` or `]`")?;
                    Expr::apply(lhs, args)
                },
                _ => break,
            };
        }

        Ok(lhs)
    }

    /// Parses the rest of a compound expression, after its first element.
    fn parse_compound(&mut self, first: Expr) -> Result<Expr, Error> {
        let mut elements = vec![first];
        while self.peek_kind() == Some(TokenKind::Semicolon) {
            self.cursor += 1;
            if self.at_closing() {
                elements.push(Symbol::system("Null").into());
                break;
            }
            elements.push(self.parse_expr(Precedence::Compound)?);
        }
        Ok(Expr::call("CompoundExpression", elements))
    }

    /// Parses a chain of comparisons. `a < b <= c` becomes `And[Less[a, b], LessEqual[b, c]]`.
    fn parse_comparison(&mut self, first: Expr) -> Result<Expr, Error> {
        let mut operands = vec![first];
        let mut heads = Vec::new();
        loop {
            let head = match self.peek_kind() {
                Some(TokenKind::Eq) => "Equal",
                Some(TokenKind::NotEq) => "Unequal",
                Some(TokenKind::Less) => "Less",
                Some(TokenKind::LessEq) => "LessEqual",
                Some(TokenKind::Greater) => "Greater",
                Some(TokenKind::GreaterEq) => "GreaterEqual",
                _ => break,
            };
            self.cursor += 1;
            heads.push(head);
            operands.push(self.parse_expr(Precedence::Compare)?);
        }

        let mut pairs = heads
            .iter()
            .zip(operands.windows(2))
            .map(|(head, pair)| Expr::call(head, pair.to_vec()))
            .collect::<Vec<_>>();
        if pairs.len() == 1 {
            Ok(pairs.remove(0))
        } else {
            Ok(Expr::call("And", pairs))
        }
    }

    /// Parses comma-separated expressions up to and including the closing token.
    fn parse_sequence(&mut self, close: TokenKind, expected: &'static str) -> Result<Vec<Expr>, Error> {
        let mut elements = Vec::new();
        if self.peek_kind() == Some(close) {
            self.cursor += 1;
            return Ok(elements);
        }

        loop {
            elements.push(self.parse_expr(Precedence::Any)?);
            match self.peek_kind() {
                Some(TokenKind::Comma) => self.cursor += 1,
                Some(kind) if kind == close => {
                    self.cursor += 1;
                    return Ok(elements);
                },
                _ => return Err(self.unexpected(expected)),
            }
        }
    }

    /// Parses prefix operators and primary expressions.
    fn parse_prefix(&mut self) -> Result<Expr, Error> {
        let Some(kind) = self.peek_kind() else {
            return Err(self.error(UnexpectedEof));
        };

        match kind {
            TokenKind::Sub => {
                self.cursor += 1;
                Ok(negate(self.parse_expr(Precedence::Neg)?))
            },
            TokenKind::Add => {
                self.cursor += 1;
                self.parse_expr(Precedence::Neg)
            },
            TokenKind::Not => {
                self.cursor += 1;
                Ok(Expr::call("Not", vec![self.parse_expr(Precedence::Not)?]))
            },
            TokenKind::Increment | TokenKind::Decrement => {
                self.cursor += 1;
                let operand = self.parse_expr(Precedence::Postfix)?;
                let head = if kind == TokenKind::Increment { "PreIncrement" } else { "PreDecrement" };
                Ok(Expr::call(head, vec![operand]))
            },
            _ => self.parse_primary(),
        }
    }

    /// Parses a literal, a name, a parenthesized expression, or a list.
    fn parse_primary(&mut self) -> Result<Expr, Error> {
        let token = match self.peek_kind() {
            Some(TokenKind::Int | TokenKind::Real | TokenKind::String | TokenKind::Name
                | TokenKind::OpenParen | TokenKind::OpenBrace) => self.next_token()?,
            _ => return Err(self.unexpected("an expression")),
        };

        match token.kind {
            TokenKind::Int => token.lexeme
                .parse::<Integer>()
                .map(|n| Expr::Atom(Atom::Integer(n)))
                .map_err(|_| Error::new(vec![token.span.clone()], InvalidNumber {
                    lexeme: token.lexeme.to_string(),
                })),
            TokenKind::Real => token.lexeme
                .parse::<f64>()
                .map(Expr::from)
                .map_err(|_| Error::new(vec![token.span.clone()], InvalidNumber {
                    lexeme: token.lexeme.to_string(),
                })),
            TokenKind::String => Ok(Expr::Atom(Atom::String(unescape(token.lexeme)))),
            TokenKind::Name => Ok(Expr::Symbol(resolve_name(token.lexeme))),
            TokenKind::OpenParen => {
                let expr = self.parse_expr(Precedence::Any)?;
                self.expect(TokenKind::CloseParen, "`)`")?;
                Ok(expr)
            },
            _ => {
                let elements = self.parse_sequence(TokenKind::CloseBrace, "`,` or `}`")?;
                Ok(Expr::list(elements))
            },
        }
    }
}
