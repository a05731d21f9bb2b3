//! Boolean expressions.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use itertools::Itertools;

use crate::boolean::BooleanError;

/// Boolean expression over named variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoolExpr {
    /// Variable.
    Var(String),

    /// Negation: `~e`.
    Not(Box<BoolExpr>),

    /// Conjunction: `l & r`.
    And(Box<BoolExpr>, Box<BoolExpr>),

    /// Exclusive disjunction: `l ^ r`.
    Xor(Box<BoolExpr>, Box<BoolExpr>),

    /// Disjunction: `l | r`.
    Or(Box<BoolExpr>, Box<BoolExpr>),
}

impl BoolExpr {
    /// Parses the expression.
    ///
    /// Operators bind from tightest to loosest as `~`, `&`, `^`, `|`; parentheses group.
    pub fn parse(text: &str) -> Result<Self, BooleanError> {
        let mut parser = Parser { tokens: tokenize(text)?, pos: 0, end: text.len() };
        let expr = parser.parse_or()?;
        match parser.tokens.get(parser.pos) {
            None => Ok(expr),
            Some((position, token)) => {
                Err(BooleanError::Parse { position: *position, message: format!("unexpected {}", token) })
            }
        }
    }

    /// Constructs the negation of `self`.
    pub fn not(self) -> Self { Self::Not(Box::new(self)) }

    /// Constructs the conjunction of `self` and `rhs`.
    pub fn and(self, rhs: Self) -> Self { Self::And(Box::new(self), Box::new(rhs)) }

    /// Constructs the disjunction of `self` and `rhs`.
    pub fn or(self, rhs: Self) -> Self { Self::Or(Box::new(self), Box::new(rhs)) }

    /// Extends the expression by a don't-care variable: `(e & x) | (e & ~x)`.
    ///
    /// The result is equivalent to `self` and never depends on `var`.
    pub fn pad(self, var: &str) -> Self {
        let x = Self::Var(var.to_string());
        self.clone().and(x.clone()).or(self.and(x.not()))
    }

    /// Returns the variables in order of first appearance.
    pub fn vars(&self) -> Vec<&str> {
        let mut vars = Vec::new();
        self.collect_vars(&mut vars);
        vars.into_iter().unique().collect()
    }

    fn collect_vars<'a>(&'a self, vars: &mut Vec<&'a str>) {
        match self {
            Self::Var(name) => vars.push(name),
            Self::Not(inner) => inner.collect_vars(vars),
            Self::And(lhs, rhs) | Self::Xor(lhs, rhs) | Self::Or(lhs, rhs) => {
                lhs.collect_vars(vars);
                rhs.collect_vars(vars);
            }
        }
    }

    /// Evaluates the expression, looking variables up with `value_of`.
    pub fn eval<F: Fn(&str) -> bool>(&self, value_of: &F) -> bool {
        match self {
            Self::Var(name) => value_of(name),
            Self::Not(inner) => !inner.eval(value_of),
            Self::And(lhs, rhs) => lhs.eval(value_of) & rhs.eval(value_of),
            Self::Xor(lhs, rhs) => lhs.eval(value_of) ^ rhs.eval(value_of),
            Self::Or(lhs, rhs) => lhs.eval(value_of) | rhs.eval(value_of),
        }
    }
}

impl fmt::Display for BoolExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Var(name) => write!(f, "{}", name),
            Self::Not(inner) => write!(f, "~{}", inner),
            Self::And(lhs, rhs) => write!(f, "({} & {})", lhs, rhs),
            Self::Xor(lhs, rhs) => write!(f, "({} ^ {})", lhs, rhs),
            Self::Or(lhs, rhs) => write!(f, "({} | {})", lhs, rhs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Not,
    And,
    Xor,
    Or,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(name) => write!(f, "identifier {}", name),
            Self::Not => write!(f, "'~'"),
            Self::And => write!(f, "'&'"),
            Self::Xor => write!(f, "'^'"),
            Self::Or => write!(f, "'|'"),
            Self::LParen => write!(f, "'('"),
            Self::RParen => write!(f, "')'"),
        }
    }
}

/// Returns `true` for characters of a pin name.
pub(crate) fn is_word_char(c: char) -> bool { c.is_alphanumeric() || c == '_' }

fn tokenize(text: &str) -> Result<Vec<(usize, Token)>, BooleanError> {
    let mut tokens = Vec::new();
    let mut chars: Peekable<CharIndices<'_>> = text.char_indices().peekable();

    while let Some((position, c)) = chars.next() {
        let token = match c {
            '~' => Token::Not,
            '&' => Token::And,
            '^' => Token::Xor,
            '|' => Token::Or,
            '(' => Token::LParen,
            ')' => Token::RParen,
            c if c.is_whitespace() => continue,
            c if is_word_char(c) => {
                let mut name = c.to_string();
                while let Some((_, c)) = chars.next_if(|(_, c)| is_word_char(*c)) {
                    name.push(c);
                }
                Token::Ident(name)
            }
            c => return Err(BooleanError::Parse { position, message: format!("unexpected character {:?}", c) }),
        };
        tokens.push((position, token));
    }

    Ok(tokens)
}

#[derive(Debug)]
struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> { self.tokens.get(self.pos).map(|(_, token)| token) }

    fn position(&self) -> usize { self.tokens.get(self.pos).map(|(position, _)| *position).unwrap_or(self.end) }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> Result<BoolExpr, BooleanError> {
        let mut expr = self.parse_xor()?;
        while self.eat(&Token::Or) {
            expr = BoolExpr::Or(Box::new(expr), Box::new(self.parse_xor()?));
        }
        Ok(expr)
    }

    fn parse_xor(&mut self) -> Result<BoolExpr, BooleanError> {
        let mut expr = self.parse_and()?;
        while self.eat(&Token::Xor) {
            expr = BoolExpr::Xor(Box::new(expr), Box::new(self.parse_and()?));
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<BoolExpr, BooleanError> {
        let mut expr = self.parse_unary()?;
        while self.eat(&Token::And) {
            expr = BoolExpr::And(Box::new(expr), Box::new(self.parse_unary()?));
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<BoolExpr, BooleanError> {
        let position = self.position();
        match self.tokens.get(self.pos).map(|(_, token)| token.clone()) {
            Some(Token::Not) => {
                self.pos += 1;
                Ok(self.parse_unary()?.not())
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let expr = self.parse_or()?;
                if !self.eat(&Token::RParen) {
                    return Err(BooleanError::Parse { position: self.position(), message: "expected ')'".to_string() });
                }
                Ok(expr)
            }
            Some(Token::Ident(name)) => {
                self.pos += 1;
                Ok(BoolExpr::Var(name))
            }
            Some(token) => Err(BooleanError::Parse { position, message: format!("unexpected {}", token) }),
            None => Err(BooleanError::Parse { position, message: "unexpected end of expression".to_string() }),
        }
    }
}
