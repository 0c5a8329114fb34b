//! Router rule parsing.
//!
//! Turns a Traefik rule such as
//! ``Host(`a.example.com`) && !PathPrefix(`/admin`)`` into an [`Expr`].
//!
//! Precedence, tightest first: `!`, `&&`, `||`. Binary operators are
//! left-associative. String arguments may be backtick raw strings or
//! double-quoted strings with backslash escapes.

use thiserror::Error;

use crate::routing::matcher::Matcher;

/// Deepest nesting accepted before the rule is rejected.
pub const MAX_DEPTH: usize = 64;

/// Errors produced while parsing a router rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("rule is empty")]
    Empty,

    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },

    #[error("unterminated string literal starting at offset {0}")]
    UnterminatedString(usize),

    #[error("invalid escape sequence '\\{found}' at offset {offset}")]
    InvalidEscape { found: char, offset: usize },

    #[error("unknown matcher {name:?} at offset {offset}")]
    UnknownMatcher { name: String, offset: usize },

    #[error("expected {expected} at offset {offset}, found {found}")]
    Unexpected {
        expected: &'static str,
        found: String,
        offset: usize,
    },

    #[error("rule nesting exceeds {0} levels")]
    TooDeep(usize),
}

/// Parsed rule expression, negation still in place.
///
/// `&&` and `||` chains are flattened into one node with two or more
/// operands, so tree depth only grows with `!` and parentheses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Call { matcher: Matcher, args: Vec<String> },
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Ident(String),
    Str(String),
    LParen,
    RParen,
    Comma,
    And,
    Or,
    Not,
}

impl TokenKind {
    fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("identifier {name:?}"),
            TokenKind::Str(value) => format!("string {value:?}"),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::And => "'&&'".to_string(),
            TokenKind::Or => "'||'".to_string(),
            TokenKind::Not => "'!'".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    offset: usize,
}

fn tokenize(input: &str) -> Result<Vec<Token>, RuleError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        let kind = match c {
            c if c.is_whitespace() => continue,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            '!' => TokenKind::Not,
            '&' | '|' => match chars.next_if(|&(_, next)| next == c) {
                Some(_) if c == '&' => TokenKind::And,
                Some(_) => TokenKind::Or,
                None => return Err(RuleError::UnexpectedChar { found: c, offset }),
            },
            '`' => {
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some((_, '`')) => break,
                        Some((_, ch)) => value.push(ch),
                        None => return Err(RuleError::UnterminatedString(offset)),
                    }
                }
                TokenKind::Str(value)
            }
            '"' => {
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some((_, '"')) => break,
                        Some((at, '\\')) => match chars.next() {
                            Some((_, '\\')) => value.push('\\'),
                            Some((_, '"')) => value.push('"'),
                            Some((_, 'n')) => value.push('\n'),
                            Some((_, 't')) => value.push('\t'),
                            Some((_, 'r')) => value.push('\r'),
                            Some((_, found)) => {
                                return Err(RuleError::InvalidEscape { found, offset: at })
                            }
                            None => return Err(RuleError::UnterminatedString(offset)),
                        },
                        Some((_, ch)) => value.push(ch),
                        None => return Err(RuleError::UnterminatedString(offset)),
                    }
                }
                TokenKind::Str(value)
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = String::from(c);
                while let Some((_, ch)) =
                    chars.next_if(|&(_, ch)| ch.is_ascii_alphanumeric() || ch == '_')
                {
                    name.push(ch);
                }
                TokenKind::Ident(name)
            }
            found => return Err(RuleError::UnexpectedChar { found, offset }),
        };
        tokens.push(Token { kind, offset });
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |t| t.offset)
    }

    fn unexpected(&self, expected: &'static str) -> RuleError {
        RuleError::Unexpected {
            expected,
            found: self
                .peek()
                .map_or_else(|| "end of rule".to_string(), TokenKind::describe),
            offset: self.offset(),
        }
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<(), RuleError> {
        if self.peek() == Some(&kind) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn enter(&mut self) -> Result<(), RuleError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(RuleError::TooDeep(MAX_DEPTH));
        }
        Ok(())
    }

    fn parse_or(&mut self) -> Result<Expr, RuleError> {
        let mut operands = vec![self.parse_and()?];
        while self.peek() == Some(&TokenKind::Or) {
            self.pos += 1;
            operands.push(self.parse_and()?);
        }
        Ok(collapse(operands, Expr::Or))
    }

    fn parse_and(&mut self) -> Result<Expr, RuleError> {
        let mut operands = vec![self.parse_unary()?];
        while self.peek() == Some(&TokenKind::And) {
            self.pos += 1;
            operands.push(self.parse_unary()?);
        }
        Ok(collapse(operands, Expr::And))
    }

    fn parse_unary(&mut self) -> Result<Expr, RuleError> {
        self.enter()?;
        let expr = match self.peek() {
            Some(TokenKind::Not) => {
                self.pos += 1;
                Expr::Not(Box::new(self.parse_unary()?))
            }
            Some(TokenKind::LParen) => {
                self.pos += 1;
                let inner = self.parse_or()?;
                self.expect(TokenKind::RParen, "')'")?;
                inner
            }
            Some(TokenKind::Ident(_)) => self.parse_call()?,
            _ => return Err(self.unexpected("matcher, '!' or '('")),
        };
        self.depth -= 1;
        Ok(expr)
    }

    fn parse_call(&mut self) -> Result<Expr, RuleError> {
        let Some(Token {
            kind: TokenKind::Ident(name),
            offset,
        }) = self.advance()
        else {
            return Err(self.unexpected("matcher"));
        };
        let matcher =
            Matcher::from_name(&name).ok_or(RuleError::UnknownMatcher { name, offset })?;

        self.expect(TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        if self.peek() == Some(&TokenKind::RParen) {
            self.pos += 1;
            return Ok(Expr::Call { matcher, args });
        }
        loop {
            match self.peek() {
                Some(TokenKind::Str(value)) => {
                    args.push(value.clone());
                    self.pos += 1;
                }
                _ => return Err(self.unexpected("string argument")),
            }
            match self.peek() {
                Some(TokenKind::Comma) => self.pos += 1,
                Some(TokenKind::RParen) => {
                    self.pos += 1;
                    return Ok(Expr::Call { matcher, args });
                }
                _ => return Err(self.unexpected("',' or ')'")),
            }
        }
    }
}

fn collapse(mut operands: Vec<Expr>, combine: fn(Vec<Expr>) -> Expr) -> Expr {
    match operands.len() {
        1 => operands.swap_remove(0),
        _ => combine(operands),
    }
}

/// Parse a router rule into an expression tree.
pub fn parse_rule(rule: &str) -> Result<Expr, RuleError> {
    let tokens = tokenize(rule)?;
    if tokens.is_empty() {
        return Err(RuleError::Empty);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        end: rule.len(),
    };
    let expr = parser.parse_or()?;
    if parser.peek().is_some() {
        return Err(parser.unexpected("'&&', '||' or end of rule"));
    }
    Ok(expr)
}
