// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Template conditional expressions.
//!
//! Ignore files gate lines behind template conditionals such as
//! `{{ if and .modules.shell.enabled (eq .chezmoi.os "linux") }}`. Only a small
//! predicate language is understood:
//!
//! | Form                              | Meaning                                   |
//! |-----------------------------------|-------------------------------------------|
//! | `not <expr>`                      | negation                                  |
//! | `and <expr>...`                   | all operands true                         |
//! | `or <expr>...`                    | any operand true                          |
//! | `eq .chezmoi.os "<name>"`         | current platform is `<name>`              |
//! | `ne .chezmoi.os "<name>"`         | current platform is not `<name>`          |
//! | `.modules.<name>.enabled`         | module is enabled                         |
//! | `.modules.<name>.<property>`      | module property is truthy                 |
//!
//! `.platform.os` works in place of `.chezmoi.os`. Keywords ignore case.
//!
//! # Fail Open
//!
//! Anything outside the grammar parses to [`Expr::Unknown`], which evaluates
//! to true, so unknown predicates never hide content. Negating an unknown
//! operand still negates it, so `not (lookPath "zsh")` is false. Callers that
//! need strict rejection check for [`Expr::is_unknown`] themselves.
//!
//! Nesting deeper than [`MAX_DEPTH`] is not understood either.
//!
//! # Limitations
//!
//! Operands of `and` and `or` are parsed greedily. An `and` or `or` nested
//! inside another one without parentheses swallows every remaining operand.

use crate::{config::Config, platform::Platform};

use tracing::debug;

const PLATFORM_PATHS: &[&str] = &[".chezmoi.os", ".platform.os"];

/// Deepest nesting of parentheses and operators the parser descends into.
pub const MAX_DEPTH: usize = 64;

/// Parsed conditional expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    PlatformEq(String),
    ModuleEnabled(String),
    ModuleProperty(String, String),
    Unknown,
}

impl Expr {
    /// Parse conditional expression.
    ///
    /// Template delimiters around the expression are tolerated. Never fails,
    /// unrecognized input yields [`Expr::Unknown`].
    pub fn parse(expression: impl AsRef<str>) -> Self {
        let source = strip_delimiters(expression.as_ref());
        let mut parser = Parser::new(tokenize(source));
        match parser.parse_expr() {
            Some(expr) if parser.is_done() => expr,
            _ => {
                debug!("unrecognized conditional {source:?}, treating it as true");
                Self::Unknown
            }
        }
    }

    /// Evaluate expression against configuration on target platform.
    pub fn evaluate(&self, config: &Config, platform: Platform) -> bool {
        match self {
            Self::Not(expr) => !expr.evaluate(config, platform),
            Self::And(exprs) => exprs.iter().all(|expr| expr.evaluate(config, platform)),
            Self::Or(exprs) => exprs.iter().any(|expr| expr.evaluate(config, platform)),
            Self::PlatformEq(name) => platform.is_named(name),
            Self::ModuleEnabled(module) => config.is_enabled(module),
            Self::ModuleProperty(module, property) => config
                .module(module)
                .is_some_and(|state| state.property_is_truthy(property)),
            Self::Unknown => true,
        }
    }

    /// Expression fell outside the supported grammar.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

/// Parse and evaluate conditional expression in one go.
pub fn evaluate(expression: impl AsRef<str>, config: &Config, platform: Platform) -> bool {
    Expr::parse(expression).evaluate(config, platform)
}

fn strip_delimiters(expression: &str) -> &str {
    let mut source = expression.trim();
    if let Some(rest) = source.strip_prefix("{{") {
        source = rest.strip_prefix('-').unwrap_or(rest);
    }
    if let Some(rest) = source.strip_suffix("}}") {
        source = rest.strip_suffix('-').unwrap_or(rest);
    }

    source.trim()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Quoted(String),
    Open,
    Close,
}

impl Token {
    fn starts_expr(&self) -> bool {
        match self {
            Self::Word(word) => {
                word.starts_with('.')
                    || matches!(
                        word.to_ascii_lowercase().as_str(),
                        "not" | "and" | "or" | "eq" | "ne"
                    )
            }
            Self::Open => true,
            _ => false,
        }
    }
}

/// Split on whitespace outside of double quotes. Parentheses are tokens of
/// their own.
fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut chars = source.chars();

    let flush = |word: &mut String, tokens: &mut Vec<Token>| {
        if !word.is_empty() {
            tokens.push(Token::Word(std::mem::take(word)));
        }
    };

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                flush(&mut word, &mut tokens);
                let quoted = chars.by_ref().take_while(|ch| *ch != '"').collect();
                tokens.push(Token::Quoted(quoted));
            }
            '(' => {
                flush(&mut word, &mut tokens);
                tokens.push(Token::Open);
            }
            ')' => {
                flush(&mut word, &mut tokens);
                tokens.push(Token::Close);
            }
            ch if ch.is_whitespace() => flush(&mut word, &mut tokens),
            ch => word.push(ch),
        }
    }
    flush(&mut word, &mut tokens);

    tokens
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn is_done(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn parse_expr(&mut self) -> Option<Expr> {
        // INVARIANT: Recursion stays bounded no matter what the input holds.
        if self.depth >= MAX_DEPTH {
            return None;
        }

        self.depth += 1;
        let expr = self.parse_term();
        self.depth -= 1;
        expr
    }

    fn parse_term(&mut self) -> Option<Expr> {
        match self.next()? {
            Token::Open => {
                let expr = self.parse_expr()?;
                match self.next()? {
                    Token::Close => Some(expr),
                    _ => None,
                }
            }
            Token::Word(word) if word.starts_with('.') => parse_field(&word),
            Token::Word(word) => match word.to_ascii_lowercase().as_str() {
                "not" => self.parse_negation(),
                "and" => Some(Expr::And(self.parse_operands()?)),
                "or" => Some(Expr::Or(self.parse_operands()?)),
                "eq" => self.parse_platform_eq(),
                "ne" => Some(Expr::Not(Box::new(self.parse_platform_eq()?))),
                _ => None,
            },
            _ => None,
        }
    }

    fn parse_negation(&mut self) -> Option<Expr> {
        self.peek().filter(|token| **token != Token::Close)?;
        Some(Expr::Not(Box::new(self.parse_operand())))
    }

    fn parse_operands(&mut self) -> Option<Vec<Expr>> {
        let mut operands = Vec::new();
        while self.peek().is_some_and(|token| *token != Token::Close) {
            operands.push(self.parse_operand());
        }

        (!operands.is_empty()).then_some(operands)
    }

    /// Parse a single operand, recovering to [`Expr::Unknown`] by skipping
    /// ahead to the next token that can start an expression.
    fn parse_operand(&mut self) -> Expr {
        let start = self.pos;
        if let Some(expr) = self.parse_expr() {
            return expr;
        }

        self.pos = start;
        self.skip_token();
        while self
            .peek()
            .is_some_and(|token| !token.starts_expr() && *token != Token::Close)
        {
            self.skip_token();
        }

        Expr::Unknown
    }

    fn skip_token(&mut self) {
        if self.next() != Some(Token::Open) {
            return;
        }

        let mut depth = 1;
        while depth > 0 {
            match self.next() {
                Some(Token::Open) => depth += 1,
                Some(Token::Close) => depth -= 1,
                Some(_) => continue,
                None => break,
            }
        }
    }

    fn parse_platform_eq(&mut self) -> Option<Expr> {
        match (self.next()?, self.next()?) {
            (Token::Word(path), Token::Quoted(name)) | (Token::Quoted(name), Token::Word(path))
                if is_platform_path(&path) =>
            {
                Some(Expr::PlatformEq(name))
            }
            _ => None,
        }
    }
}

fn is_platform_path(path: &str) -> bool {
    PLATFORM_PATHS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(path))
}

fn parse_field(path: &str) -> Option<Expr> {
    let mut segments = path.trim_start_matches('.').split('.');
    match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(root), Some(module), Some(field), None)
            if root.eq_ignore_ascii_case("modules") && !module.is_empty() && !field.is_empty() =>
        {
            if field.eq_ignore_ascii_case("enabled") {
                Some(Expr::ModuleEnabled(module.to_string()))
            } else {
                Some(Expr::ModuleProperty(module.to_string(), field.to_string()))
            }
        }
        _ => None,
    }
}
