//! Enhanced-geometry formula evaluation
//!
//! Custom shapes describe their outline with an `enhanced-path` whose
//! coordinates may refer to named equations (`?f0`), adjustment modifiers
//! (`$0`) and frame constants (`width`, `logheight`, ...). Equations can
//! refer to each other in any order, so they are resolved in rounds until no
//! new value appears. The path is then rewritten into plain SVG path data in
//! view-box coordinates.

use std::collections::HashMap;
use std::f64::consts::PI;

use odtmark_odf::model::EnhancedGeometry;

use crate::diagnostics::{codes, Diagnostic};

/// Upper bound on equation resolution rounds
pub const MAX_ROUNDS: usize = 64;

const DEFAULT_VIEW_BOX: [f64; 4] = [0.0, 0.0, 21600.0, 21600.0];

/// Why a formula could not be evaluated
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Refers to a name with no value (yet)
    Unresolved(String),
    /// Not a well-formed expression
    Syntax(String),
}

/// A shape's outline in SVG terms
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPath {
    /// `min-x min-y width height` the path coordinates live in
    pub view_box: [f64; 4],
    /// SVG path data
    pub path: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Evaluates formulas against frame constants, modifiers and equations
#[derive(Debug, Clone)]
pub struct Evaluator {
    view_box: [f64; 4],
    has_fill: bool,
    has_stroke: bool,
    modifiers: Vec<f64>,
    values: HashMap<String, f64>,
}

impl Evaluator {
    pub fn new(view_box: [f64; 4], modifiers: Vec<f64>, has_fill: bool, has_stroke: bool) -> Self {
        Self {
            view_box,
            has_fill,
            has_stroke,
            modifiers,
            values: HashMap::new(),
        }
    }

    /// Resolve equations to a fixed point
    ///
    /// Returns the names still unresolved after [`MAX_ROUNDS`] rounds or when
    /// a round makes no progress, in equation order.
    pub fn resolve<'e>(&mut self, equations: impl IntoIterator<Item = (&'e str, &'e str)>) -> Vec<String> {
        let mut pending: Vec<(String, &str)> = equations
            .into_iter()
            .map(|(name, formula)| (normalize_name(name).to_string(), formula))
            .collect();

        for _ in 0..MAX_ROUNDS {
            let before = pending.len();
            pending.retain(|(name, formula)| match self.eval(formula) {
                Ok(value) => {
                    self.values.insert(name.clone(), value);
                    false
                }
                Err(_) => true,
            });
            if pending.is_empty() || pending.len() == before {
                break;
            }
        }

        pending.into_iter().map(|(name, _)| name).collect()
    }

    /// Value of a resolved equation
    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.get(normalize_name(name)).copied()
    }

    /// Evaluate one formula
    pub fn eval(&self, formula: &str) -> Result<f64, EvalError> {
        let tokens = tokenize(formula)?;
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            eval: self,
        };
        let value = parser.expr()?;
        if parser.pos != tokens.len() {
            return Err(EvalError::Syntax(format!("trailing input in `{formula}`")));
        }
        Ok(if value.is_finite() { value } else { 0.0 })
    }

    fn constant(&self, name: &str) -> Option<f64> {
        let [left, top, width, height] = self.view_box;
        Some(match name {
            "left" => left,
            "top" => top,
            "right" => left + width,
            "bottom" => top + height,
            "width" | "logwidth" => width,
            "height" | "logheight" => height,
            "xstretch" | "ystretch" => 0.0,
            "hasstroke" => flag(self.has_stroke),
            "hasfill" => flag(self.has_fill),
            "pi" => PI,
            _ => return None,
        })
    }

    fn reference(&self, name: &str) -> Result<f64, EvalError> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| EvalError::Unresolved(name.to_string()))
    }

    fn modifier(&self, index: &str) -> Result<f64, EvalError> {
        index
            .parse::<usize>()
            .ok()
            .and_then(|i| self.modifiers.get(i).copied())
            .ok_or_else(|| EvalError::Unresolved(format!("${index}")))
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// `?f0` and `f0` name the same equation
fn normalize_name(name: &str) -> &str {
    name.trim().trim_start_matches('?')
}

/// Resolve a custom shape's path into SVG path data
pub fn resolve_path(geometry: &EnhancedGeometry, has_fill: bool, has_stroke: bool) -> ResolvedPath {
    let view_box = geometry
        .view_box
        .as_deref()
        .and_then(parse_view_box)
        .unwrap_or(DEFAULT_VIEW_BOX);
    let modifiers = geometry
        .modifiers
        .as_deref()
        .unwrap_or("")
        .split_whitespace()
        .filter_map(|m| m.parse().ok())
        .collect();

    let mut evaluator = Evaluator::new(view_box, modifiers, has_fill, has_stroke);
    let mut diagnostics = Vec::new();

    let unresolved = evaluator.resolve(
        geometry
            .equations
            .iter()
            .map(|eq| (eq.name.as_str(), eq.formula.as_str())),
    );
    for name in unresolved {
        log::warn!("shape equation {name} did not resolve");
        diagnostics.push(
            Diagnostic::warning(format!("Shape formula `{name}` could not be resolved"))
                .with_code(codes::UNRESOLVED_FORMULA),
        );
    }

    let path = rewrite_path(
        geometry.enhanced_path.as_deref().unwrap_or(""),
        &evaluator,
        &mut diagnostics,
    );

    ResolvedPath {
        view_box,
        path,
        diagnostics,
    }
}

fn parse_view_box(value: &str) -> Option<[f64; 4]> {
    let numbers: Vec<f64> = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().ok())
        .collect::<Option<_>>()?;
    match numbers.as_slice() {
        [x, y, w, h] if *w > 0.0 && *h > 0.0 => Some([*x, *y, *w, *h]),
        _ => None,
    }
}

/// Rewrite an enhanced path into SVG path data
fn rewrite_path(path: &str, evaluator: &Evaluator, diagnostics: &mut Vec<Diagnostic>) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut skipping = false;
    let mut reported: Vec<char> = Vec::new();

    for token in path_tokens(path) {
        if let Some(command) = single_command(token) {
            match command {
                'M' | 'L' | 'C' | 'Q' | 'Z' => {
                    skipping = false;
                    out.push(command.to_string());
                }
                'N' | 'F' | 'S' => skipping = false,
                other => {
                    skipping = true;
                    if !reported.contains(&other) {
                        reported.push(other);
                        log::warn!("unsupported shape path command {other}");
                        diagnostics.push(
                            Diagnostic::warning(format!(
                                "Shape path command `{other}` is not supported and was skipped"
                            ))
                            .with_code(codes::UNSUPPORTED_PATH_COMMAND),
                        );
                    }
                }
            }
            continue;
        }
        if skipping {
            continue;
        }
        match evaluator.eval(token) {
            Ok(value) => out.push(fmt_num(value)),
            Err(_) => {
                log::warn!("unresolved shape path parameter {token}");
                diagnostics.push(
                    Diagnostic::warning(format!("Shape path parameter `{token}` could not be resolved"))
                        .with_code(codes::UNRESOLVED_FORMULA),
                );
                out.push(token.to_string());
            }
        }
    }
    out.join(" ")
}

/// Split path data on whitespace and commas, separating glued commands
fn path_tokens(path: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    for chunk in path.split(|c: char| c.is_whitespace() || c == ',') {
        let mut rest = chunk;
        while !rest.is_empty() {
            let first = rest.chars().next().map_or(1, char::len_utf8);
            if rest.as_bytes()[0].is_ascii_uppercase() {
                tokens.push(&rest[..1]);
                rest = &rest[1..];
                continue;
            }
            let end = rest[first..]
                .find(|c: char| c.is_ascii_uppercase())
                .map_or(rest.len(), |i| i + first);
            tokens.push(&rest[..end]);
            rest = &rest[end..];
        }
    }
    tokens
}

fn single_command(token: &str) -> Option<char> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_uppercase() => Some(c),
        _ => None,
    }
}

/// Format a coordinate with at most three decimals
///
/// ```
/// use odtmark_core::shape::fmt_num;
/// assert_eq!(fmt_num(10800.0), "10800");
/// assert_eq!(fmt_num(1.0 / 3.0), "0.333");
/// assert_eq!(fmt_num(-0.0001), "0");
/// ```
pub fn fmt_num(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    if rounded.fract() == 0.0 {
        return format!("{}", rounded as i64);
    }
    let text = format!("{rounded:.3}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

// =========================================================================
// Formula parsing
// =========================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    /// `?name`
    Ref(String),
    /// `$N`
    Modifier(String),
    Ident(String),
    Op(char),
    LParen,
    RParen,
    Comma,
}

fn tokenize(input: &str) -> Result<Vec<Token>, EvalError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    let word = |start: usize| -> usize {
        let mut end = start;
        while end < chars.len() && (chars[end].is_alphanumeric() || chars[end] == '_') {
            end += 1;
        }
        end
    };

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value = text
                    .parse()
                    .map_err(|_| EvalError::Syntax(format!("bad number `{text}`")))?;
                tokens.push(Token::Number(value));
            }
            '?' | '$' => {
                let end = word(i + 1);
                if end == i + 1 {
                    return Err(EvalError::Syntax(format!("dangling `{c}` in `{input}`")));
                }
                let name: String = chars[i + 1..end].iter().collect();
                tokens.push(if c == '?' {
                    Token::Ref(name)
                } else {
                    Token::Modifier(name)
                });
                i = end;
            }
            c if c.is_alphabetic() => {
                let end = word(i);
                tokens.push(Token::Ident(chars[i..end].iter().collect()));
                i = end;
            }
            '+' | '-' | '*' | '/' => {
                tokens.push(Token::Op(c));
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            other => {
                return Err(EvalError::Syntax(format!("unexpected `{other}` in `{input}`")));
            }
        }
    }
    Ok(tokens)
}

struct Parser<'t, 'e> {
    tokens: &'t [Token],
    pos: usize,
    eval: &'e Evaluator,
}

impl Parser<'_, '_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: Token) -> Result<(), EvalError> {
        match self.next() {
            Some(token) if *token == expected => Ok(()),
            other => Err(EvalError::Syntax(format!("expected {expected:?}, found {other:?}"))),
        }
    }

    fn expr(&mut self) -> Result<f64, EvalError> {
        let mut value = self.term()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek() {
            let op = *op;
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, EvalError> {
        let mut value = self.unary()?;
        while let Some(Token::Op(op @ ('*' | '/'))) = self.peek() {
            let op = *op;
            self.pos += 1;
            let rhs = self.unary()?;
            value = if op == '*' {
                value * rhs
            } else if rhs == 0.0 {
                0.0
            } else {
                value / rhs
            };
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<f64, EvalError> {
        match self.peek() {
            Some(Token::Op('-')) => {
                self.pos += 1;
                Ok(-self.unary()?)
            }
            Some(Token::Op('+')) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<f64, EvalError> {
        match self.next().cloned() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::Ref(name)) => self.eval.reference(&name),
            Some(Token::Modifier(index)) => self.eval.modifier(&index),
            Some(Token::LParen) => {
                let value = self.expr()?;
                self.expect(Token::RParen)?;
                Ok(value)
            }
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    self.pos += 1;
                    let args = self.args()?;
                    call(&name, &args)
                } else {
                    self.eval
                        .constant(&name)
                        .map_or_else(|| self.eval.reference(&name), Ok)
                }
            }
            other => Err(EvalError::Syntax(format!("unexpected {other:?}"))),
        }
    }

    /// Arguments after an opening parenthesis, through the closing one
    fn args(&mut self) -> Result<Vec<f64>, EvalError> {
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.pos += 1;
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            match self.next() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => return Ok(args),
                other => {
                    return Err(EvalError::Syntax(format!("expected `,` or `)`, found {other:?}")))
                }
            }
        }
    }
}

fn call(name: &str, args: &[f64]) -> Result<f64, EvalError> {
    let arity = |n: usize| {
        if args.len() == n {
            Ok(())
        } else {
            Err(EvalError::Syntax(format!(
                "{name} takes {n} argument(s), got {}",
                args.len()
            )))
        }
    };
    match name {
        "abs" => arity(1).map(|_| args[0].abs()),
        "sqrt" => arity(1).map(|_| args[0].sqrt()),
        "sin" => arity(1).map(|_| args[0].sin()),
        "cos" => arity(1).map(|_| args[0].cos()),
        "tan" => arity(1).map(|_| args[0].tan()),
        "atan" => arity(1).map(|_| args[0].atan()),
        "atan2" => arity(2).map(|_| args[0].atan2(args[1])),
        "min" => arity(2).map(|_| args[0].min(args[1])),
        "max" => arity(2).map(|_| args[0].max(args[1])),
        "if" => arity(3).map(|_| if args[0] > 0.0 { args[1] } else { args[2] }),
        _ => Err(EvalError::Syntax(format!("unknown function `{name}`"))),
    }
}
