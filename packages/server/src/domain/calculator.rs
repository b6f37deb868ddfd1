//! Calculator rules: display editing and arithmetic evaluation.
//!
//! Expressions are evaluated by a small recursive-descent parser over the
//! token set `0-9 + - * / .`; nothing is ever compiled or executed.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! expression := term (('+' | '-') term)*
//! term       := power (('*' | '/') power)*
//! power      := operand ('**' operand)*      right-associative
//! operand    := ('+' | '-')* number          a signed operand cannot be a base of '**'
//! number     := digits ('.' digits?)? | '.' digits
//! ```
//!
//! `++` and `--` are rejected wherever they appear, as are `-2**2` and
//! `2**-3**2`, matching how browsers parse the same text. The parser never
//! recurses, so input length is bounded only by the transport.

use super::error::EvaluationError;

/// Shown when an expression cannot be evaluated.
pub const ERROR_DISPLAY: &str = "Error";

const ALLOWED: &[u8] = b"0123456789+-*/.";

fn is_allowed(c: char) -> bool {
    c.is_ascii() && ALLOWED.contains(&(c as u8))
}

/// Whether `token` is acceptable as digit/operator input.
pub fn is_valid_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(is_allowed)
}

/// Apply digit/operator input to the display.
///
/// A display of exactly `"0"` is replaced by anything except `"."`, so
/// `"0"` + `"5"` gives `"5"` and `"0"` + `"."` gives `"0."`.
pub fn append_token(display: &str, token: &str) -> String {
    if display == "0" && token != "." {
        token.to_string()
    } else {
        format!("{display}{token}")
    }
}

/// Drop every character outside `0-9 + - * / .`, keeping the order of the rest.
pub fn sanitize(expression: &str) -> String {
    expression.chars().filter(|c| is_allowed(*c)).collect()
}

/// Evaluate an already sanitized expression.
pub fn evaluate(expression: &str) -> Result<f64, EvaluationError> {
    if expression.is_empty() {
        return Err(EvaluationError::Empty);
    }
    if let Some(position) = expression
        .as_bytes()
        .windows(2)
        .position(|pair| pair == b"++" || pair == b"--")
    {
        return Err(EvaluationError::UnexpectedCharacter {
            found: char::from(expression.as_bytes()[position + 1]),
            position: position + 1,
        });
    }
    let mut parser = Parser::new(expression);
    let value = parser.expression()?;
    match parser.peek() {
        None => Ok(value),
        Some(found) => Err(parser.unexpected(found)),
    }
}

/// Sanitize, evaluate and format. Failures become [`ERROR_DISPLAY`].
pub fn compute(expression: &str) -> String {
    match evaluate(&sanitize(expression)) {
        Ok(value) => format_number(value),
        Err(e) => {
            tracing::debug!("Expression '{}' failed to evaluate: {}", expression, e);
            ERROR_DISPLAY.to_string()
        }
    }
}

/// Render a number the way browsers print it, since clients compare
/// and re-edit the display text.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return value.to_string();
    }
    let formatted = format!("{value:e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => formatted,
    }
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_pair(&self) -> Option<(u8, u8)> {
        Some((self.peek()?, *self.input.get(self.pos + 1)?))
    }

    fn unexpected(&self, found: u8) -> EvaluationError {
        EvaluationError::UnexpectedCharacter {
            found: found as char,
            position: self.pos,
        }
    }

    fn expression(&mut self) -> Result<f64, EvaluationError> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(b'+') => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some(b'-') => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<f64, EvaluationError> {
        let mut value = self.power()?;
        loop {
            match self.peek() {
                Some(b'*') if self.peek_pair() != Some((b'*', b'*')) => {
                    self.pos += 1;
                    value *= self.power()?;
                }
                Some(b'/') => {
                    self.pos += 1;
                    value /= self.power()?;
                }
                _ => return Ok(value),
            }
        }
    }

    /// A chain of `**`, folded from the right.
    fn power(&mut self) -> Result<f64, EvaluationError> {
        let mut operands = Vec::new();
        loop {
            let (value, signed) = self.operand()?;
            operands.push(value);
            if self.peek_pair() != Some((b'*', b'*')) {
                break;
            }
            if signed {
                return Err(self.unexpected(b'*'));
            }
            self.pos += 2;
        }

        let mut operands = operands.into_iter().rev();
        let mut value = operands.next().ok_or(EvaluationError::UnexpectedEnd)?;
        for base in operands {
            value = base.powf(value);
        }
        Ok(value)
    }

    /// A number with any leading signs. Also returns whether a sign was seen.
    fn operand(&mut self) -> Result<(f64, bool), EvaluationError> {
        let mut negative = false;
        let mut signed = false;
        while let Some(sign @ (b'+' | b'-')) = self.peek() {
            signed = true;
            negative ^= sign == b'-';
            self.pos += 1;
        }
        let value = self.number()?;
        Ok((if negative { -value } else { value }, signed))
    }

    fn number(&mut self) -> Result<f64, EvaluationError> {
        let start = self.pos;
        let mut digits = 0;
        let mut dots = 0;
        while let Some(c) = self.peek() {
            match c {
                b'0'..=b'9' => digits += 1,
                b'.' => dots += 1,
                _ => break,
            }
            self.pos += 1;
        }
        if self.pos == start {
            return match self.peek() {
                Some(found) => Err(self.unexpected(found)),
                None => Err(EvaluationError::UnexpectedEnd),
            };
        }
        // The slice only holds ASCII digits and dots.
        let literal = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();
        if digits == 0 || dots > 1 {
            return Err(EvaluationError::InvalidNumber(literal));
        }
        literal
            .parse::<f64>()
            .map_err(|_| EvaluationError::InvalidNumber(literal))
    }
}
