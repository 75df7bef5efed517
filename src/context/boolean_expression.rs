//! Boolean expression evaluation for container conditions.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expression := conjunction ("or" conjunction)*
//! conjunction := comparison ("and" comparison)*
//! comparison := "(" expression ")" | operand (operator operand)?
//! operator   := lt | lt= | gt | gt= | = | != | < | <= | > | >= | ==
//! ```
//!
//! `&&` and `||` are accepted for `and` and `or`. Operands compare
//! numerically when both sides parse as numbers, otherwise as strings. A
//! lone operand must be `true` or `false`.

use crate::error::{ActionFailure, ActionResult};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Open,
    Close,
    And,
    Or,
    Compare(Operator),
    Operand(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Operator {
    Lt,
    LtEq,
    Gt,
    GtEq,
    Eq,
    NotEq,
}

/// Evaluate an already-resolved boolean expression
pub fn evaluate(expression: &str) -> ActionResult<bool> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(malformed(expression, "empty expression"));
    }

    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        source: expression,
    };
    let value = parser.disjunction()?;
    if parser.pos != tokens.len() {
        return Err(malformed(expression, "unexpected trailing tokens"));
    }
    Ok(value)
}

fn malformed(expression: &str, reason: &str) -> ActionFailure {
    ActionFailure::usage(format!("Invalid boolean expression '{expression}': {reason}"))
}

fn tokenize(expression: &str) -> ActionResult<Vec<Token>> {
    let chars: Vec<char> = expression.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::Open);
                i += 1;
            }
            ')' => {
                tokens.push(Token::Close);
                i += 1;
            }
            '<' | '>' => {
                let or_equal = next == Some('=');
                let op = match (c, or_equal) {
                    ('<', false) => Operator::Lt,
                    ('<', true) => Operator::LtEq,
                    ('>', false) => Operator::Gt,
                    _ => Operator::GtEq,
                };
                tokens.push(Token::Compare(op));
                i += if or_equal { 2 } else { 1 };
            }
            '=' => {
                tokens.push(Token::Compare(Operator::Eq));
                i += if next == Some('=') { 2 } else { 1 };
            }
            '!' if next == Some('=') => {
                tokens.push(Token::Compare(Operator::NotEq));
                i += 2;
            }
            '&' if next == Some('&') => {
                tokens.push(Token::And);
                i += 2;
            }
            '|' if next == Some('|') => {
                tokens.push(Token::Or);
                i += 2;
            }
            '\'' => {
                let start = i + 1;
                let end = chars[start..]
                    .iter()
                    .position(|&c| c == '\'')
                    .map(|offset| start + offset)
                    .ok_or_else(|| malformed(expression, "unterminated quote"))?;
                tokens.push(Token::Operand(chars[start..end].iter().collect()));
                i = end + 1;
            }
            _ => {
                let start = i;
                while i < chars.len() && !is_delimiter(chars[i]) {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                let or_equal = chars.get(i) == Some(&'=');
                let token = match word.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "lt" if or_equal => {
                        i += 1;
                        Token::Compare(Operator::LtEq)
                    }
                    "gt" if or_equal => {
                        i += 1;
                        Token::Compare(Operator::GtEq)
                    }
                    "lt" => Token::Compare(Operator::Lt),
                    "gt" => Token::Compare(Operator::Gt),
                    _ => Token::Operand(word),
                };
                tokens.push(token);
            }
        }
    }

    Ok(tokens)
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '<' | '>' | '=' | '!' | '&' | '|' | '\'')
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    source: &'a str,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn disjunction(&mut self) -> ActionResult<bool> {
        let mut value = self.conjunction()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            let rhs = self.conjunction()?;
            value = value || rhs;
        }
        Ok(value)
    }

    fn conjunction(&mut self) -> ActionResult<bool> {
        let mut value = self.comparison()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            let rhs = self.comparison()?;
            value = value && rhs;
        }
        Ok(value)
    }

    fn comparison(&mut self) -> ActionResult<bool> {
        match self.peek().cloned() {
            Some(Token::Open) => {
                self.pos += 1;
                let value = self.disjunction()?;
                if self.peek() != Some(&Token::Close) {
                    return Err(malformed(self.source, "missing closing parenthesis"));
                }
                self.pos += 1;
                Ok(value)
            }
            Some(Token::Operand(lhs)) => {
                self.pos += 1;
                match self.peek().cloned() {
                    Some(Token::Compare(op)) => {
                        self.pos += 1;
                        match self.peek().cloned() {
                            Some(Token::Operand(rhs)) => {
                                self.pos += 1;
                                compare(&lhs, op, &rhs, self.source)
                            }
                            _ => Err(malformed(self.source, "missing right-hand operand")),
                        }
                    }
                    _ => parse_bool(&lhs)
                        .ok_or_else(|| malformed(self.source, &format!("'{lhs}' is not a boolean"))),
                }
            }
            _ => Err(malformed(self.source, "expected operand or '('")),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn compare(lhs: &str, op: Operator, rhs: &str, source: &str) -> ActionResult<bool> {
    if let (Ok(l), Ok(r)) = (lhs.parse::<f64>(), rhs.parse::<f64>()) {
        return Ok(match op {
            Operator::Lt => l < r,
            Operator::LtEq => l <= r,
            Operator::Gt => l > r,
            Operator::GtEq => l >= r,
            Operator::Eq => l == r,
            Operator::NotEq => l != r,
        });
    }

    match op {
        Operator::Eq => Ok(lhs == rhs),
        Operator::NotEq => Ok(lhs != rhs),
        _ => Err(malformed(
            source,
            &format!("cannot order non-numeric operands '{lhs}' and '{rhs}'"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    #[test]
    fn test_word_operators() {
        assert!(evaluate("1 lt 5").unwrap());
        assert!(evaluate("5 lt= 5").unwrap());
        assert!(!evaluate("4 gt 5").unwrap());
        assert!(evaluate("5 gt= 5").unwrap());
        assert!(evaluate("5 = 5.0").unwrap());
        assert!(evaluate("abc != abd").unwrap());
    }

    #[test]
    fn test_symbol_operators_without_spaces() {
        assert!(evaluate("3<5").unwrap());
        assert!(evaluate("5<=5").unwrap());
        assert!(evaluate("6>=5 && 1==1").unwrap());
        assert!(evaluate("1>2 || 2>1").unwrap());
    }

    #[test]
    fn test_logical_precedence_and_grouping() {
        assert!(evaluate("true or false and false").unwrap());
        assert!(!evaluate("(true or false) and false").unwrap());
        assert!(evaluate("(1 lt 2) and ('a b' = 'a b')").unwrap());
    }

    #[test]
    fn test_boolean_literals() {
        assert!(evaluate("TRUE").unwrap());
        assert!(!evaluate("false").unwrap());
    }

    #[test]
    fn test_malformed_expressions_are_usage_faults() {
        for expression in ["", "5 lt", "(1 lt 2", "abc lt abd", "hello", "1 lt 2 3"] {
            let failure = evaluate(expression).unwrap_err();
            assert_eq!(failure.kind, FailureKind::UsageFault, "{expression}");
        }
    }
}
