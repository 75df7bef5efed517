//! Conditions evaluated by iterating and conditional containers.

use crate::context::{boolean_expression, TestContext};
use crate::error::ActionResult;
use std::fmt;
use std::sync::Arc;

pub type ConditionFn = Arc<dyn Fn(i64, &TestContext) -> bool + Send + Sync>;

/// Termination or guard condition of a container
#[derive(Clone)]
pub enum Condition {
    /// Boolean expression, resolved against the context on every evaluation.
    /// `${index}` references and bare occurrences of the container's index
    /// name are replaced by the current index value.
    Expression(String),
    /// Closure receiving the current index and the context
    Predicate(ConditionFn),
}

impl Condition {
    pub fn expression(expression: impl Into<String>) -> Self {
        Self::Expression(expression.into())
    }

    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(i64, &TestContext) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(predicate))
    }

    /// Evaluate for the given index; `index_name` is `None` outside iterations
    pub fn evaluate(
        &self,
        index_name: Option<&str>,
        index: i64,
        context: &TestContext,
    ) -> ActionResult<bool> {
        match self {
            Self::Expression(expression) => {
                let substituted = match index_name {
                    Some(name) => {
                        let index = index.to_string();
                        let expression = expression.replace(&format!("${{{name}}}"), &index);
                        let resolved = context.resolve_dynamic_value(&expression)?;
                        replace_identifier(&resolved, name, &index)
                    }
                    None => context.resolve_dynamic_value(expression)?,
                };
                boolean_expression::evaluate(&substituted)
            }
            Self::Predicate(predicate) => Ok(predicate(index, context)),
        }
    }
}

impl From<&str> for Condition {
    fn from(expression: &str) -> Self {
        Self::expression(expression)
    }
}

impl From<String> for Condition {
    fn from(expression: String) -> Self {
        Self::Expression(expression)
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expression(expression) => f.debug_tuple("Expression").field(expression).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Replace whole-word occurrences of `name` outside quotes
fn replace_identifier(source: &str, name: &str, value: &str) -> String {
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let mut result = String::with_capacity(source.len());
    let mut word = String::new();
    let mut in_quote = false;

    let mut flush = |word: &mut String, result: &mut String| {
        if word == name {
            result.push_str(value);
        } else {
            result.push_str(word);
        }
        word.clear();
    };

    for c in source.chars() {
        if c == '\'' {
            flush(&mut word, &mut result);
            in_quote = !in_quote;
            result.push(c);
        } else if !in_quote && is_word(c) {
            word.push(c);
        } else {
            flush(&mut word, &mut result);
            result.push(c);
        }
    }
    flush(&mut word, &mut result);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_identifier_whole_words_only() {
        assert_eq!(replace_identifier("i lt 5", "i", "3"), "3 lt 5");
        assert_eq!(replace_identifier("index lt i", "i", "3"), "index lt 3");
        assert_eq!(replace_identifier("'i' = i", "i", "3"), "'i' = 3");
    }

    #[test]
    fn test_expression_uses_index_and_variables() {
        let context = TestContext::new();
        context.set_variable("limit", 5);
        let condition = Condition::from("index lt ${limit}");

        assert!(condition.evaluate(Some("index"), 4, &context).unwrap());
        assert!(!condition.evaluate(Some("index"), 5, &context).unwrap());
    }

    #[test]
    fn test_index_reference_uses_current_index_not_variable() {
        let context = TestContext::new();
        let condition = Condition::from("${i} gt 3");

        assert!(!condition.evaluate(Some("i"), 3, &context).unwrap());
        assert!(condition.evaluate(Some("i"), 4, &context).unwrap());

        context.set_variable("i", 10);
        assert!(!condition.evaluate(Some("i"), 2, &context).unwrap());
    }

    #[test]
    fn test_predicate_condition() {
        let context = TestContext::new();
        let condition = Condition::predicate(|index, _| index % 2 == 0);
        assert!(condition.evaluate(None, 2, &context).unwrap());
        assert!(!condition.evaluate(None, 3, &context).unwrap());
    }
}
