//! Function libraries callable from dynamic expressions as `prefix:name(args)`.

use super::TestContext;
use crate::error::{ActionFailure, ActionResult};
use chrono::format::{Item, StrftimeItems};
use chrono::Local;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// A function usable inside dynamic expressions
pub trait ExpressionFunction: Send + Sync {
    /// Evaluate with already-resolved, unquoted arguments
    fn execute(&self, args: &[String], context: &TestContext) -> ActionResult<String>;
}

impl<F> ExpressionFunction for F
where
    F: Fn(&[String], &TestContext) -> ActionResult<String> + Send + Sync,
{
    fn execute(&self, args: &[String], context: &TestContext) -> ActionResult<String> {
        self(args, context)
    }
}

/// Named set of functions sharing a prefix
#[derive(Clone)]
pub struct FunctionLibrary {
    prefix: String,
    functions: HashMap<String, Arc<dyn ExpressionFunction>>,
}

impl FunctionLibrary {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            functions: HashMap::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn register(&mut self, name: impl Into<String>, function: Arc<dyn ExpressionFunction>) {
        self.functions.insert(name.into(), function);
    }

    pub fn with_function(
        mut self,
        name: impl Into<String>,
        function: Arc<dyn ExpressionFunction>,
    ) -> Self {
        self.register(name, function);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ExpressionFunction>> {
        self.functions.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    /// Built-in `core:` library
    pub fn core() -> Self {
        Self::new("core")
            .with_function("concat", Arc::new(concat))
            .with_function("upperCase", Arc::new(upper_case))
            .with_function("lowerCase", Arc::new(lower_case))
            .with_function("substring", Arc::new(substring))
            .with_function("stringLength", Arc::new(string_length))
            .with_function("randomUUID", Arc::new(random_uuid))
            .with_function("currentDate", Arc::new(current_date))
    }
}

impl fmt::Debug for FunctionLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionLibrary")
            .field("prefix", &self.prefix)
            .field("functions", &self.names())
            .finish()
    }
}

fn expect_args(function: &str, args: &[String], min: usize, max: usize) -> ActionResult<()> {
    if args.len() < min || args.len() > max {
        return Err(ActionFailure::execution(format!(
            "Function '{function}' expects {min}..={max} arguments, got {}",
            args.len()
        )));
    }
    Ok(())
}

fn concat(args: &[String], _: &TestContext) -> ActionResult<String> {
    Ok(args.concat())
}

fn upper_case(args: &[String], _: &TestContext) -> ActionResult<String> {
    expect_args("upperCase", args, 1, 1)?;
    Ok(args[0].to_uppercase())
}

fn lower_case(args: &[String], _: &TestContext) -> ActionResult<String> {
    expect_args("lowerCase", args, 1, 1)?;
    Ok(args[0].to_lowercase())
}

fn substring(args: &[String], _: &TestContext) -> ActionResult<String> {
    expect_args("substring", args, 2, 3)?;
    let chars: Vec<char> = args[0].chars().collect();
    let parse = |raw: &str| {
        raw.trim().parse::<usize>().map_err(|_| {
            ActionFailure::execution(format!("Invalid substring index '{raw}'"))
        })
    };
    let begin = parse(args[1].as_str())?;
    let end = match args.get(2) {
        Some(raw) => parse(raw.as_str())?,
        None => chars.len(),
    };
    if begin > end || end > chars.len() {
        return Err(ActionFailure::execution(format!(
            "Substring range {begin}..{end} out of bounds for length {}",
            chars.len()
        )));
    }
    Ok(chars[begin..end].iter().collect())
}

fn string_length(args: &[String], _: &TestContext) -> ActionResult<String> {
    expect_args("stringLength", args, 1, 1)?;
    Ok(args[0].chars().count().to_string())
}

fn random_uuid(args: &[String], _: &TestContext) -> ActionResult<String> {
    expect_args("randomUUID", args, 0, 0)?;
    Ok(Uuid::new_v4().to_string())
}

fn current_date(args: &[String], _: &TestContext) -> ActionResult<String> {
    expect_args("currentDate", args, 0, 1)?;
    let format = args.first().map(String::as_str).unwrap_or("%d.%m.%Y");
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(ActionFailure::execution(format!(
            "Invalid date format '{format}'"
        )));
    }
    Ok(Local::now().format_with_items(items.into_iter()).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: &[&str]) -> ActionResult<String> {
        let library = FunctionLibrary::core();
        let function = library.get(name).unwrap();
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        function.execute(&args, &TestContext::new())
    }

    #[test]
    fn test_core_functions() {
        assert_eq!(call("concat", &["a", "b", "c"]).unwrap(), "abc");
        assert_eq!(call("upperCase", &["abc"]).unwrap(), "ABC");
        assert_eq!(call("lowerCase", &["ABC"]).unwrap(), "abc");
        assert_eq!(call("substring", &["testflow", "4"]).unwrap(), "flow");
        assert_eq!(call("substring", &["testflow", "0", "4"]).unwrap(), "test");
        assert_eq!(call("stringLength", &["four"]).unwrap(), "4");
        assert_eq!(call("randomUUID", &[]).unwrap().len(), 36);
        assert_eq!(call("currentDate", &["%Y"]).unwrap().len(), 4);
    }

    #[test]
    fn test_argument_errors() {
        assert!(call("upperCase", &[]).is_err());
        assert!(call("substring", &["abc", "5"]).is_err());
        assert!(call("currentDate", &["%Q"]).is_err());
    }

    #[test]
    fn test_closure_functions() {
        let library = FunctionLibrary::new("custom").with_function(
            "reverse",
            Arc::new(|args: &[String], _: &TestContext| -> ActionResult<String> {
                Ok(args[0].chars().rev().collect())
            }),
        );
        let reverse = library.get("reverse").unwrap();
        assert_eq!(
            reverse.execute(&["abc".to_string()], &TestContext::new()).unwrap(),
            "cba"
        );
        assert_eq!(library.names(), vec!["reverse"]);
    }
}
