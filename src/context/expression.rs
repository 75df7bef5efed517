//! Dynamic content resolution: `${variable}` references and
//! `prefix:function(args)` calls.
//!
//! Variables are replaced first, then function calls, so function arguments
//! may reference variables. Unquoted arguments may contain nested calls;
//! single-quoted arguments are taken literally.

use super::TestContext;
use crate::error::{ActionFailure, ActionResult};
use regex::Regex;
use std::sync::LazyLock;

static VARIABLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]*)\}").expect("variable pattern is valid"));

/// Replace every `${name}` with the variable's string form
pub fn replace_variables(raw: &str, context: &TestContext) -> ActionResult<String> {
    let mut result = String::with_capacity(raw.len());
    let mut last = 0;

    for captures in VARIABLE_PATTERN.captures_iter(raw) {
        let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        push_literal(&mut result, &raw[last..whole.start()], raw)?;

        let name = name.as_str().trim();
        if name.is_empty() {
            return Err(ActionFailure::usage(format!(
                "Empty variable expression in '{raw}'"
            )));
        }
        result.push_str(&context.get_variable(name)?);
        last = whole.end();
    }

    push_literal(&mut result, &raw[last..], raw)?;
    Ok(result)
}

/// Text between matches may not open another `${`
fn push_literal(result: &mut String, literal: &str, raw: &str) -> ActionResult<()> {
    if literal.contains("${") {
        return Err(ActionFailure::usage(format!(
            "Unterminated variable expression in '{raw}'"
        )));
    }
    result.push_str(literal);
    Ok(())
}

/// Evaluate `prefix:name(args)` calls whose prefix is a registered library
pub fn replace_functions(raw: &str, context: &TestContext) -> ActionResult<String> {
    let mut result = String::with_capacity(raw.len());
    let mut pos = 0;

    while pos < raw.len() {
        let rest = &raw[pos..];
        let at_boundary = raw[..pos]
            .chars()
            .next_back()
            .map_or(true, |c| !is_identifier_char(c));

        if at_boundary {
            if let Some((prefix, name, header_len)) = parse_call_header(rest) {
                if context.has_library(prefix) {
                    let body = &rest[header_len..];
                    let close = find_closing_paren(body).ok_or_else(|| {
                        ActionFailure::usage(format!(
                            "Missing closing parenthesis for function '{prefix}:{name}' in '{raw}'"
                        ))
                    })?;
                    let value = invoke(prefix, name, &body[..close], context)?;
                    result.push_str(&value);
                    pos += header_len + close + 1;
                    continue;
                }
            }
        }

        let Some(ch) = rest.chars().next() else {
            break;
        };
        result.push(ch);
        pos += ch.len_utf8();
    }

    Ok(result)
}

fn invoke(prefix: &str, name: &str, raw_args: &str, context: &TestContext) -> ActionResult<String> {
    let function = context.lookup_function(prefix, name).ok_or_else(|| {
        ActionFailure::execution(format!("Unknown function '{prefix}:{name}'"))
    })?;

    let args = split_arguments(raw_args)
        .into_iter()
        .map(|arg| match unquote(arg) {
            Some(literal) => Ok(literal.to_string()),
            None => replace_functions(arg, context),
        })
        .collect::<ActionResult<Vec<String>>>()?;

    function.execute(&args, context)
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn take_identifier(s: &str) -> Option<&str> {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return None,
    }
    let end = chars
        .find(|(_, c)| !is_identifier_char(*c))
        .map_or(s.len(), |(idx, _)| idx);
    Some(&s[..end])
}

/// Parse `prefix:name(` returning both identifiers and the header length
fn parse_call_header(s: &str) -> Option<(&str, &str, usize)> {
    let prefix = take_identifier(s)?;
    let after_prefix = s[prefix.len()..].strip_prefix(':')?;
    let name = take_identifier(after_prefix)?;
    after_prefix[name.len()..].strip_prefix('(')?;
    Some((prefix, name, prefix.len() + 1 + name.len() + 1))
}

fn find_closing_paren(body: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut in_quote = false;
    for (idx, c) in body.char_indices() {
        match c {
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn split_arguments(raw: &str) -> Vec<&str> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut start = 0;
    for (idx, c) in raw.char_indices() {
        match c {
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => depth = depth.saturating_sub(1),
            ',' if !in_quote && depth == 0 => {
                args.push(raw[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    args.push(raw[start..].trim());
    args
}

fn unquote(arg: &str) -> Option<&str> {
    if arg.len() >= 2 && arg.starts_with('\'') && arg.ends_with('\'') {
        Some(&arg[1..arg.len() - 1])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    #[test]
    fn test_variable_replacement() {
        let context = TestContext::new();
        context.set_variable("host", "localhost");
        context.set_variable("port", 8080);

        let resolved = replace_variables("http://${host}:${ port }/api", &context).unwrap();
        assert_eq!(resolved, "http://localhost:8080/api");
    }

    #[test]
    fn test_unterminated_variable_is_usage_fault() {
        let context = TestContext::new();
        context.set_variable("ok", 1);
        let failure = replace_variables("value ${broken", &context).unwrap_err();
        assert_eq!(failure.kind, FailureKind::UsageFault);
        let failure = replace_variables("${ok} then ${broken", &context).unwrap_err();
        assert_eq!(failure.kind, FailureKind::UsageFault);
    }

    #[test]
    fn test_empty_and_unknown_variables_fail() {
        let context = TestContext::new();
        assert!(replace_variables("${ }", &context).unwrap_err().is_usage_fault());
        let failure = replace_variables("hello ${nobody}", &context).unwrap_err();
        assert_eq!(failure.kind, FailureKind::ExecutionFailure);
        assert!(failure.message.contains("nobody"));
    }

    #[test]
    fn test_text_without_variables_is_unchanged() {
        let context = TestContext::new();
        assert_eq!(
            replace_variables("cost: $5 {net}", &context).unwrap(),
            "cost: $5 {net}"
        );
    }

    #[test]
    fn test_nested_function_calls() {
        let context = TestContext::new();
        let resolved = context
            .resolve_dynamic_value("id-core:upperCase(core:concat('a', 'b, c'))")
            .unwrap();
        assert_eq!(resolved, "id-AB, C");
    }

    #[test]
    fn test_unknown_prefix_left_untouched() {
        let context = TestContext::new();
        let resolved = replace_functions("see mailto:someone(at)example", &context).unwrap();
        assert_eq!(resolved, "see mailto:someone(at)example");
    }

    #[test]
    fn test_unknown_function_in_known_library_fails() {
        let context = TestContext::new();
        let failure = replace_functions("core:doesNotExist()", &context).unwrap_err();
        assert_eq!(failure.kind, FailureKind::ExecutionFailure);
        assert!(failure.message.contains("core:doesNotExist"));
    }

    #[test]
    fn test_split_arguments_respects_quotes_and_nesting() {
        assert_eq!(
            split_arguments("'a,b', core:concat('x','y'), z"),
            vec!["'a,b'", "core:concat('x','y')", "z"]
        );
        assert!(split_arguments("  ").is_empty());
    }
}
