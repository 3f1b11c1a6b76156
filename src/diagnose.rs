//! Turns a rejected expression into a hint for a person.
//!
//! Hints come from the typed error plus a lexical look at the text; nothing here parses
//! or evaluates the input again.

use crate::error::EvaluationError;
use crate::functions;

/// Returns a single human-readable hint explaining why `expression` was rejected.
pub fn diagnose_error(expression: &str, error: &EvaluationError) -> String {
    match error {
        EvaluationError::Syntax { message, position } => diagnose_syntax(expression, message, *position),
        EvaluationError::UnsupportedOperator(operator) => format!(
            "The operator '{}' is not allowed. Use only + - * / % and ^ (or **).",
            operator
        ),
        EvaluationError::UnknownIdentifier(name) => {
            if functions::function(name).is_ok() {
                format!("'{}' is a function; call it with arguments, for example {}(4).", name, name)
            } else {
                unknown_name_hint(name, "name", functions::constant_names())
            }
        }
        EvaluationError::UnknownFunction(name) => {
            if functions::constant(name).is_ok() {
                format!("'{}' is a constant, not a function; write it without parentheses.", name)
            } else {
                unknown_name_hint(name, "function", functions::function_names())
            }
        }
        EvaluationError::InvalidArgument { function, reason } => {
            format!("Check the arguments to {}: {}.", function, reason)
        }
        EvaluationError::DivisionByZero => {
            "Division or modulo by zero is undefined; check the divisor.".to_string()
        }
        EvaluationError::NonFiniteResult { operation } => format!(
            "The {} does not give a finite real number; the result is too large or undefined.",
            operation
        ),
        EvaluationError::ResourceLimit { what, limit } => format!(
            "The expression is too complex: its {} exceeds {}. Try splitting it up.",
            what, limit
        ),
    }
}

fn diagnose_syntax(expression: &str, message: &str, position: Option<usize>) -> String {
    if expression.trim().is_empty() {
        return "The expression is empty; enter something like 2 * (3 + 5).".to_string();
    }

    let opened = expression.chars().filter(|&c| c == '(').count();
    let closed = expression.chars().filter(|&c| c == ')').count();
    if opened > closed {
        return format!(
            "Unbalanced parentheses: {} '(' without a matching ')'.",
            opened - closed
        );
    }
    if closed > opened {
        return format!(
            "Unbalanced parentheses: {} ')' without a matching '('.",
            closed - opened
        );
    }

    if expression.contains(['\'', '"']) {
        return "Text in quotes is not allowed; only numbers, operators and functions are."
            .to_string();
    }
    if expression.contains(';') {
        return "Enter a single expression; ';' is not allowed.".to_string();
    }
    if expression.contains(['=', '<', '>', '!', '&', '|']) {
        return "Assignments, comparisons and logic are not supported; only arithmetic is."
            .to_string();
    }

    match position {
        Some(position) => format!(
            "The expression is not valid near position {} ({}).",
            position + 1,
            message
        ),
        None => format!("The expression is not valid ({}).", message),
    }
}

fn unknown_name_hint<'a>(
    name: &str,
    role: &str,
    known: impl Iterator<Item = &'a str>,
) -> String {
    let known: Vec<&str> = known.collect();
    let suggestion = known
        .iter()
        .map(|candidate| (edit_distance(name, candidate), *candidate))
        .filter(|(distance, _)| *distance <= 2)
        .min_by_key(|(distance, _)| *distance);

    match suggestion {
        Some((_, candidate)) => format!("Unknown {} '{}'. Did you mean '{}'?", role, name, candidate),
        None => format!(
            "Unknown {} '{}'. Available: {}.",
            role,
            name,
            known.join(", ")
        ),
    }
}

/// Levenshtein distance over chars.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut current = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        previous = current;
    }

    previous[b.len()]
}
