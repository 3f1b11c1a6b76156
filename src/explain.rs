//! Step-by-step narration of an evaluation.
//!
//! The steps come from the evaluator's own trace, so an explanation always describes
//! exactly the computation `evaluate_expression` performs.

use crate::ast::{ASTNode, Evaluator, Operator, Step, UnaryOperator};
use crate::error::EvaluationError;

/// Explains `expression` as an ordered list of sentences ending in the result.
pub fn explain_expression(expression: &str) -> Result<Vec<String>, EvaluationError> {
    let evaluator = Evaluator::default();
    let ast = evaluator.parse_expression(expression)?;
    explain_ast(&evaluator, &ast)
}

pub fn explain_ast(evaluator: &Evaluator, ast: &ASTNode) -> Result<Vec<String>, EvaluationError> {
    let mut steps = Vec::new();
    let result = evaluator.evaluate_traced(ast, &mut steps)?;
    Ok(describe_steps(&steps, result))
}

/// Sentences for a recorded evaluation, closed by a `Result:` line.
pub fn describe_steps(steps: &[Step], result: f64) -> Vec<String> {
    let mut lines: Vec<String> = steps.iter().map(describe_step).collect();
    if lines.is_empty() {
        lines.push(format!("The expression is the number {}", result));
    }
    lines.push(format!("Result: {}", result));
    lines
}

pub fn describe_step(step: &Step) -> String {
    match step {
        Step::Constant { name, value } => format!("Look up {} = {}", name, value),
        Step::Unary {
            operator: UnaryOperator::Minus,
            operand,
            result,
        } => format!("Negate {} to get {}", operand, result),
        Step::Unary {
            operator: UnaryOperator::Plus,
            operand,
            ..
        } => format!("Keep the sign of {}", operand),
        Step::Binary {
            left,
            operator,
            right,
            result,
        } => match operator {
            Operator::Add => format!("Add {} and {} to get {}", left, right, result),
            Operator::Subtract => format!("Subtract {} from {} to get {}", right, left, result),
            Operator::Multiply => format!("Multiply {} by {} to get {}", left, right, result),
            Operator::Divide => format!("Divide {} by {} to get {}", left, right, result),
            Operator::Power => format!(
                "Raise {} to the power of {} to get {}",
                left, right, result
            ),
            Operator::Modulo => format!("Take {} modulo {} to get {}", left, right, result),
        },
        Step::Call { name, args, result } => {
            let args = args
                .iter()
                .map(|arg| arg.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            format!("Call {}({}) to get {}", name, args, result)
        }
    }
}
