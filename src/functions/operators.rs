use crate::ast::{Operator, UnaryOperator};
use crate::error::EvaluationError;

pub type BinaryFunction = fn(f64, f64) -> Result<f64, EvaluationError>;
pub type UnaryFunction = fn(f64) -> Result<f64, EvaluationError>;

/// Every binary operator an expression may use.
pub static BINARY_OPERATORS: &[(Operator, BinaryFunction)] = &[
    (Operator::Add, add),
    (Operator::Subtract, subtract),
    (Operator::Multiply, multiply),
    (Operator::Divide, divide),
    (Operator::Power, power),
    (Operator::Modulo, modulo),
];

/// Every prefix operator an expression may use.
pub static UNARY_OPERATORS: &[(UnaryOperator, UnaryFunction)] = &[
    (UnaryOperator::Plus, identity),
    (UnaryOperator::Minus, negate),
];

pub fn binary_operator(operator: Operator) -> Option<BinaryFunction> {
    BINARY_OPERATORS
        .iter()
        .find(|(allowed, _)| *allowed == operator)
        .map(|(_, function)| *function)
}

pub fn unary_operator(operator: UnaryOperator) -> Option<UnaryFunction> {
    UNARY_OPERATORS
        .iter()
        .find(|(allowed, _)| *allowed == operator)
        .map(|(_, function)| *function)
}

fn finite(operation: &str, value: f64) -> Result<f64, EvaluationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvaluationError::NonFiniteResult {
            operation: operation.to_string(),
        })
    }
}

fn add(left: f64, right: f64) -> Result<f64, EvaluationError> {
    finite("addition", left + right)
}

fn subtract(left: f64, right: f64) -> Result<f64, EvaluationError> {
    finite("subtraction", left - right)
}

fn multiply(left: f64, right: f64) -> Result<f64, EvaluationError> {
    finite("multiplication", left * right)
}

fn divide(left: f64, right: f64) -> Result<f64, EvaluationError> {
    if right == 0.0 {
        return Err(EvaluationError::DivisionByZero);
    }
    finite("division", left / right)
}

/// Floored modulo: a non-zero result carries the sign of the divisor.
fn modulo(left: f64, right: f64) -> Result<f64, EvaluationError> {
    if right == 0.0 {
        return Err(EvaluationError::DivisionByZero);
    }
    let remainder = left % right;
    if remainder != 0.0 && (remainder < 0.0) != (right < 0.0) {
        finite("modulo", remainder + right)
    } else {
        finite("modulo", remainder)
    }
}

fn power(base: f64, exponent: f64) -> Result<f64, EvaluationError> {
    if base == 0.0 && exponent < 0.0 {
        return Err(EvaluationError::DivisionByZero);
    }
    finite("exponentiation", base.powf(exponent))
}

fn identity(operand: f64) -> Result<f64, EvaluationError> {
    Ok(operand)
}

fn negate(operand: f64) -> Result<f64, EvaluationError> {
    Ok(-operand)
}
