mod evaluator;
mod parser;
mod trace;

pub use evaluator::Evaluator;
pub use parser::ExpressionParser as Parser;
pub use trace::{Step, Trace};

use crate::error::EvaluationError;
use crate::functions::operators;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ASTNode {
    Number(f64),
    Identifier(String),
    UnaryOperation {
        operator: UnaryOperator,
        operand: Box<ASTNode>,
    },
    BinaryOperation {
        left: Box<ASTNode>,
        operator: Operator,
        right: Box<ASTNode>,
    },
    FunctionCall {
        name: String,
        args: Vec<ASTNode>,
    },
}

impl ASTNode {
    /// Nesting depth of the tree; a lone literal has depth 1. A run of binary operations
    /// along left operands counts as a single level, so `1 + 2 + 3` is as deep as `1 + 2`.
    pub fn depth(&self) -> usize {
        let mut deepest = 0usize;
        let mut pending: Vec<(&ASTNode, usize)> = vec![(self, 1)];

        while let Some((node, level)) = pending.pop() {
            deepest = deepest.max(level);
            match node {
                ASTNode::Number(_) | ASTNode::Identifier(_) => {}
                ASTNode::UnaryOperation { operand, .. } => {
                    pending.push((operand.as_ref(), level + 1))
                }
                ASTNode::BinaryOperation { left, right, .. } => {
                    pending.push((left.as_ref(), level));
                    pending.push((right.as_ref(), level + 1));
                }
                ASTNode::FunctionCall { args, .. } => {
                    pending.extend(args.iter().map(|arg| (arg, level + 1)))
                }
            }
        }

        deepest
    }
}

/// Renders the tree back to fully parenthesised source text.
impl fmt::Display for ASTNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ASTNode::Number(value) => write!(f, "{}", value),
            ASTNode::Identifier(name) => write!(f, "{}", name),
            ASTNode::UnaryOperation { operator, operand } => write!(f, "({}{})", operator, operand),
            ASTNode::BinaryOperation {
                left,
                operator,
                right,
            } => write!(f, "({} {} {})", left, operator, right),
            ASTNode::FunctionCall { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Modulo,
}

impl Operator {
    /// Applies the operator through the operator whitelist.
    pub fn apply(&self, left: f64, right: f64) -> Result<f64, EvaluationError> {
        let function = operators::binary_operator(*self)
            .ok_or_else(|| EvaluationError::UnsupportedOperator(self.to_string()))?;
        function(left, right)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Power => "^",
            Operator::Modulo => "%",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl TryFrom<&str> for Operator {
    type Error = EvaluationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "+" => Ok(Operator::Add),
            "-" => Ok(Operator::Subtract),
            "*" => Ok(Operator::Multiply),
            "/" => Ok(Operator::Divide),
            "^" | "**" => Ok(Operator::Power),
            "%" => Ok(Operator::Modulo),
            _ => Err(EvaluationError::UnsupportedOperator(value.to_string())),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Plus,
    Minus,
}

impl UnaryOperator {
    pub fn apply(&self, operand: f64) -> Result<f64, EvaluationError> {
        let function = operators::unary_operator(*self)
            .ok_or_else(|| EvaluationError::UnsupportedOperator(self.to_string()))?;
        function(operand)
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOperator::Plus => f.write_str("+"),
            UnaryOperator::Minus => f.write_str("-"),
        }
    }
}

impl TryFrom<&str> for UnaryOperator {
    type Error = EvaluationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "+" => Ok(UnaryOperator::Plus),
            "-" => Ok(UnaryOperator::Minus),
            _ => Err(EvaluationError::UnsupportedOperator(value.to_string())),
        }
    }
}
