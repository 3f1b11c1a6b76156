use thiserror::Error;

/// Coarse classification of an [`EvaluationError`], stable across message changes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    UnsupportedOperator,
    UnknownIdentifier,
    UnknownFunction,
    InvalidArgument,
    DivisionByZero,
    NonFiniteResult,
    ResourceLimit,
}

/// Why an expression was rejected. Evaluation stops at the first fault.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error("syntax error{}: {message}", at_position(.position))]
    Syntax {
        message: String,
        /// Byte offset into the input, when the parser can point at one.
        position: Option<usize>,
    },

    #[error("operator '{0}' is not allowed")]
    UnsupportedOperator(String),

    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("invalid argument to {function}: {reason}")]
    InvalidArgument { function: String, reason: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("{operation} does not produce a finite number")]
    NonFiniteResult { operation: String },

    #[error("{what} exceeds the limit of {limit}")]
    ResourceLimit { what: &'static str, limit: usize },
}

fn at_position(position: &Option<usize>) -> String {
    match position {
        Some(p) => format!(" at position {p}"),
        None => String::new(),
    }
}

impl EvaluationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvaluationError::Syntax { .. } => ErrorKind::Syntax,
            EvaluationError::UnsupportedOperator(_) => ErrorKind::UnsupportedOperator,
            EvaluationError::UnknownIdentifier(_) => ErrorKind::UnknownIdentifier,
            EvaluationError::UnknownFunction(_) => ErrorKind::UnknownFunction,
            EvaluationError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            EvaluationError::DivisionByZero => ErrorKind::DivisionByZero,
            EvaluationError::NonFiniteResult { .. } => ErrorKind::NonFiniteResult,
            EvaluationError::ResourceLimit { .. } => ErrorKind::ResourceLimit,
        }
    }

    pub(crate) fn syntax(message: impl Into<String>, position: Option<usize>) -> Self {
        EvaluationError::Syntax {
            message: message.into(),
            position,
        }
    }

    /// Used by `#[builtin]` wrappers when a call supplies the wrong number of arguments.
    pub fn arity(function: &str, expected: usize, got: usize) -> Self {
        EvaluationError::InvalidArgument {
            function: function.to_string(),
            reason: format!(
                "expected {} argument{}, got {}",
                expected,
                if expected == 1 { "" } else { "s" },
                got
            ),
        }
    }

    pub(crate) fn invalid_argument(function: &str, reason: impl Into<String>) -> Self {
        EvaluationError::InvalidArgument {
            function: function.to_string(),
            reason: reason.into(),
        }
    }
}
