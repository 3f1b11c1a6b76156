pub mod math;
pub mod operators;

use crate::error::EvaluationError;

/// Entry point of a whitelisted function; arity is checked by the function itself.
pub type Builtin = fn(&[f64]) -> Result<f64, EvaluationError>;

#[derive(Debug, Clone, Copy)]
pub enum Binding {
    Constant(f64),
    Function(Builtin),
}

/// Every name an expression may refer to.
pub static NAMES: &[(&str, Binding)] = &[
    ("pi", Binding::Constant(std::f64::consts::PI)),
    ("e", Binding::Constant(std::f64::consts::E)),
    ("sqrt", Binding::Function(math::sqrt)),
    ("log", Binding::Function(math::log)),
    ("ln", Binding::Function(math::ln)),
    ("pow", Binding::Function(math::pow)),
];

pub fn lookup(name: &str) -> Option<Binding> {
    NAMES
        .iter()
        .find(|(allowed, _)| *allowed == name)
        .map(|(_, binding)| *binding)
}

/// Resolves a bare identifier. Function names are not values.
pub fn constant(name: &str) -> Result<f64, EvaluationError> {
    match lookup(name) {
        Some(Binding::Constant(value)) => Ok(value),
        _ => Err(EvaluationError::UnknownIdentifier(name.to_string())),
    }
}

/// Resolves the target of a call. Constants are not callable.
pub fn function(name: &str) -> Result<Builtin, EvaluationError> {
    match lookup(name) {
        Some(Binding::Function(function)) => Ok(function),
        _ => Err(EvaluationError::UnknownFunction(name.to_string())),
    }
}

pub fn constant_names() -> impl Iterator<Item = &'static str> {
    NAMES.iter().filter_map(|(name, binding)| match binding {
        Binding::Constant(_) => Some(*name),
        Binding::Function(_) => None,
    })
}

pub fn function_names() -> impl Iterator<Item = &'static str> {
    NAMES.iter().filter_map(|(name, binding)| match binding {
        Binding::Function(_) => Some(*name),
        Binding::Constant(_) => None,
    })
}
