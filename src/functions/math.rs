use crate::error::EvaluationError;
use safecalc_macros::builtin;

#[builtin]
pub fn sqrt(x: f64) -> Result<f64, EvaluationError> {
    if x < 0.0 {
        return Err(EvaluationError::invalid_argument(
            "sqrt",
            "square root of a negative number",
        ));
    }
    Ok(x.sqrt())
}

/// Base-10 logarithm.
#[builtin]
pub fn log(x: f64) -> Result<f64, EvaluationError> {
    if x <= 0.0 {
        return Err(EvaluationError::invalid_argument(
            "log",
            "logarithm of a non-positive number",
        ));
    }
    Ok(x.log10())
}

/// Natural logarithm, or the logarithm in `base` when a second argument is given.
pub fn ln(args: &[f64]) -> Result<f64, EvaluationError> {
    let (x, base) = match args {
        &[x] => (x, None),
        &[x, base] => (x, Some(base)),
        _ => {
            return Err(EvaluationError::invalid_argument(
                "ln",
                format!("expected 1 or 2 arguments, got {}", args.len()),
            ))
        }
    };

    if x <= 0.0 {
        return Err(EvaluationError::invalid_argument(
            "ln",
            "logarithm of a non-positive number",
        ));
    }
    match base {
        None => Ok(x.ln()),
        Some(base) if base <= 0.0 || base == 1.0 => Err(EvaluationError::invalid_argument(
            "ln",
            "logarithm base must be positive and not 1",
        )),
        Some(base) => Ok(x.ln() / base.ln()),
    }
}

#[builtin]
pub fn pow(base: f64, exponent: f64) -> Result<f64, EvaluationError> {
    if base == 0.0 && exponent < 0.0 {
        return Err(EvaluationError::invalid_argument(
            "pow",
            "zero raised to a negative power",
        ));
    }
    let result = base.powf(exponent);
    if result.is_nan() {
        return Err(EvaluationError::invalid_argument(
            "pow",
            "negative base with a fractional exponent",
        ));
    }
    if result.is_infinite() {
        return Err(EvaluationError::invalid_argument("pow", "result overflows"));
    }
    Ok(result)
}
