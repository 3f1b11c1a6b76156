use crate::ast::{Operator, UnaryOperator};

/// One completed computation, reported in evaluation (post-order) order.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Constant {
        name: String,
        value: f64,
    },
    Unary {
        operator: UnaryOperator,
        operand: f64,
        result: f64,
    },
    Binary {
        left: f64,
        operator: Operator,
        right: f64,
        result: f64,
    },
    Call {
        name: String,
        args: Vec<f64>,
        result: f64,
    },
}

/// Observer of evaluation steps. Observing never changes the result.
pub trait Trace {
    fn record(&mut self, step: Step);
}

impl Trace for () {
    fn record(&mut self, _step: Step) {}
}

impl Trace for Vec<Step> {
    fn record(&mut self, step: Step) {
        self.push(step);
    }
}
