use crate::ast::{ASTNode, Parser, Step, Trace};
use crate::config::EvaluatorConfig;
use crate::error::EvaluationError;
use crate::functions;
use log::debug;
use lru::LruCache;
use rayon::prelude::*;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// Parses and evaluates whitelisted arithmetic. Shareable across threads; the only
/// interior state is an optional cache of parsed trees, which never changes a result.
pub struct Evaluator {
    config: EvaluatorConfig,
    cache: Option<Mutex<LruCache<String, Arc<ASTNode>>>>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::with_config(EvaluatorConfig::default())
    }
}

impl Evaluator {
    /// Creates a new `Evaluator` with a given maximum cache size.
    pub fn new(max_cache_size: usize) -> Self {
        Self::with_config(EvaluatorConfig::default().with_cache_size(max_cache_size))
    }

    pub fn with_config(config: EvaluatorConfig) -> Self {
        let cache = NonZeroUsize::new(config.cache_size).map(|size| Mutex::new(LruCache::new(size)));
        Self { config, cache }
    }

    /// Parse an expression string into an AST.
    pub fn parse_expression(&self, expression: &str) -> Result<Arc<ASTNode>, EvaluationError> {
        if let Some(ast) = self.cached(expression) {
            debug!("Cache hit for expression: {}", expression);
            return Ok(ast);
        }

        let ast = Arc::new(Parser::parse_expression_with(expression, &self.config)?);
        if let Some(cache) = &self.cache {
            // a poisoned lock only costs us the cache
            if let Ok(mut cache) = cache.lock() {
                cache.put(expression.to_string(), Arc::clone(&ast));
            }
        }
        Ok(ast)
    }

    fn cached(&self, expression: &str) -> Option<Arc<ASTNode>> {
        let mut cache = self.cache.as_ref()?.lock().ok()?;
        cache.get(expression).cloned()
    }

    /// Evaluates a given expression string.
    ///
    /// # Returns
    ///
    /// * `Ok(f64)` if parsing and evaluation succeed.
    /// * `Err(EvaluationError)` describing the first fault otherwise.
    pub fn evaluate_expression(&self, expression: &str) -> Result<f64, EvaluationError> {
        let ast = self.parse_expression(expression)?;
        let result = self.evaluate(&ast)?;
        debug!("Evaluated {} = {}", expression, result);
        Ok(result)
    }

    /// Evaluates independent expressions in parallel, one result per input, in input order.
    pub fn evaluate_batch<S>(&self, expressions: &[S]) -> Vec<Result<f64, EvaluationError>>
    where
        S: AsRef<str> + Sync,
    {
        expressions
            .par_iter()
            .map(|expression| self.evaluate_expression(expression.as_ref()))
            .collect()
    }

    /// Evaluates an already parsed tree.
    pub fn evaluate(&self, ast: &ASTNode) -> Result<f64, EvaluationError> {
        self.evaluate_traced(ast, &mut ())
    }

    /// Evaluates `ast`, reporting every completed step to `trace` in evaluation order.
    pub fn evaluate_traced<T: Trace>(
        &self,
        ast: &ASTNode,
        trace: &mut T,
    ) -> Result<f64, EvaluationError> {
        if ast.depth() > self.config.max_tree_depth {
            return Err(EvaluationError::ResourceLimit {
                what: "expression depth",
                limit: self.config.max_tree_depth,
            });
        }
        self.evaluate_node(ast, trace)
    }

    fn evaluate_node<T: Trace>(&self, ast: &ASTNode, trace: &mut T) -> Result<f64, EvaluationError> {
        match ast {
            ASTNode::Number(n) => {
                if n.is_finite() {
                    Ok(*n)
                } else {
                    Err(EvaluationError::NonFiniteResult {
                        operation: "literal".to_string(),
                    })
                }
            }

            ASTNode::Identifier(name) => {
                let value = functions::constant(name)?;
                trace.record(Step::Constant {
                    name: name.clone(),
                    value,
                });
                Ok(value)
            }

            ASTNode::UnaryOperation { operator, operand } => {
                let operand = self.evaluate_node(operand, trace)?;
                let result = operator.apply(operand)?;
                trace.record(Step::Unary {
                    operator: *operator,
                    operand,
                    result,
                });
                Ok(result)
            }

            ASTNode::BinaryOperation { .. } => {
                // left-leaning chains are folded in a loop, not one frame per term
                let mut chain = Vec::new();
                let mut node = ast;
                while let ASTNode::BinaryOperation {
                    left,
                    operator,
                    right,
                } = node
                {
                    chain.push((*operator, right.as_ref()));
                    node = left.as_ref();
                }

                let mut left = self.evaluate_node(node, trace)?;
                for (operator, right) in chain.into_iter().rev() {
                    let right = self.evaluate_node(right, trace)?;
                    let result = operator.apply(left, right)?;
                    trace.record(Step::Binary {
                        left,
                        operator,
                        right,
                        result,
                    });
                    left = result;
                }
                Ok(left)
            }

            ASTNode::FunctionCall { name, args } => {
                let function = functions::function(name)?;

                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.evaluate_node(arg, trace)?);
                }

                let result = function(&values)?;
                trace.record(Step::Call {
                    name: name.clone(),
                    args: values,
                    result,
                });
                Ok(result)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Operator, UnaryOperator};
    use crate::error::ErrorKind;

    fn setup_evaluator() -> Evaluator {
        Evaluator::new(16)
    }

    fn error_kind(input: &str) -> ErrorKind {
        setup_evaluator()
            .evaluate_expression(input)
            .expect_err(input)
            .kind()
    }

    #[test]
    fn test_simple_binary_expression() {
        let evaluator = setup_evaluator();

        assert_eq!(evaluator.evaluate_expression("100 + 50").unwrap(), 150.0);
        assert_eq!(evaluator.evaluate_expression("100 - 50").unwrap(), 50.0);
        assert_eq!(evaluator.evaluate_expression("100 * 50").unwrap(), 5000.0);
        assert_eq!(evaluator.evaluate_expression("100 / 50").unwrap(), 2.0);
        assert_eq!(evaluator.evaluate_expression("100 % 30").unwrap(), 10.0);
        assert_eq!(evaluator.evaluate_expression("2 ** 8").unwrap(), 256.0);
    }

    #[test]
    fn test_precedence_and_grouping() {
        let evaluator = setup_evaluator();

        assert_eq!(evaluator.evaluate_expression("2 + 3 * 4").unwrap(), 14.0);
        assert_eq!(evaluator.evaluate_expression("(2 + 3) * 4").unwrap(), 20.0);
        assert_eq!(evaluator.evaluate_expression("2 ^ 3 ^ 2").unwrap(), 512.0);
        assert_eq!(evaluator.evaluate_expression("(2 ^ 3) ^ 2").unwrap(), 64.0);
        assert_eq!(evaluator.evaluate_expression("10 - 4 - 3").unwrap(), 3.0);
        assert_eq!(evaluator.evaluate_expression("64 / 4 / 2").unwrap(), 8.0);
        assert_eq!(
            evaluator
                .evaluate_expression("((5 + 3) * (10 / 2)) + ((4 - 2) * (6 / 3)) - (8 % 3)")
                .unwrap(),
            42.0
        );
    }

    #[test]
    fn test_unary_operators() {
        let evaluator = setup_evaluator();

        assert_eq!(evaluator.evaluate_expression("-2 ^ 2").unwrap(), -4.0);
        assert_eq!(evaluator.evaluate_expression("(-2) ^ 2").unwrap(), 4.0);
        assert_eq!(evaluator.evaluate_expression("2 ^ -1").unwrap(), 0.5);
        assert_eq!(evaluator.evaluate_expression("-5 + 3").unwrap(), -2.0);
        assert_eq!(evaluator.evaluate_expression("--5").unwrap(), 5.0);
        assert_eq!(evaluator.evaluate_expression("+5").unwrap(), 5.0);
        assert_eq!(evaluator.evaluate_expression("3 * -2").unwrap(), -6.0);
        assert_eq!(evaluator.evaluate_expression("-7 % 3").unwrap(), 2.0);
    }

    #[test]
    fn test_functions_and_constants() {
        let evaluator = setup_evaluator();

        assert_eq!(evaluator.evaluate_expression("sqrt(16)").unwrap(), 4.0);
        assert_eq!(evaluator.evaluate_expression("pow(2, 10)").unwrap(), 1024.0);
        assert_eq!(evaluator.evaluate_expression("ln(1)").unwrap(), 0.0);
        assert!((evaluator.evaluate_expression("ln(8, 2)").unwrap() - 3.0).abs() < 1e-12);
        assert_eq!(
            evaluator.evaluate_expression("pi").unwrap(),
            std::f64::consts::PI
        );
        assert_eq!(
            evaluator.evaluate_expression("2 * e").unwrap(),
            2.0 * std::f64::consts::E
        );
        assert_eq!(
            evaluator.evaluate_expression("sqrt(pow(3, 2) + 4 ^ 2)").unwrap(),
            5.0
        );
        assert!((evaluator.evaluate_expression("log(1000)").unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejected_names() {
        assert_eq!(error_kind("2 + x"), ErrorKind::UnknownIdentifier);
        assert_eq!(error_kind("sqrt"), ErrorKind::UnknownIdentifier);
        assert_eq!(error_kind("pi(2)"), ErrorKind::UnknownFunction);
        assert_eq!(error_kind("exec(1)"), ErrorKind::UnknownFunction);
        assert_eq!(error_kind("__import__(1)"), ErrorKind::UnknownFunction);
    }

    #[test]
    fn test_invalid_arguments() {
        assert_eq!(error_kind("sqrt(1, 2)"), ErrorKind::InvalidArgument);
        assert_eq!(error_kind("pow(2)"), ErrorKind::InvalidArgument);
        assert_eq!(error_kind("sqrt()"), ErrorKind::InvalidArgument);
        assert_eq!(error_kind("sqrt(-1)"), ErrorKind::InvalidArgument);
        assert_eq!(error_kind("log(0)"), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(error_kind("1 / 0"), ErrorKind::DivisionByZero);
        assert_eq!(error_kind("5 % 0"), ErrorKind::DivisionByZero);
        assert_eq!(error_kind("1 / (2 - 2)"), ErrorKind::DivisionByZero);
        assert_eq!(error_kind("0 ^ -1"), ErrorKind::DivisionByZero);
    }

    #[test]
    fn test_non_finite_results() {
        assert_eq!(error_kind("10 ^ 400"), ErrorKind::NonFiniteResult);
        assert_eq!(error_kind("(-8) ^ 0.5"), ErrorKind::NonFiniteResult);
        assert_eq!(error_kind("pow(10, 400)"), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_first_fault_wins() {
        assert_eq!(error_kind("1 / 0 + x"), ErrorKind::DivisionByZero);
        assert_eq!(error_kind("x + 1 / 0"), ErrorKind::UnknownIdentifier);
        // the function name is checked before any argument is evaluated
        assert_eq!(error_kind("nope(1 / 0)"), ErrorKind::UnknownFunction);
        assert_eq!(error_kind("sqrt(1 / 0, y)"), ErrorKind::DivisionByZero);
    }

    #[test]
    fn test_direct_ast_evaluation() {
        let evaluator = setup_evaluator();
        let ast = ASTNode::BinaryOperation {
            left: Box::new(ASTNode::Identifier("pi".to_string())),
            operator: Operator::Multiply,
            right: Box::new(ASTNode::UnaryOperation {
                operator: UnaryOperator::Minus,
                operand: Box::new(ASTNode::Number(2.0)),
            }),
        };
        assert_eq!(evaluator.evaluate(&ast).unwrap(), -2.0 * std::f64::consts::PI);

        let ast = ASTNode::Number(f64::NAN);
        assert_eq!(
            evaluator.evaluate(&ast).unwrap_err().kind(),
            ErrorKind::NonFiniteResult
        );
    }

    #[test]
    fn test_tree_depth_limit() {
        let evaluator = Evaluator::with_config(EvaluatorConfig::default().with_max_tree_depth(3));
        assert_eq!(evaluator.evaluate_expression("1 + 2 * 3").unwrap(), 7.0);
        assert_eq!(
            evaluator.evaluate_expression("1 + 2 * 3 ^ 4"),
            Err(EvaluationError::ResourceLimit {
                what: "expression depth",
                limit: 3
            })
        );

        let chain = vec!["2"; 300].join(" ^ ");
        assert_eq!(error_kind(&chain), ErrorKind::ResourceLimit);
        let signs = format!("{}1", "-".repeat(1000));
        assert_eq!(error_kind(&signs), ErrorKind::ResourceLimit);
    }

    #[test]
    fn test_flat_chains_are_not_depth_limited() {
        let evaluator = setup_evaluator();

        let sum = vec!["1"; 1000].join(" + ");
        assert_eq!(evaluator.evaluate_expression(&sum), Ok(1000.0));

        let product = vec!["1"; 1000].join(" * ");
        assert_eq!(evaluator.evaluate_expression(&product), Ok(1.0));

        let mixed = (0..1000)
            .map(|i| if i % 2 == 0 { "3" } else { "2" })
            .collect::<Vec<_>>()
            .join(" - ");
        // 3 - 2 - 3 - 2 ... with 500 threes and 500 twos
        assert_eq!(evaluator.evaluate_expression(&mixed), Ok(3.0 - 499.0 * 3.0 - 500.0 * 2.0));

        let shallow = Evaluator::with_config(EvaluatorConfig::default().with_max_tree_depth(2));
        assert_eq!(shallow.evaluate_expression(&sum), Ok(1000.0));
    }

    #[test]
    fn test_trace_records_post_order() {
        let evaluator = setup_evaluator();
        let ast = evaluator.parse_expression("2 + sqrt(9) * pi").unwrap();
        let mut steps = Vec::new();
        let result = evaluator.evaluate_traced(&ast, &mut steps).unwrap();

        assert_eq!(result, 2.0 + 3.0 * std::f64::consts::PI);
        assert_eq!(
            steps,
            vec![
                Step::Call {
                    name: "sqrt".to_string(),
                    args: vec![9.0],
                    result: 3.0,
                },
                Step::Constant {
                    name: "pi".to_string(),
                    value: std::f64::consts::PI,
                },
                Step::Binary {
                    left: 3.0,
                    operator: Operator::Multiply,
                    right: std::f64::consts::PI,
                    result: 3.0 * std::f64::consts::PI,
                },
                Step::Binary {
                    left: 2.0,
                    operator: Operator::Add,
                    right: 3.0 * std::f64::consts::PI,
                    result,
                },
            ]
        );
    }

    #[test]
    fn test_parse_cache_reuses_trees() {
        let evaluator = Evaluator::new(2);
        let first = evaluator.parse_expression("1 + 1").unwrap();
        let second = evaluator.parse_expression("1 + 1").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        evaluator.parse_expression("2 + 2").unwrap();
        evaluator.parse_expression("3 + 3").unwrap();
        let evicted = evaluator.parse_expression("1 + 1").unwrap();
        assert!(!Arc::ptr_eq(&first, &evicted));
        assert_eq!(*first, *evicted);

        let uncached = Evaluator::new(0);
        let a = uncached.parse_expression("1").unwrap();
        let b = uncached.parse_expression("1").unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_batch_preserves_order() {
        let evaluator = setup_evaluator();
        let results = evaluator.evaluate_batch(&["1 + 1", "2 * 3", "1 / 0", "sqrt(49)"]);
        assert_eq!(results.len(), 4);
        assert_eq!(results[0], Ok(2.0));
        assert_eq!(results[1], Ok(6.0));
        assert_eq!(results[2], Err(EvaluationError::DivisionByZero));
        assert_eq!(results[3], Ok(7.0));
    }
}
