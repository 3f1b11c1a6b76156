use crate::ast::{ASTNode, Operator, UnaryOperator};
use crate::config::EvaluatorConfig;
use crate::error::EvaluationError;
use log::debug;
use pest::error::{Error as PestError, InputLocation};
use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "./expression.pest"] // Link to the grammar file
pub struct ExpressionParser;

impl ExpressionParser {
    pub fn parse_expression(input: &str) -> Result<ASTNode, EvaluationError> {
        Self::parse_expression_with(input, &EvaluatorConfig::default())
    }

    /// Parses `input` after checking its length and parenthesis nesting against `config`,
    /// so the recursive grammar never descends further than the configured depth.
    pub fn parse_expression_with(
        input: &str,
        config: &EvaluatorConfig,
    ) -> Result<ASTNode, EvaluationError> {
        debug!("Parsing expression: {}", input);
        check_limits(input, config)?;
        if input.trim().is_empty() {
            return Err(EvaluationError::syntax("empty expression", None));
        }

        let mut pairs = ExpressionParser::parse(Rule::expression, input).map_err(syntax_error)?;
        let expression = next_pair(&mut pairs, "expression")?;
        let ast = Self::build_sum(next_pair(&mut expression.into_inner(), "expression")?)?;

        debug!("Parsed tree of depth {}", ast.depth());
        Ok(ast)
    }

    fn build_sum(pair: Pair<Rule>) -> Result<ASTNode, EvaluationError> {
        let mut pairs = pair.into_inner();
        let mut node = Self::build_product(next_pair(&mut pairs, "operand")?)?;

        while let Some(operator_pair) = pairs.next() {
            let operator = match operator_pair.as_rule() {
                Rule::PLUS | Rule::MINUS => Operator::try_from(operator_pair.as_str())?,
                _ => return Err(unexpected(&operator_pair)),
            };

            let right = Self::build_product(next_pair(&mut pairs, "operand")?)?;
            node = ASTNode::BinaryOperation {
                left: Box::new(node),
                operator,
                right: Box::new(right),
            };
        }

        Ok(node)
    }

    fn build_product(pair: Pair<Rule>) -> Result<ASTNode, EvaluationError> {
        let mut pairs = pair.into_inner();
        let mut node = Self::build_unary(next_pair(&mut pairs, "operand")?)?;

        while let Some(operator_pair) = pairs.next() {
            let operator = match operator_pair.as_rule() {
                Rule::STAR | Rule::SLASH | Rule::MOD => Operator::try_from(operator_pair.as_str())?,
                _ => return Err(unexpected(&operator_pair)),
            };

            let right = Self::build_unary(next_pair(&mut pairs, "operand")?)?;
            node = ASTNode::BinaryOperation {
                left: Box::new(node),
                operator,
                right: Box::new(right),
            };
        }

        Ok(node)
    }

    fn build_unary(pair: Pair<Rule>) -> Result<ASTNode, EvaluationError> {
        let mut signs = Vec::new();
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::PLUS | Rule::MINUS => signs.push(UnaryOperator::try_from(inner.as_str())?),
                Rule::power => return Ok(apply_signs(signs, Self::build_power(inner)?)),
                _ => return Err(unexpected(&inner)),
            }
        }
        Err(EvaluationError::syntax("missing operand", None))
    }

    /// Builds `a ^ b ^ c` as `a ^ (b ^ c)`. Signs in front of an exponent apply to
    /// everything to their right.
    fn build_power(pair: Pair<Rule>) -> Result<ASTNode, EvaluationError> {
        let mut pairs = pair.into_inner();
        let base = Self::build_primary(next_pair(&mut pairs, "operand")?)?;
        let mut chain = vec![(Vec::new(), base)];

        while let Some(operator_pair) = pairs.next() {
            if operator_pair.as_rule() != Rule::POW {
                return Err(unexpected(&operator_pair));
            }
            chain.push(Self::build_exponent(next_pair(&mut pairs, "exponent")?)?);
        }

        let (signs, last) = chain
            .pop()
            .ok_or_else(|| EvaluationError::syntax("missing operand", None))?;
        let mut node = apply_signs(signs, last);
        while let Some((signs, base)) = chain.pop() {
            node = apply_signs(
                signs,
                ASTNode::BinaryOperation {
                    left: Box::new(base),
                    operator: Operator::Power,
                    right: Box::new(node),
                },
            );
        }

        Ok(node)
    }

    fn build_exponent(
        pair: Pair<Rule>,
    ) -> Result<(Vec<UnaryOperator>, ASTNode), EvaluationError> {
        let mut signs = Vec::new();
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::PLUS | Rule::MINUS => signs.push(UnaryOperator::try_from(inner.as_str())?),
                _ => return Ok((signs, Self::build_primary(inner)?)),
            }
        }
        Err(EvaluationError::syntax("missing exponent", None))
    }

    fn build_primary(pair: Pair<Rule>) -> Result<ASTNode, EvaluationError> {
        debug!("Building primary expression: {:?}", pair.as_str());
        match pair.as_rule() {
            Rule::number => {
                let position = pair.as_span().start();
                let value = pair.as_str().parse::<f64>().map_err(|e| {
                    EvaluationError::syntax(format!("invalid number: {}", e), Some(position))
                })?;
                if !value.is_finite() {
                    return Err(EvaluationError::syntax(
                        "numeric literal out of range",
                        Some(position),
                    ));
                }
                Ok(ASTNode::Number(value))
            }
            Rule::identifier => Ok(ASTNode::Identifier(pair.as_str().to_string())),
            Rule::group => Self::build_sum(next_pair(&mut pair.into_inner(), "expression")?),
            Rule::function_call => Self::build_function_call(pair),
            _ => Err(unexpected(&pair)),
        }
    }

    fn build_function_call(pair: Pair<Rule>) -> Result<ASTNode, EvaluationError> {
        let mut inner = pair.into_inner();
        let name = next_pair(&mut inner, "function name")?.as_str().to_string();
        let args = match inner.next() {
            Some(arguments) => arguments
                .into_inner()
                .map(Self::build_sum)
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };
        Ok(ASTNode::FunctionCall { name, args })
    }
}

fn check_limits(input: &str, config: &EvaluatorConfig) -> Result<(), EvaluationError> {
    if input.len() > config.max_expression_length {
        return Err(EvaluationError::ResourceLimit {
            what: "expression length",
            limit: config.max_expression_length,
        });
    }

    let mut depth = 0usize;
    for c in input.chars() {
        match c {
            '(' => {
                depth += 1;
                if depth > config.max_nesting_depth {
                    return Err(EvaluationError::ResourceLimit {
                        what: "nesting depth",
                        limit: config.max_nesting_depth,
                    });
                }
            }
            // unbalanced closers are reported by the grammar
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

fn apply_signs(signs: Vec<UnaryOperator>, operand: ASTNode) -> ASTNode {
    signs
        .into_iter()
        .rev()
        .fold(operand, |node, operator| ASTNode::UnaryOperation {
            operator,
            operand: Box::new(node),
        })
}

fn next_pair<'i>(pairs: &mut Pairs<'i, Rule>, what: &str) -> Result<Pair<'i, Rule>, EvaluationError> {
    pairs
        .next()
        .ok_or_else(|| EvaluationError::syntax(format!("missing {}", what), None))
}

fn unexpected(pair: &Pair<Rule>) -> EvaluationError {
    EvaluationError::syntax(
        format!("unexpected {}", describe_rule(&pair.as_rule())),
        Some(pair.as_span().start()),
    )
}

fn syntax_error(error: PestError<Rule>) -> EvaluationError {
    let position = match error.location {
        InputLocation::Pos(position) => position,
        InputLocation::Span((start, _)) => start,
    };
    let error = error.renamed_rules(describe_rule);
    EvaluationError::syntax(error.variant.message().into_owned(), Some(position))
}

fn describe_rule(rule: &Rule) -> String {
    match rule {
        Rule::EOI => "end of input".to_string(),
        Rule::number => "number".to_string(),
        Rule::identifier => "name".to_string(),
        Rule::function_call => "function call".to_string(),
        Rule::group => "'('".to_string(),
        Rule::PLUS => "'+'".to_string(),
        Rule::MINUS => "'-'".to_string(),
        Rule::POW => "'^'".to_string(),
        Rule::STAR => "'*'".to_string(),
        Rule::SLASH => "'/'".to_string(),
        Rule::MOD => "'%'".to_string(),
        other => format!("{:?}", other),
    }
}
