use clap::Parser;
use safecalc_rs::config::{
    DEFAULT_MAX_EXPRESSION_LENGTH, DEFAULT_MAX_NESTING_DEPTH, DEFAULT_MAX_TREE_DEPTH,
};
use safecalc_rs::ast::Step;
use safecalc_rs::explain::describe_steps;
use safecalc_rs::history::{HistoryRecord, HistoryStore};
use safecalc_rs::{diagnose_error, Evaluator, EvaluatorConfig};
use std::path::PathBuf;
use std::process::ExitCode;

/// Evaluate whitelisted arithmetic expressions.
#[derive(Parser, Debug)]
#[command(name = "safecalc", version)]
struct Args {
    /// Expression to evaluate, e.g. "2 * (3 + 5)". Several words are joined with spaces.
    expression: Vec<String>,

    /// Print each evaluation step.
    #[arg(long)]
    explain: bool,

    /// JSON-lines file that successful evaluations are appended to.
    #[arg(long, value_name = "FILE")]
    history: Option<PathBuf>,

    /// Print the N most recent history records (requires --history).
    #[arg(long, value_name = "N", requires = "history")]
    recent: Option<usize>,

    #[arg(long, default_value_t = DEFAULT_MAX_EXPRESSION_LENGTH)]
    max_length: usize,

    #[arg(long, default_value_t = DEFAULT_MAX_NESTING_DEPTH)]
    max_nesting: usize,

    #[arg(long, default_value_t = DEFAULT_MAX_TREE_DEPTH)]
    max_depth: usize,
}

fn main() -> ExitCode {
    pretty_env_logger::init();
    let args = Args::parse();

    let store = args.history.clone().map(HistoryStore::new);
    let mut status = ExitCode::SUCCESS;

    if !args.expression.is_empty() {
        let config = EvaluatorConfig::default()
            .with_max_expression_length(args.max_length)
            .with_max_nesting_depth(args.max_nesting)
            .with_max_tree_depth(args.max_depth);
        let expression = args.expression.join(" ");

        if !evaluate(&Evaluator::with_config(config), &expression, args.explain, store.as_ref()) {
            status = ExitCode::FAILURE;
        }
    }

    if let (Some(count), Some(store)) = (args.recent, store.as_ref()) {
        match store.recent(count) {
            Ok(records) if records.is_empty() => println!("No history yet."),
            Ok(records) => {
                for record in records {
                    println!(
                        "{}  {} = {}",
                        record.time.format("%Y-%m-%d %H:%M:%S"),
                        record.expression,
                        record.result
                    );
                }
            }
            Err(e) => {
                eprintln!("error: {}", e);
                status = ExitCode::FAILURE;
            }
        }
    }

    status
}

/// Prints the outcome of one expression; returns whether it succeeded.
fn evaluate(
    evaluator: &Evaluator,
    expression: &str,
    explain: bool,
    store: Option<&HistoryStore>,
) -> bool {
    let outcome = evaluator.parse_expression(expression).and_then(|ast| {
        if !explain {
            return evaluator.evaluate(&ast);
        }

        let mut steps: Vec<Step> = Vec::new();
        let result = evaluator.evaluate_traced(&ast, &mut steps)?;
        let lines = describe_steps(&steps, result);
        // the closing "Result:" line is replaced by the plain result below
        for line in &lines[..lines.len() - 1] {
            println!("  - {}", line);
        }
        Ok(result)
    });

    match outcome {
        Ok(result) => {
            println!("{}", result);
            if let Some(store) = store {
                if let Err(e) = store.append(&HistoryRecord::new(expression, result)) {
                    eprintln!("warning: could not record to {}: {}", store.path().display(), e);
                }
            }
            true
        }
        Err(error) => {
            eprintln!("error: {}", error);
            eprintln!("hint: {}", diagnose_error(expression, &error));
            false
        }
    }
}
