use safecalc_rs::{diagnose_error, evaluate_expression, explain_expression};

fn main() {
    pretty_env_logger::init();

    let expressions = [
        "2 * (3 + 5)",
        "sqrt(16) + pow(2, 3)",
        "-2 ^ 2",
        "pi * 2 ^ 2",
        "1 / 0",
        "__import__('os')",
    ];

    for expression in expressions {
        match evaluate_expression(expression) {
            Ok(result) => {
                println!("{} = {}", expression, result);
                if let Ok(steps) = explain_expression(expression) {
                    for step in steps {
                        println!("  - {}", step);
                    }
                }
            }
            Err(err) => println!("{}: {} ({})", expression, err, diagnose_error(expression, &err)),
        }
    }
}
