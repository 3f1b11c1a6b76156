use safecalc_rs::Evaluator;

fn main() {
    pretty_env_logger::init();

    let evaluator = Evaluator::new(100);

    let expression = "ln(e ^ 3) + log(1000)";
    let ast = evaluator
        .parse_expression(expression)
        .expect("Failed to parse");
    println!("Parsed: {}", ast);

    match evaluator.evaluate(&ast) {
        Ok(result) => println!("Result: {}", result),
        Err(err) => println!("Error: {}", err),
    }
}
