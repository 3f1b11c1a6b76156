use safecalc_rs::Evaluator;

fn main() {
    pretty_env_logger::init();

    let expressions: Vec<String> = (1..=20)
        .map(|i| format!("sqrt({}) * {} % 7", i * i, i))
        .collect();

    let evaluator = Evaluator::new(100);
    for (expression, result) in expressions.iter().zip(evaluator.evaluate_batch(&expressions[..])) {
        println!("{}: {:?}", expression, result);
    }
}
