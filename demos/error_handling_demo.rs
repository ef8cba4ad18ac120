// demos/error_handling_demo.rs
use deep_bsde::config::{Config, Problem};
use deep_bsde::equations::{equation_for_config, hjb::Hjb};
use deep_bsde::error::BsdeError;
use deep_bsde::solver::TrainingLoop;

fn main() {
    println!("Error Handling Demo for deep-bsde");
    println!("==================================\n");

    println!("1. Unknown problem name...");
    match Config::for_name("NavierStokes") {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    println!("\n2. Malformed learning-rate schedule...");
    let config = Config {
        lr_boundaries: vec![100, 50],
        lr_values: vec![1e-2, 1e-3, 1e-4],
        ..Config::for_problem(Problem::Hjb)
    };
    match config.validate() {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    println!("\n3. Non-positive control cost...");
    match Hjb::with_lambda(10, 1.0, 20, 0.0) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    println!("\n4. Equation grid that disagrees with the config...");
    let config = Config {
        dim: 4,
        ..Config::for_problem(Problem::AllenCahn)
    };
    let other = Config {
        dim: 5,
        ..config.clone()
    };
    match equation_for_config(Problem::AllenCahn, &other) {
        Ok(equation) => match TrainingLoop::new(&config, &equation) {
            Ok(_) => println!("   Unexpected: Should have failed!"),
            Err(e @ BsdeError::ShapeMismatch { .. }) => println!("   ✓ Caught error: {}", e),
            Err(e) => println!("   Different error: {}", e),
        },
        Err(e) => println!("   Error: {}", e),
    }

    println!("\n5. Huge learning rate on a tiny problem...");
    let config = Config {
        dim: 2,
        num_iterations: 200,
        logging_frequency: 50,
        lr_boundaries: vec![],
        lr_values: vec![1e3],
        width_multiplier: 1,
        num_hidden_layers: 1,
        verbose: false,
        seed: Some(1),
        ..Config::for_problem(Problem::PricingDefaultRisk)
    };
    let outcome = equation_for_config(Problem::PricingDefaultRisk, &config)
        .and_then(|equation| {
            let mut training = TrainingLoop::new(&config, &equation)?;
            training.train()
        });
    match outcome {
        Ok(history) => println!(
            "   Survived: final y0 = {:.4}",
            history.last().map_or(f64::NAN, |r| r.y0)
        ),
        Err(e @ BsdeError::NumericalDivergence { .. }) => println!("   ✓ Caught error: {}", e),
        Err(e) => println!("   Error: {}", e),
    }
}
