// demos/demo.rs
use deep_bsde::config::{Config, Problem};
use deep_bsde::equations::equation_for_config;
use deep_bsde::math_utils::Timer;
use deep_bsde::solver::TrainingLoop;
use deep_bsde::BsdeResult;

/// Short, low-dimensional runs of every built-in problem
fn main() -> BsdeResult<()> {
    println!("{:<20} {:>6} {:>12} {:>12} {:>8}", "problem", "d", "y0", "loss", "time");
    for problem in Problem::ALL {
        let preset = Config::for_problem(problem);
        let dim = 10;
        let config = Config {
            dim,
            num_iterations: 300,
            logging_frequency: 100,
            width_multiplier: 1,
            verbose: false,
            seed: Some(42),
            ..preset
        };

        let timer = Timer::new();
        let equation = equation_for_config(problem, &config)?;
        let history = TrainingLoop::new(&config, &equation)?.train()?;
        if let Some(last) = history.last() {
            println!(
                "{:<20} {:>6} {:>12.5} {:>12.4e} {:>7.2}s",
                problem,
                dim,
                last.y0,
                last.loss,
                timer.elapsed_secs()
            );
        }
    }
    Ok(())
}
