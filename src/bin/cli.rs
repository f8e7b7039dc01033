use clap::Parser;
use colored::Colorize;
use complex_eqsolve::observe::{Action, Event};
use complex_eqsolve::{
    detect_equation_variables, solve_system, solve_system_parallel, EquationSystem,
    PositionedError, QuasiRandom, SolveError, SolverConfig,
};
use std::process;

#[derive(Parser)]
#[command(name = "eqsolve")]
#[command(about = "Solve simultaneous equations over the complex numbers")]
#[command(version)]
struct Args {
    /// Equations of the form "lhs = rhs"
    #[arg(required = true)]
    equations: Vec<String>,

    /// Number of attempts from different initial guesses
    #[arg(short, long, default_value_t = 16)]
    attempts: usize,

    /// Newton iterations per attempt
    #[arg(short, long, default_value_t = 100)]
    iterations: usize,

    /// Largest residual magnitude accepted as solved
    #[arg(short, long, default_value_t = 1e-8)]
    epsilon: f64,

    /// Initial guesses are drawn from [-scale, scale] in both parts
    #[arg(short, long, default_value_t = 10.0)]
    scale: f64,

    /// Run attempts in parallel
    #[arg(short, long)]
    parallel: bool,

    /// Trace every attempt and iteration
    #[arg(short, long)]
    verbose: bool,

    /// Only print the detected variables
    #[arg(short, long)]
    detect: bool,
}

fn main() {
    let args = Args::parse();

    let equations = match split_equations(&args.equations) {
        Ok(equations) => equations,
        Err(message) => {
            eprintln!("{}: {}", "Error".red(), message);
            process::exit(2);
        }
    };

    if args.detect {
        println!("{}", detect_equation_variables(&equations).join(", "));
        return;
    }

    let config = SolverConfig {
        attempts: args.attempts,
        max_iterations: args.iterations,
        epsilon: args.epsilon,
        parallel: args.parallel,
    };

    match run(&equations, &config, &args) {
        Ok(()) => {}
        Err(SolveError::Equation(err)) => {
            report(&equations, &err);
            process::exit(1);
        }
        Err(err) => {
            eprintln!("{}: {}", "Error".red(), err);
            process::exit(1);
        }
    }
}

fn run(
    equations: &[(String, String)],
    config: &SolverConfig,
    args: &Args,
) -> Result<(), SolveError> {
    let system = EquationSystem::new(equations)?;
    let guesses = QuasiRandom::new(args.scale);

    if args.verbose {
        println!("{system}");
    }

    let solution = if config.parallel {
        solve_system_parallel(&system, config, guesses)?
    } else if args.verbose {
        solve_system(&system, config, guesses, &mut trace)?
    } else {
        solve_system(&system, config, guesses, &mut ())?
    };

    match solution {
        Some(solution) => print!("{solution}"),
        None => println!("{}", "No solution found".yellow()),
    }
    Ok(())
}

fn trace(event: &Event<'_>) -> Option<Action> {
    match event {
        Event::AttemptStarted { attempt, guess } => {
            let guess = guess.iter().map(ToString::to_string).collect::<Vec<_>>();
            eprintln!("{} {} from [{}]", "attempt".cyan(), attempt + 1, guess.join(", "));
        }
        Event::Iteration {
            iteration,
            residual_norm,
            ..
        } => {
            eprintln!("  {} {:>3}  |R| = {:.3e}", "iter".dimmed(), iteration, residual_norm);
        }
        Event::AttemptFinished {
            converged,
            iterations,
            ..
        } => {
            let status = if *converged {
                "converged".green()
            } else {
                "failed".red()
            };
            eprintln!("  {} after {} iteration(s)", status, iterations);
        }
    }
    None
}

/// Splits each argument at its single `=`.
fn split_equations(args: &[String]) -> Result<Vec<(String, String)>, String> {
    args.iter()
        .enumerate()
        .map(|(index, arg)| match arg.split_once('=') {
            Some((left, right)) if !right.contains('=') => {
                Ok((left.to_string(), right.to_string()))
            }
            _ => Err(format!(
                "equation {} must contain exactly one `=`: {}",
                index + 1,
                arg
            )),
        })
        .collect()
}

/// Prints a positioned error with a caret under the offending character.
fn report(equations: &[(String, String)], err: &PositionedError) {
    eprintln!("{}: {}", "Error".red(), err);
    let Some((left, right)) = equations.get(err.equation) else {
        return;
    };
    let text = err.side.select(left, right);
    eprintln!("  {text}");
    if let Some(offset) = err.offset() {
        eprintln!("  {}{}", " ".repeat(offset.min(text.len())), "^".red());
    }
}
