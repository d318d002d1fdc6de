#![allow(nonstandard_style)]

use clap::Parser;
use rpn_calc::*;
use std::io::{self, Write};
use std::process::ExitCode;

#[derive(Parser)]
#[command(author, version, about = "Evaluates infix and postfix arithmetic")]
struct Args {
    /// Evaluate this expression once instead of prompting
    #[arg(allow_hyphen_values = true)]
    expression: Option<String>,

    /// Notation of EXPRESSION
    #[arg(long, value_enum, default_value_t = Mode::infix)]
    mode: Mode,

    /// Print the postfix form of each expression before its results
    #[arg(long)]
    show_postfix: bool,

    /// Line number reported for the first line of standard input
    #[arg(long, default_value_t = 1)]
    start_line: usize,
}

fn report(out: &mut impl Write, evaluation: &Evaluation, show_postfix: bool) -> Result<()> {
    if show_postfix {
        writeln!(out, "Postfix: {}", evaluation.render_postfix())?;
    }
    for value in evaluation.results() {
        writeln!(out, "Result: {value}")?;
    }
    Ok(())
}

fn run_once(args: &Args, expression: &str) -> Result<()> {
    let evaluation = match args.mode {
        Mode::infix => evaluate_infix(expression)?,
        Mode::postfix => evaluate_postfix(expression)?,
    };
    report(&mut io::stdout(), &evaluation, args.show_postfix)
}

fn prompt(args: &Args) -> Result<()> {
    let mut calculator = Calculator::new(Scanner::stdin(args.start_line));
    let mut stdout = io::stdout();

    loop {
        writeln!(stdout, "infix, postfix, or quit?")?;
        stdout.flush()?;

        let mode = match calculator.read_command() {
            Ok(Command::evaluate(mode)) => mode,
            Ok(Command::quit) => return Ok(()),
            Err(e @ CalcError::io(_)) => return Err(e),
            Err(e) => {
                writeln!(stdout, "Error, {e}")?;
                continue;
            },
        };

        match calculator.run(mode) {
            Ok(evaluation) => report(&mut stdout, &evaluation, args.show_postfix)?,
            Err(CalcError::abrupt_end) => return Ok(()),
            Err(e @ CalcError::io(_)) => return Err(e),
            Err(e) => writeln!(stdout, "Error, {e}")?,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let outcome = match &args.expression {
        Some(expression) => run_once(&args, expression),
        None => prompt(&args),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error, {e}");
            ExitCode::FAILURE
        },
    }
}
