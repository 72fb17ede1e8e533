use std::{fs, path::PathBuf, process::ExitCode};

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use zetri::{parse_program, Interpreter, InterpreterOptions, ZetriError};

#[derive(Parser)]
#[command(author, version, about = "ZetriScript interpreter")]
struct Args {
    /// Increase logging verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a ZetriScript file and print every plotted point
    Run {
        script: PathBuf,
        /// Cancel after this many statements
        #[arg(long)]
        max_steps: Option<u64>,
    },
    /// Run a snippet of ZetriScript passed on the command line
    Eval {
        source: String,
        #[arg(long)]
        max_steps: Option<u64>,
    },
    /// Lex and parse a file without running it
    Check { script: PathBuf },
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let (source, outcome) = match args.command {
        Command::Run { script, max_steps } => match fs::read_to_string(&script) {
            Ok(source) => {
                let outcome = run(&source, max_steps);
                (source, outcome)
            }
            Err(err) => (String::new(), Err(ZetriError::from(err))),
        },
        Command::Eval { source, max_steps } => {
            let outcome = run(&source, max_steps);
            (source, outcome)
        }
        Command::Check { script } => match fs::read_to_string(&script) {
            Ok(source) => {
                let outcome = check(&source);
                (source, outcome)
            }
            Err(err) => (String::new(), Err(ZetriError::from(err))),
        },
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.diagnostic() {
                Some(diagnostic) => eprint!("{}", diagnostic.render(&source)),
                None => eprintln!("error: {err}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(source: &str, max_steps: Option<u64>) -> Result<(), ZetriError> {
    let mut interpreter = Interpreter::with_options(InterpreterOptions {
        step_limit: max_steps,
    });
    interpreter.eval_source(source)?;
    for point in interpreter.canvas() {
        println!("{point}");
    }
    Ok(())
}

fn check(source: &str) -> Result<(), ZetriError> {
    let program = parse_program(source)?;
    println!("ok: {} statement(s)", program.statements.len());
    Ok(())
}

fn init_tracing(verbose: u8) {
    let directive = match verbose {
        0 => "zetri=warn",
        1 => "zetri=debug",
        _ => "zetri=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive)),
        )
        .with_writer(std::io::stderr)
        .init();
}
