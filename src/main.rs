//! bl - booleang front end
//!
//! Parses booleang circuit files and prints the result.
//!
//! # Usage
//!
//! ```bash
//! bl adder.bl            # print the parsed program
//! bl --tokens adder.bl   # print every token instead
//! bl                     # lexer REPL
//! RUST_LOG=debug bl adder.bl
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use booleang_core::{dsl, error::Result, repl};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Booleang circuit language front end
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the source file (.bl); starts a REPL when omitted
    #[arg(value_name = "SOURCE_FILE")]
    source_file: Option<PathBuf>,

    /// Print the token stream instead of the parsed program
    #[arg(short, long)]
    tokens: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<()> {
    let Some(path) = args.source_file else {
        return repl::run_stdio();
    };

    if args.tokens {
        let source = dsl::read_source(&path)?;
        for token in dsl::tokenize(&source, &dsl::file_label(&path)) {
            println!("{}", token);
        }
        return Ok(());
    }

    let program = dsl::parse_file(&path)?;
    println!("{}", program);
    Ok(())
}

fn main() -> ExitCode {
    init_logging();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
