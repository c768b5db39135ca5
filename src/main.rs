//! CLI driver: one positional argument, the source text to compile.
//! Assembly goes to stdout; diagnostics go to stderr.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser as ClapParser;

/// Single-pass compiler for a tiny C-like language subset, targeting
/// AArch64 assembly (Apple/Darwin calling convention).
#[derive(ClapParser, Debug)]
#[command(name = "subc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Single-pass compiler for a small C subset, targeting AArch64 assembly")]
struct Cli {
    /// Source text to compile.
    source: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match subc::compile_source(&cli.source) {
        Ok(asm) => {
            if let Err(e) = io::stdout().write_all(asm.as_bytes()) {
                eprintln!("failed to write assembly to stdout: {}", e);
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(msg) => {
            eprintln!("{}", msg);
            ExitCode::FAILURE
        }
    }
}
