//! Binary entry point for sosumi-rs.
//!
//! Maps the error taxonomy onto the process exit code contract:
//! 0 success, 2 invalid inputs or configuration, 3 decryption or integrity
//! failure, 5 bundle missing.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use clap::Parser;
use sosumi_rs::cli::{Cli, execute, format_error};
use sosumi_rs::render::RenderFormat;
use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let format = cli.render_format();

    match execute(&cli) {
        Ok(output) => {
            if !output.is_empty() {
                // Handle broken pipe gracefully (e.g., when piped to `head` or `jq`)
                if let Err(e) = write!(io::stdout(), "{output}")
                    && e.kind() != io::ErrorKind::BrokenPipe
                {
                    eprintln!("Error writing to stdout: {e}");
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            let error_output = format_error(&e, format);
            match format {
                RenderFormat::Json => {
                    // JSON errors go to stdout for programmatic parsing
                    println!("{error_output}");
                }
                RenderFormat::Markdown => {
                    eprintln!("Error: {error_output}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}
