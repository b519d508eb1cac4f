//! jish CLI entry point.
//!
//! Usage:
//!   jish              # Interactive REPL
//!   jish --help
//!   jish --version

use std::env;
use std::process::ExitCode;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    match env::args().nth(1).as_deref() {
        None => match jish_repl::run() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {e:?}");
                ExitCode::FAILURE
            }
        },

        Some("--help" | "-h") => {
            print_help();
            ExitCode::SUCCESS
        }

        Some("--version" | "-V") => {
            println!("jish {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }

        Some(unknown) => {
            eprintln!("Unknown option: {unknown}");
            eprintln!("Run 'jish --help' for usage.");
            ExitCode::FAILURE
        }
    }
}

fn print_help() {
    println!(
        r#"仕sh — jish v{}

Usage:
  jish              Interactive REPL

Options:
  -h, --help        Show this help
  -V, --version     Show version

Job control:
  jobs              List live jobs
  fg %N             Move job N to the foreground
  bg %N             Resume job N in the background
  kill [-s S] T...  Signal pids or %jobs
"#,
        env!("CARGO_PKG_VERSION")
    );
}
