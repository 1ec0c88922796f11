//! kwdoc CLI — static keyword documentation generator.
//!
//! Documents built-in libraries, installed package libraries and the
//! resource files under an input directory, then writes an index page
//! linking every keyword.

mod commands;

use std::process::ExitCode;

use clap::Parser;

use commands::Cli;

fn main() -> ExitCode {
    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install error reporter: {e}");
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Usage and help both go to stdout.
            print!("{}", e.render());
            return ExitCode::from(commands::parse_exit_code(&e));
        }
    };

    commands::init_tracing(&cli);

    match commands::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            eprintln!("Error: {report:?}");
            ExitCode::from(commands::exit_code(&report))
        }
    }
}
