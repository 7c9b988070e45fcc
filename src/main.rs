use clap::Parser;
use papertrade::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
