use clap::Parser;
use tinvest_reporter::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
