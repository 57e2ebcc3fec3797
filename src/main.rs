use clap::Parser;
use trendswap::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
