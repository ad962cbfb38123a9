use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod inputs;

fn main() {
    // Logs go to stderr so --json output stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    std::process::exit(cli::Cli::parse().run());
}
