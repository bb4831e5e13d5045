//! Food Fleet CLI

use std::process;

use foodfleet::{config::Config, logging};

mod cli;

#[tokio::main]
pub async fn main() {
    let config = Config::load().unwrap_or_else(|error| error.exit());

    if let Err(error) = logging::init_subscriber(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized, must use eprintln for setup errors"
        )]
        {
            eprintln!("{error}");
        }

        process::exit(1);
    }

    if let Err(error) = cli::run(config).await {
        #[expect(
            clippy::print_stderr,
            reason = "command errors are reported to the terminal"
        )]
        {
            eprintln!("{error}");
        }

        process::exit(1);
    }
}
