use foodfleet::config::{Command, Config};

mod checkout;
mod regions;

pub(crate) async fn run(config: Config) -> Result<(), String> {
    match config.command {
        Command::Checkout(args) => checkout::run(&config.store, args).await,
        Command::Regions => regions::run(&config.store),
    }
}
