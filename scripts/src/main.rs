use clap::Parser;
use honey_scripts::{cli::Cli, errors::ScriptError};

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    let Cli { global, command } = Cli::parse();

    tracing_subscriber::fmt().pretty().init();

    command.run(&global).await
}
