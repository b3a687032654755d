use anyhow::Result;
use clap::Parser;

use counselor::app::{open_coordinator, run_repl_mode};
use counselor::{setup_from_cli, Cli, Commands};

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    // RUST_LOG, when set, wins over -v
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let app_config = setup_from_cli(&cli)?;
    log::info!(
        "Backend {} with store {}",
        app_config.backend_url,
        app_config.store_path.display()
    );

    // If a one-shot subcommand was provided, execute it and exit
    match &cli.command {
        None | Some(Commands::Chat) => {}
        Some(command) => {
            let result = command.execute(&app_config).await?;
            println!("{}", result);
            return Ok(());
        }
    }

    let coordinator = open_coordinator(&app_config);
    run_repl_mode(&app_config, coordinator).await
}
