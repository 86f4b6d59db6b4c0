//! iocscout CLI - find indicators of compromise and manage the lookup cache

use clap::{CommandFactory, Parser};

mod cli;
mod output;

use cli::{CacheCommands, Cli, CommandContext, Commands, GlobalOptions, SettingsCommands};
use iocscout::error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Version => {
            println!("iocscout version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "iocscout", &mut std::io::stdout());
            Ok(())
        }
        Commands::Detect { text, file, types } => {
            let ctx = CommandContext::new(&opts)?;
            cli::detect::run(&ctx, text.as_deref(), file.as_deref(), &types)
        }
        Commands::Cache(cache_cmd) => {
            let ctx = CommandContext::new(&opts)?;
            match cache_cmd {
                CacheCommands::Status => cli::cache::status(&ctx).await,
                CacheCommands::Clear { yes } => cli::cache::clear(&ctx, yes).await,
                CacheCommands::Clean => cli::cache::clean(&ctx).await,
                CacheCommands::Path => cli::cache::path(&ctx),
            }
        }
        Commands::Settings(settings_cmd) => {
            let ctx = CommandContext::new(&opts)?;
            match settings_cmd {
                SettingsCommands::Show => cli::settings::show(&ctx).await,
                SettingsCommands::Set {
                    retention_days,
                    enabled,
                } => cli::settings::set(&ctx, retention_days, enabled).await,
            }
        }
    }
}

/// `--debug` raises the default filter; `RUST_LOG` still wins
fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}
