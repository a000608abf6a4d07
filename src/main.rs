mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Command};
use commands::Target;
use hkpass::config;

const LOG_ENV: &str = "HKPASS_LOG";

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let root = config::project_root()?;
    let config_file = cli
        .config
        .clone()
        .unwrap_or_else(|| config::config_path(&root));
    let cfg = match &cli.config {
        Some(path) => config::read(path)?,
        None => config::load(&config_file)?,
    };
    let target = Target {
        store: config::store_path(cli.store.as_deref(), &cfg, &config_file, &root),
        config_file,
        page_size: cfg.page_size,
    };
    log::debug!("using store {}", target.store.display());

    match cli.command {
        Command::Init { force } => commands::init::run(&target, force)?,
        Command::List { view, json } => commands::list::run(&target, &view, json)?,
        Command::Show { row, view } => commands::show::run(&target, row, &view)?,
        Command::Add { account, username } => commands::add::run(&target, &account, username)?,
        Command::Modify { account, username } => {
            commands::modify::run(&target, &account, username)?
        }
        Command::Delete { account, yes } => commands::delete::run(&target, &account, yes)?,
    }

    Ok(())
}

/// Logs go to stderr so they never mix with listed output.
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or(LOG_ENV, "warn"))
        .target(env_logger::Target::Stderr)
        .init();
}
