use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "hkpass",
    about = "A small encrypted password store for your accounts.",
    version
)]
pub struct Cli {
    /// Store file (default: from hkpass.toml, else ./passwords.hkpswd).
    #[arg(long, global = true, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Config file (default: ./hkpass.toml).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Which slice of the account list to look at.
#[derive(Args, Debug, Clone)]
pub struct ViewArgs {
    /// Page number, starting at 1.
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Only show accounts whose name contains TEXT (case-sensitive).
    #[arg(long, value_name = "TEXT")]
    pub search: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new, empty password store.
    Init {
        /// Overwrite an existing store file.
        #[arg(long)]
        force: bool,
    },

    /// List account names, one page at a time (never passwords).
    List {
        #[command(flatten)]
        view: ViewArgs,

        /// Print the page as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the account at ROW of a listed page, including its password.
    Show {
        /// Row number as printed by `list`, starting at 1.
        row: usize,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Add an account (password is prompted interactively).
    Add {
        account: String,

        /// Login name; prompted if omitted.
        #[arg(long)]
        username: Option<String>,
    },

    /// Change the username and password of an existing account.
    Modify {
        account: String,

        /// Login name; prompted if omitted.
        #[arg(long)]
        username: Option<String>,
    },

    /// Delete an account from the store.
    Delete {
        account: String,

        /// Do not ask for confirmation.
        #[arg(long)]
        yes: bool,
    },
}
