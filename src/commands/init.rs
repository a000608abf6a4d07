use anyhow::{bail, Context, Result};
use secrecy::SecretString;

use hkpass::config::{self, Config};
use hkpass::StoreController;

use super::Target;

pub fn run(target: &Target, force: bool) -> Result<()> {
    if target.store.exists() && !force {
        bail!(
            "A store already exists at {}. Use --force to overwrite it.",
            target.store.display()
        );
    }

    println!("Initializing password store at {}...", target.store.display());
    let password = prompt_new_password()?;

    let mut controller = StoreController::new();
    controller
        .create_store(&target.store, &password)
        .context("Failed to create encrypted store")?;

    if !target.config_file.exists() {
        let store = if target.store.is_relative() {
            config::project_root()?.join(&target.store)
        } else {
            target.store.clone()
        };
        let cfg = Config {
            store: Some(store),
            page_size: target.page_size,
        };
        config::write(&target.config_file, &cfg).context("Failed to write config")?;
        println!("Wrote {}.", target.config_file.display());
    }

    println!("Initialized.");
    println!();
    println!("  1. Add an account:   hkpass add some_site --username me");
    println!("  2. List accounts:    hkpass list");
    println!("  3. Show one:         hkpass show 1");

    Ok(())
}

pub fn prompt_new_password() -> Result<SecretString> {
    let password = rpassword::prompt_password("New store password: ")
        .context("Failed to read password")?;
    let confirm = rpassword::prompt_password("Confirm store password: ")
        .context("Failed to read password confirmation")?;

    if password != confirm {
        bail!("Passwords do not match.");
    }
    if password.is_empty() {
        bail!("Store password must not be empty.");
    }

    Ok(SecretString::new(password))
}
