pub mod add;
pub mod delete;
pub mod init;
pub mod list;
pub mod modify;
pub mod show;

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use secrecy::SecretString;

use hkpass::{StoreController, StoreError};

use crate::cli::ViewArgs;

/// Where the commands find the store and how they page it.
#[derive(Debug, Clone)]
pub struct Target {
    pub store: PathBuf,
    pub config_file: PathBuf,
    pub page_size: usize,
}

pub fn prompt_store_password() -> Result<SecretString> {
    let password =
        rpassword::prompt_password("Store password: ").context("Failed to read store password")?;
    Ok(SecretString::new(password))
}

/// Prompt for the store password and open the target store.
pub fn open(target: &Target) -> Result<StoreController> {
    if !target.store.exists() {
        bail!(
            "No password store at {}. Create one with: hkpass init",
            target.store.display()
        );
    }
    let password = prompt_store_password()?;
    let mut controller = StoreController::new().with_page_size(target.page_size);
    controller
        .open_store(&target.store, &password)
        .with_context(|| format!("Failed to open {}", target.store.display()))?;
    Ok(controller)
}

/// Apply `--search` then `--page`.
pub fn apply_view(controller: &mut StoreController, view: &ViewArgs) -> Result<()> {
    if let Some(text) = &view.search {
        controller.search(text)?;
    }
    controller.go_to_page(view.page);
    Ok(())
}

/// Turn the outcome of a change into a CLI error, calling out the cases where
/// the file and the account list may no longer agree.
pub fn finish_change(result: Result<(), StoreError>) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(e @ StoreError::CommitFailed { .. }) => {
            Err(anyhow::Error::new(e).context("Warning: the store file was NOT updated"))
        }
        Err(e @ StoreError::CacheStale(_)) => {
            Err(anyhow::Error::new(e).context("Warning: the store file WAS updated"))
        }
        Err(e) => Err(e.into()),
    }
}

pub fn prompt_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    std::io::stdout().flush().context("Failed to flush stdout")?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub fn username_or_prompt(given: Option<String>) -> Result<String> {
    let username = match given {
        Some(username) => username,
        None => prompt_line("Username: ")?,
    };
    if username.is_empty() {
        bail!("Username must not be empty.");
    }
    Ok(username)
}

/// Prompt twice for an account password.
pub fn prompt_account_password(account: &str) -> Result<SecretString> {
    let password = rpassword::prompt_password(format!("Password for '{}': ", account))
        .context("Failed to read password")?;
    let confirm = rpassword::prompt_password(format!("Confirm password for '{}': ", account))
        .context("Failed to read password confirmation")?;

    if password != confirm {
        bail!("Passwords do not match.");
    }
    if password.is_empty() {
        bail!("Password must not be empty.");
    }
    Ok(SecretString::new(password))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hkpass::ErrorCode;

    #[test]
    fn test_divergent_errors_are_called_out() {
        let commit = finish_change(Err(StoreError::CommitFailed {
            shadow: PathBuf::from("/tmp/p.hkpswd.new"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        }))
        .unwrap_err();
        assert!(commit.to_string().contains("NOT updated"));
        assert!(format!("{:#}", commit).contains("/tmp/p.hkpswd.new"));

        let stale = finish_change(Err(StoreError::CacheStale(None))).unwrap_err();
        assert!(stale.to_string().contains("WAS updated"));
    }

    #[test]
    fn test_ordinary_errors_pass_through() {
        let err = finish_change(Err(StoreError::Primitive(ErrorCode::DUPLICATE_ACCOUNT))).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::Primitive(ErrorCode::DUPLICATE_ACCOUNT))
        ));
        assert!(finish_change(Ok(())).is_ok());
    }
}
