use anyhow::{bail, Result};

use hkpass::Record;

use super::Target;

pub fn run(target: &Target, account: &str, username: Option<String>) -> Result<()> {
    if account.is_empty() {
        bail!("Account name must not be empty.");
    }
    let mut controller = super::open(target)?;
    if controller.header().and_then(|h| h.position_of(account)).is_some() {
        bail!("Account '{}' already exists. Use: hkpass modify {}", account, account);
    }

    let username = super::username_or_prompt(username)?;
    let password = super::prompt_account_password(account)?;
    super::finish_change(controller.add_record(&Record::new(account, username, password)))?;

    println!("Account '{}' added.", account);
    Ok(())
}
