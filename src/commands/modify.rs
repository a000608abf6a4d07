use anyhow::{bail, Result};

use hkpass::Record;

use super::Target;

pub fn run(target: &Target, account: &str, username: Option<String>) -> Result<()> {
    let mut controller = super::open(target)?;
    if controller.header().and_then(|h| h.position_of(account)).is_none() {
        bail!("Account '{}' not found.", account);
    }

    let username = super::username_or_prompt(username)?;
    let password = super::prompt_account_password(account)?;
    super::finish_change(controller.modify_record(&Record::new(account, username, password)))?;

    println!("Account '{}' updated.", account);
    Ok(())
}
