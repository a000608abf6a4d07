use anyhow::{bail, Result};
use secrecy::ExposeSecret;

use crate::cli::ViewArgs;

use super::Target;

pub fn run(target: &Target, row: usize, view: &ViewArgs) -> Result<()> {
    if row == 0 {
        bail!("Rows start at 1.");
    }
    let mut controller = super::open(target)?;
    super::apply_view(&mut controller, view)?;

    let record = controller.select_record(row - 1)?;
    println!("Account:  {}", record.account);
    println!("Username: {}", record.username);
    println!("Password: {}", record.password.expose_secret());
    Ok(())
}
