use anyhow::Result;

use super::Target;

pub fn run(target: &Target, account: &str, yes: bool) -> Result<()> {
    let mut controller = super::open(target)?;
    if controller.header().and_then(|h| h.position_of(account)).is_none() {
        println!("Account '{}' not found.", account);
        return Ok(());
    }

    if !yes {
        let answer = super::prompt_line(&format!("Delete '{}'? [y/N]: ", account))?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            println!("Skipping.");
            return Ok(());
        }
    }

    super::finish_change(controller.delete_record(account))?;
    println!("Account '{}' deleted.", account);
    Ok(())
}
