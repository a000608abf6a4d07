use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::ViewArgs;

use super::Target;

#[derive(Debug, Serialize)]
struct Page<'a> {
    page: usize,
    page_size: usize,
    search: Option<&'a str>,
    accounts: Vec<Row>,
}

#[derive(Debug, Serialize)]
struct Row {
    row: usize,
    account: String,
}

pub fn run(target: &Target, view: &ViewArgs, json: bool) -> Result<()> {
    let mut controller = super::open(target)?;
    super::apply_view(&mut controller, view)?;

    let accounts: Vec<Row> = controller
        .visible()?
        .into_iter()
        .enumerate()
        .map(|(i, account)| Row { row: i + 1, account })
        .collect();

    if json {
        let page = Page {
            page: controller.page(),
            page_size: controller.view().page_size(),
            search: view.search.as_deref(),
            accounts,
        };
        let out = serde_json::to_string_pretty(&page).context("Failed to encode page")?;
        println!("{}", out);
        return Ok(());
    }

    if accounts.is_empty() {
        if controller.page() > 1 {
            println!("No accounts on page {}.", controller.page());
        } else if view.search.is_some() {
            println!("No accounts match.");
        } else {
            println!("No accounts stored. Add one with: hkpass add <account>");
        }
    } else {
        for row in &accounts {
            println!("{:>4}  {}", row.row, row.account);
        }
        println!("-- page {} --", controller.page());
    }

    Ok(())
}
