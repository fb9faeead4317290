//! `dartdex reports`: every configured period with a matching record.

use anyhow::{Context, Result};

use dartdex_core::Period;

use crate::config::Config;
use crate::lookup::DisclosureLookup;

pub fn run_reports(config: &Config, query: &str, target: Option<&str>) -> Result<()> {
    let target = target
        .map(|t| t.parse::<Period>())
        .transpose()
        .context("invalid --target period")?;

    let lookup = DisclosureLookup::from_config(config);
    let listing = lookup.quarterly_reports(query, target)?;

    println!("{:<8} {:<20} {:<32} TARGET", "PERIOD", "COMPANY", "FILE");
    for r in &listing.reports {
        println!(
            "{:<8} {:<20} {:<32} {}",
            r.period.to_string(),
            r.company_name,
            r.file_name,
            if r.is_target { "*" } else { "" }
        );
    }
    println!();
    println!("{} report(s) for '{}'", listing.total_count, listing.company_name);

    if let Some(t) = target {
        if listing.target().is_none() {
            println!("target period {} has no matching record", t);
        }
    }

    Ok(())
}
