use anyhow::Result;

use dartdex_core::sections::SECTIONS;

use crate::config::Config;
use crate::lookup::DisclosureLookup;

pub fn list_periods(config: &Config) -> Result<()> {
    let lookup = DisclosureLookup::from_config(config);

    println!("Data directory: {}", config.data.base_path.display());
    println!("{:<8} {:<8} {:<8} RECORDS", "PERIOD", "REPORT", "STATUS");
    for s in lookup.period_summaries() {
        let status = match (&s.error, s.present) {
            (Some(_), _) => "ERROR",
            (None, true) => "OK",
            (None, false) => "MISSING",
        };
        println!(
            "{:<8} {:<8} {:<8} {}",
            s.period.to_string(),
            s.period.report_code(),
            status,
            s.records
        );
    }

    // Periods on disk that the config does not scan
    let extra: Vec<String> = lookup
        .store()
        .periods()
        .into_iter()
        .filter(|p| !lookup.periods().contains(p))
        .map(|p| p.to_string())
        .collect();
    if !extra.is_empty() {
        println!();
        println!("Not configured: {}", extra.join(", "));
    }

    Ok(())
}

pub fn list_sections() -> Result<()> {
    println!("{:<8} {:<28} TITLE", "ID", "ENDPOINT");
    for s in SECTIONS.iter() {
        println!("{:<8} {:<28} {}", s.id, s.endpoint, s.title);
    }
    Ok(())
}
