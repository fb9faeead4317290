//! `dartdex resolve` and `dartdex show`.
//!
//! Both go through [`DisclosureLookup`]; `resolve` stops after choosing a
//! file, `show` loads and renders it.

use anyhow::Result;
use clap::ValueEnum;
use serde_json::json;

use dartdex_core::models::CatalogEntry;
use dartdex_core::resolve::Resolution;
use dartdex_core::{LookupError, Period};

use crate::config::Config;
use crate::lookup::{DisclosureLookup, LoadedDisclosure};

/// Rendering of a processed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Markdown,
    Json,
}

/// Prints which file a query resolves to, and how.
pub fn run_resolve(config: &Config, query: &str, year: i32, quarter: u8) -> Result<()> {
    let lookup = DisclosureLookup::from_config(config);
    let period = Period::new(year, quarter)?;
    let resolution = lookup.resolve(query, year, quarter)?;

    match &resolution {
        Resolution::NotFound { query } => {
            let suggestions = lookup.suggestions(query, period, 3);
            if !suggestions.is_empty() {
                let names: Vec<&str> = suggestions.iter().map(|c| c.company_name.as_str()).collect();
                eprintln!("Did you mean: {}?", names.join(", "));
            }
            return Err(LookupError::not_found(query.clone(), Some(period)).into());
        }
        Resolution::Exact { record } => print_match(query, period, "exact", record),
        Resolution::Partial { record, .. } => print_match(query, period, "partial", record),
        Resolution::Fuzzy {
            record,
            score,
            alternatives,
        } => {
            print_match(query, period, "fuzzy", record);
            println!("{:<10} {:.3}", "SCORE", score);
            if !alternatives.is_empty() {
                println!("ALTERNATIVES");
                for alt in alternatives {
                    println!("  {:.3}  {} ({})", alt.score, alt.company_name, alt.file_name);
                }
            }
        }
    }

    Ok(())
}

fn print_match(query: &str, period: Period, tier: &str, entry: &CatalogEntry) {
    println!("{:<10} {}", "QUERY", query);
    println!("{:<10} {}", "PERIOD", period);
    println!("{:<10} {}", "TIER", tier);
    println!("{:<10} {}", "MATCH", entry.company_name);
    println!("{:<10} {}", "FILE", entry.file_name);
}

/// Resolves, loads and prints a processed record.
///
/// With `direct`, only exact and substring matches are accepted.
pub fn run_show(
    config: &Config,
    query: &str,
    year: i32,
    quarter: u8,
    format: OutputFormat,
    direct: bool,
) -> Result<()> {
    let lookup = DisclosureLookup::from_config(config);

    let resolution = if direct {
        lookup.company_data(query, year, quarter)?
    } else {
        lookup.find_and_load(query, year, quarter)?
    };
    if let Resolution::Fuzzy { score, .. } = &resolution {
        tracing::warn!(query, score, "showing closest fuzzy match");
    }
    let tier = resolution
        .tier()
        .map(|t| t.to_string())
        .unwrap_or_default();
    let period = Period::new(year, quarter)?;
    let loaded = resolution.into_found(Some(period))?;

    match format {
        OutputFormat::Markdown => print!("{}", loaded.processed.to_markdown()),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&show_json(&tier, &loaded))?);
        }
    }

    Ok(())
}

fn show_json(tier: &str, loaded: &LoadedDisclosure) -> serde_json::Value {
    json!({
        "period": loaded.period.to_string(),
        "tier": tier,
        "company_name": loaded.company_name(),
        "file_name": loaded.entry.file_name,
        "report": loaded.processed.to_json(),
    })
}
