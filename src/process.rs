//! `dartdex process`: post-process a single record file.

use anyhow::{Context, Result};
use std::path::Path;

use dartdex_core::postprocess::{HeaderMode, PostProcessor, ProcessedReport};

use crate::show::OutputFormat;

/// Parses and processes the record at `path`.
pub fn process_file(path: &Path, header_mode: HeaderMode) -> Result<ProcessedReport> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read record file: {}", path.display()))?;
    let raw: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse record file: {}", path.display()))?;
    Ok(PostProcessor::new(header_mode).process(&raw)?)
}

pub fn render(report: &ProcessedReport, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Markdown => report.to_markdown(),
        OutputFormat::Json => {
            let mut s = serde_json::to_string_pretty(&report.to_json())?;
            s.push('\n');
            s
        }
    })
}

pub fn run_process(
    path: &Path,
    header_mode: HeaderMode,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let report = process_file(path, header_mode)?;
    let rendered = render(&report, format)?;

    match output {
        Some(out) => {
            std::fs::write(out, rendered)
                .with_context(|| format!("Failed to write output: {}", out.display()))?;
            tracing::info!(
                sections = report.sections.len(),
                output = %out.display(),
                "wrote processed record"
            );
        }
        None => print!("{}", rendered),
    }

    Ok(())
}
