//! Indicator detection command

use std::io::Read;
use std::path::Path;

use iocscout::detect::{self, DetectedIndicator, IndicatorType};
use iocscout::error::Result;
use log::debug;
use tabled::Tabled;

use crate::cli::{CommandContext, OutputFormat};
use crate::output::{json, pretty, table};

#[derive(Tabled)]
struct IndicatorRow {
    #[tabled(rename = "TYPE")]
    kind: String,
    #[tabled(rename = "VALUE")]
    value: String,
    #[tabled(rename = "START")]
    start: usize,
    #[tabled(rename = "END")]
    end: usize,
}

impl From<&DetectedIndicator> for IndicatorRow {
    fn from(indicator: &DetectedIndicator) -> Self {
        Self {
            kind: indicator.indicator_type.to_string(),
            value: indicator.value.clone(),
            start: indicator.position.start,
            end: indicator.position.end,
        }
    }
}

/// Scan text from the argument, a file or stdin and print the detections
pub fn run(
    ctx: &CommandContext,
    text: Option<&str>,
    file: Option<&Path>,
    types: &[IndicatorType],
) -> Result<()> {
    let input = read_input(text, file)?;
    let wanted = if types.is_empty() {
        &IndicatorType::PRECEDENCE[..]
    } else {
        types
    };

    let found = detect::detect_types(&input, wanted);
    debug!("Scanned {} bytes, {} indicators", input.len(), found.len());

    println!("{}", render(&found, ctx.format)?);
    Ok(())
}

fn read_input(text: Option<&str>, file: Option<&Path>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text.to_string());
    }
    if let Some(path) = file {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn render(found: &[DetectedIndicator], format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => json::format_json_list(found)?,
        OutputFormat::Table => {
            let rows: Vec<IndicatorRow> = found.iter().map(IndicatorRow::from).collect();
            table::format_table(&rows, "No indicators found.")
        }
        OutputFormat::Pretty => pretty::format_indicators(found),
    })
}
