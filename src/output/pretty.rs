//! Human-oriented colored output

use colored::Colorize;
use iocscout::detect::{self, DetectedIndicator};

/// Detections grouped under a bold per-type heading
pub fn format_indicators(indicators: &[DetectedIndicator]) -> String {
    if indicators.is_empty() {
        return "No indicators found.".to_string();
    }

    let mut out = String::new();
    for (indicator_type, group) in detect::group_by_type(indicators) {
        out.push_str(&format!(
            "{} ({})\n",
            indicator_type.label().bold(),
            group.len()
        ));
        for indicator in group {
            out.push_str(&format!(
                "  {}  {}\n",
                indicator.value.cyan(),
                format!(
                    "[{}..{}]",
                    indicator.position.start, indicator.position.end
                )
                .dimmed()
            ));
        }
    }
    out.push_str(&format!(
        "\n{} indicator(s) found",
        indicators.len().to_string().bold()
    ));
    out
}

/// Aligned `label: value` lines under a heading
pub fn format_fields(title: &str, fields: &[(&str, String)]) -> String {
    let width = fields.iter().map(|(name, _)| name.len()).max().unwrap_or(0) + 1;
    let mut out = format!("{}\n{}\n", title.bold(), "─".repeat(40));
    for (name, value) in fields {
        out.push_str(&format!("{:<width$} {}\n", format!("{}:", name), value));
    }
    out.trim_end().to_string()
}
