//! Plain-text rendering of dashboard sections

use flight_core::insights::{InsightReport, InsightSection};
use flight_core::format_currency;
use std::fmt::Write;

const BAR_WIDTH: usize = 30;

pub fn render_report(report: &InsightReport, currency_symbol: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Key Insights About Flight Prices");
    let _ = writeln!(out, "({} flights with a known price)", report.total_rows);

    for (i, section) in report.sections.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}. {}", i + 1, section.title);
        out.push_str(&render_section(section, currency_symbol));
    }
    out
}

pub fn render_section(section: &InsightSection, currency_symbol: &str) -> String {
    let mut out = String::new();

    if let Some(warning) = &section.warning {
        let _ = writeln!(out, "  ⚠ {}", warning);
        return out;
    }

    let max = section
        .groups
        .iter()
        .map(|g| g.mean_price)
        .fold(0.0_f64, f64::max);
    let key_width = section
        .groups
        .iter()
        .map(|g| g.key.chars().count())
        .max()
        .unwrap_or(0);

    for group in &section.groups {
        let filled = if max > 0.0 {
            ((group.mean_price / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let _ = writeln!(
            out,
            "  {:<key_width$}  {:<bar_width$}  {} (n={})",
            group.key,
            "█".repeat(filled),
            format_currency(group.mean_price, currency_symbol),
            group.count,
            key_width = key_width,
            bar_width = BAR_WIDTH,
        );
    }
    out
}

/// Numbered list of selectable values for one prediction input
pub fn render_choices(label: &str, values: &[String]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}:", label);
    for value in values {
        let _ = writeln!(out, "  - {}", value);
    }
    out
}
