//! Output formatting for CLI

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use courseqa_e2e::{GenerationReport, PageReport};

/// Printed after every run, whatever the outcome
pub const REVIEW_NOTICE: &str = "Generated files may need manual adjustments.\n   Please review and test each file before using in production.";

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Plain text format
    Plain,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

impl TableDisplay for PageReport {
    fn headers() -> Vec<&'static str> {
        vec!["Key", "Name", "Matched", "Fallback", "Placeholders", "Path"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.key.clone(),
            self.name.clone(),
            self.matched.to_string(),
            self.fallback.to_string(),
            self.placeholders.to_string(),
            self.path.display().to_string(),
        ]
    }
}

/// Render the run summary
pub fn render_report(report: &GenerationReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);

            table.set_header(PageReport::headers());
            for page in &report.pages {
                table.add_row(page.row());
            }

            format!("{table}\n{}", summary_lines(report))
        }
        OutputFormat::Plain => {
            let mut out = String::new();
            for page in &report.pages {
                for (header, value) in PageReport::headers().iter().zip(page.row()) {
                    out.push_str(&format!("{}: {}\n", header, value));
                }
                out.push_str("---\n");
            }
            out.push_str(&summary_lines(report));
            out
        }
    }
}

fn summary_lines(report: &GenerationReport) -> String {
    let verb = if report.dry_run { "Rendered" } else { "Generated" };
    let mut out = format!("{} {} page test files", verb, report.total());
    let degraded = report.degraded_pages();
    if degraded > 0 {
        out.push_str(&format!(" ({} need manual integration)", degraded));
    }
    out.push('\n');

    if !report.warnings.is_empty() {
        out.push_str(&format!("\n{} warning(s):\n", report.warnings.len()));
        for warning in &report.warnings {
            out.push_str(&format!("  - {}\n", warning));
        }
    }
    out
}

/// Print the run summary followed by the review notice
pub fn print_report(report: &GenerationReport, format: OutputFormat) {
    println!("{}", render_report(report, format));
    match format {
        OutputFormat::Json => eprintln!("⚠️  {}", REVIEW_NOTICE),
        _ => println!("{}  {}", "⚠️".yellow(), REVIEW_NOTICE),
    }
}
