use itertools::Itertools;
use serde_json::Value;

use crate::controller::{BomReport, Diagnosis};
use crate::dispatch::{CategoryContentBundle, Highlight};
use crate::envelope::Record;
use crate::projection::ProjectedTable;

pub const UPLOAD_PROMPT: &str = "Upload a Bill of Material to fetch your inventory";
pub const BOM_LOADING: &str = "Processing your file. This may take up to 5 minutes...";
pub const IMAGE_LOADING: &str = "Analyzing your image...";

const ID_WIDTH: usize = 3;

pub fn table(table: &ProjectedTable) -> String {
    if table.is_empty() {
        return UPLOAD_PROMPT.to_string();
    }

    let header = std::iter::once(format!("{:>w$}", "#", w = ID_WIDTH))
        .chain(
            table
                .columns
                .iter()
                .map(|c| format!("{:<w$}", truncate(&c.label, c.width), w = c.width)),
        )
        .join(" | ");
    let rule = "-".repeat(header.chars().count());

    let mut out = vec![header, rule];
    for row in &table.rows {
        let line = std::iter::once(format!("{:>w$}", row.id, w = ID_WIDTH))
            .chain(
                table
                    .columns
                    .iter()
                    .map(|c| format!("{:<w$}", truncate(&c.render(row), c.width), w = c.width)),
            )
            .join(" | ");
        out.push(line.trim_end().to_string());
    }
    out.push(format!("\n{} rows", table.rows.len()));
    out.join("\n")
}

/// `totalCarbonFootprint: 12.5` → `Total Carbon Footprint: 12.5`
pub fn summary(summary: &Record) -> String {
    summary
        .iter()
        .map(|(k, v)| {
            let shown = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!("{}: {}", humanize(k), shown)
        })
        .join("\n")
}

pub fn report(report: &BomReport) -> String {
    let mut out = table(&report.table);
    if !report.table.is_empty() && !report.summary.is_empty() {
        out.push_str("\n\n");
        out.push_str(&summary(&report.summary));
    }
    out
}

pub fn diagnosis(d: &Diagnosis, preview: Option<&str>) -> String {
    let cat = d.prediction.category;
    let mut out = vec![
        format!("This is a {}", d.prediction.raw_label),
        format!(
            "It should go into a {} coloured trash bin.",
            paint(cat.label(), cat.highlight())
        ),
    ];
    if let Some(url) = preview {
        out.push(format!("Preview: {}", url));
    }
    out.push(String::new());
    out.push(guidance(d.guidance));
    out.join("\n")
}

pub fn guidance(bundle: &CategoryContentBundle) -> String {
    if bundle.is_placeholder() {
        return "No guidance available for this item.".to_string();
    }
    let mut out = vec![
        section("Purpose", bundle.purpose),
        list("Handling", bundle.handling),
        section("Disposal", bundle.disposal),
        section("Recycled or Not", bundle.recyclability),
        list("Don'ts", bundle.prohibitions),
        section("Environmental Impact", bundle.environmental_impact),
    ];
    if let Some(note) = bundle.compliance_note {
        out.push(section("Key Compliance Note", note));
    }
    out.join("\n\n")
}

fn section(title: &str, body: &str) -> String {
    format!("{}\n  {}", title, body)
}

fn list(title: &str, items: &[&str]) -> String {
    std::iter::once(title.to_string())
        .chain(items.iter().map(|i| format!("  - {}", i)))
        .join("\n")
}

fn paint(text: &str, highlight: Highlight) -> String {
    let code = match highlight {
        Highlight::Colour("red") => "31",
        Highlight::Colour("blue") => "34",
        Highlight::Colour("grey") => "90",
        Highlight::Colour(_) | Highlight::Inherit => return text.to_string(),
    };
    format!("\x1b[{}m{}\x1b[0m", code, text)
}

fn humanize(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, ch) in key.chars().enumerate() {
        if i == 0 {
            out.extend(ch.to_uppercase());
        } else if ch.is_uppercase() {
            out.push(' ');
            out.push(ch);
        } else if ch == '_' {
            out.push(' ');
        } else {
            out.push(ch);
        }
    }
    out
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
