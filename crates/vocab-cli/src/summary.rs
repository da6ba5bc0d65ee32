//! Table rendering for command results.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use vocab_cli::commands::Conversion;
use vocab_curate::{BatchOutcome, ReviewItem};
use vocab_map::{ConfidenceBand, SimilarLabel};
use vocab_model::{CanonicalVariable, CurationAction, QualityReport};

pub fn print_review(items: &[ReviewItem]) {
    if items.is_empty() {
        println!("No pending suggestions.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Key"),
        header_cell("Native label"),
        header_cell("Unit"),
        header_cell("Suggested"),
        header_cell("Confidence"),
        header_cell("Band"),
        header_cell("Reasons"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Right);
    for item in items {
        let suggested = match &item.canonical_label {
            Some(label) => format!("{}\n{label}", item.entry.suggested_canonical),
            None => item.entry.suggested_canonical.clone(),
        };
        table.add_row(vec![
            Cell::new(&item.key).add_attribute(Attribute::Bold),
            optional_cell(item.entry.native_label.as_deref()),
            optional_cell(item.entry.native_unit.as_deref()),
            Cell::new(suggested),
            Cell::new(format!("{:.2}", item.entry.confidence)),
            band_cell(item.band),
            Cell::new(item.entry.reasons.join(", ")),
        ]);
    }
    println!("{table}");
    for item in items.iter().filter(|item| !item.alternatives.is_empty()) {
        let alternatives: Vec<String> = item
            .alternatives
            .iter()
            .map(|alt| format!("{} ({:.2})", alt.canonical, alt.similarity))
            .collect();
        println!("  {}: also consider {}", item.key, alternatives.join(", "));
    }
    println!("{} pending suggestion(s) shown.", items.len());
}

pub fn print_action(action: &CurationAction) {
    let target = action.canonical.as_deref().unwrap_or("-");
    println!(
        "{} {}:{} -> {target} by {}",
        action.action.as_str(),
        action.dataset,
        action.native_id,
        action.curator
    );
    for (key, value) in &action.modifications {
        println!("  {key} = {value}");
    }
}

pub fn print_batch(outcome: &BatchOutcome) {
    let verb = if outcome.dry_run { "Would accept" } else { "Accepted" };
    println!(
        "{verb} {} suggestion(s) at threshold {:.2}; skipped {}, errors {}.",
        outcome.accepted, outcome.threshold, outcome.skipped, outcome.errors
    );
    for key in &outcome.keys {
        println!("  {key}");
    }
}

pub fn print_report(report: &QualityReport) {
    println!("Registry quality ({})", report.generated_at.format("%Y-%m-%d %H:%M UTC"));
    let mut table = Table::new();
    table.set_header(vec![header_cell("Metric"), header_cell("Value")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Variables"), Cell::new(report.total_variables)]);
    table.add_row(vec![
        Cell::new("URI completeness"),
        Cell::new(format!("{:.1}%", report.uri_completeness() * 100.0)),
    ]);
    table.add_row(vec![
        Cell::new("Unit completeness"),
        Cell::new(format!("{:.1}%", report.unit_completeness() * 100.0)),
    ]);
    table.add_row(vec![Cell::new("Domains"), Cell::new(report.distinct_domains())]);
    table.add_row(vec![
        Cell::new("Without domain"),
        Cell::new(report.unassigned_domain),
    ]);
    table.add_row(vec![
        Cell::new("Pending suggestions"),
        Cell::new(report.pending_suggestions),
    ]);
    table.add_row(vec![
        Cell::new("Quality score")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{:.2}", report.quality_score())).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");

    if !report.coverage_by_domain.is_empty() {
        let mut coverage = Table::new();
        coverage.set_header(vec![header_cell("Domain"), header_cell("Variables")]);
        apply_table_style(&mut coverage);
        align_column(&mut coverage, 1, CellAlignment::Right);
        for (domain, count) in &report.coverage_by_domain {
            coverage.add_row(vec![Cell::new(domain), Cell::new(count)]);
        }
        println!("{coverage}");
    }
    for recommendation in &report.recommendations {
        println!("- {recommendation}");
    }
}

pub fn print_variables(variables: &[CanonicalVariable]) {
    if variables.is_empty() {
        println!("No canonical variables.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Id"),
        header_cell("Label"),
        header_cell("Domain"),
        header_cell("Unit"),
        header_cell("Datasets"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Right);
    for variable in variables {
        table.add_row(vec![
            Cell::new(&variable.id).add_attribute(Attribute::Bold),
            Cell::new(&variable.label),
            optional_cell(variable.domain.as_deref()),
            optional_cell(variable.preferred_unit.as_deref()),
            Cell::new(variable.datasets.len()),
        ]);
    }
    println!("{table}");
}

pub fn print_similar(query: &str, matches: &[SimilarLabel]) {
    if matches.is_empty() {
        println!("No labels resemble '{query}'.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Id"),
        header_cell("Label"),
        header_cell("Similarity"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for item in matches {
        table.add_row(vec![
            Cell::new(&item.canonical),
            Cell::new(&item.label),
            Cell::new(format!("{:.3}", item.similarity)),
        ]);
    }
    println!("{table}");
}

pub fn print_conversion(conversion: &Conversion) {
    let dimension = conversion
        .dimension
        .map(|dimension| format!(" ({})", dimension.label()))
        .unwrap_or_default();
    println!(
        "{} {} = {} {}{dimension}",
        conversion.value, conversion.from, conversion.converted, conversion.to
    );
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell(value: &str) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn band_cell(band: ConfidenceBand) -> Cell {
    let color = match band {
        ConfidenceBand::VeryHigh => Color::Green,
        ConfidenceBand::High => Color::Cyan,
        ConfidenceBand::Medium => Color::Yellow,
        ConfidenceBand::Low => Color::Red,
    };
    Cell::new(band.as_str()).fg(color)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
