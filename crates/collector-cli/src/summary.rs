use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use collector_model::TimeWindow;
use collector_transform::{Aggregation, Plugin, PluginChain};

use crate::commands::RunResult;

/// Printed on stderr: stdout may be carrying the documents.
pub fn print_run_summary(result: &RunResult) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Field"), header_cell("Value")]);
    apply_summary_table_style(&mut table);
    table.add_row(vec![
        Cell::new("Data group"),
        optional_cell(result.data_group.as_deref()),
    ]);
    table.add_row(vec![
        Cell::new("Data type"),
        optional_cell(result.data_type.as_deref()),
    ]);
    table.add_row(vec![Cell::new("Period"), Cell::new(result.period)]);
    if let (Some(first), Some(last)) = (result.windows.first(), result.windows.last()) {
        table.add_row(vec![
            Cell::new("Windows"),
            Cell::new(format!(
                "{} ({} to {})",
                result.windows.len(),
                first.start,
                last.end
            )),
        ]);
    }
    table.add_row(vec![Cell::new("Records"), Cell::new(result.records)]);
    table.add_row(vec![
        Cell::new("Documents"),
        Cell::new(result.push.documents).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("Chunks"),
        Cell::new(format!(
            "{} (size {})",
            result.push.chunks, result.chunk_size
        )),
    ]);
    table.add_row(vec![
        Cell::new("Emptied data set"),
        flag_cell(result.push.emptied),
    ]);
    table.add_row(vec![
        Cell::new("Output"),
        match &result.output {
            Some(path) => Cell::new(path.display()),
            None => dim_cell("stdout"),
        },
    ]);
    eprintln!("{table}");
}

pub fn print_windows(windows: &[TimeWindow]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Start"),
        header_cell("End"),
        header_cell("Days"),
        header_cell("Period"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for (index, window) in windows.iter().enumerate() {
        table.add_row(vec![
            dim_cell(index + 1),
            Cell::new(window.start),
            Cell::new(window.end),
            Cell::new(window.days()),
            Cell::new(window.period),
        ]);
    }
    println!("{table}");
}

pub fn print_plugins(chain: &PluginChain) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Plugin"),
        header_cell("Arguments"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (index, plugin) in chain.plugins().iter().enumerate() {
        table.add_row(vec![
            dim_cell(index + 1),
            Cell::new(plugin.name())
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
            Cell::new(plugin_arguments(plugin)),
        ]);
    }
    println!("{table}");
}

fn plugin_arguments(plugin: &Plugin) -> String {
    match plugin {
        Plugin::RemoveKey { keys } => keys.join(", "),
        Plugin::ComputeIdFrom { fields } => fields.join(", "),
        Plugin::ComputeRank { field } => field.clone(),
        Plugin::AggregateKey { aggregations } => aggregations
            .iter()
            .map(|aggregation| match aggregation {
                Aggregation::Sum { key } => format!("sum({key})"),
                Aggregation::Rate {
                    rate_key,
                    count_key,
                } => format!("rate({rate_key} by {count_key})"),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Plugin::Comment => String::new(),
    }
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn flag_cell(value: bool) -> Cell {
    if value {
        Cell::new("yes").fg(Color::Yellow)
    } else {
        dim_cell("no")
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
