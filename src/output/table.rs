//! Table output formatting

use tabled::{
    Table, Tabled,
    settings::{
        Alignment, Modify, Style,
        object::{Columns, Rows},
    },
};

/// Headers whose cells are counts and read better right-aligned
const NUMERIC_HEADERS: &[&str] = &[
    "CHANNELS", "CONSUMERS", "PREFETCH", "UNACKED", "READY", "TOTAL", "ENTRIES", "VALID",
    "EXPIRED", "HITS", "MISSES", "HIT RATE",
];

/// Format rows as a rounded table, counts right-aligned
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    if data.is_empty() {
        return "No results found.".to_string();
    }

    let mut table = Table::new(data);
    table.with(Style::rounded());

    for (index, header) in T::headers().iter().enumerate() {
        if NUMERIC_HEADERS.contains(&header.as_ref()) {
            table.with(Modify::new(Columns::one(index)).with(Alignment::right()));
        }
    }
    // Header row last so it stays centered over numeric columns too
    table.with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}
