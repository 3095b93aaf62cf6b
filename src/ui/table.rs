use tabled::builder::Builder;
use tabled::settings::Style;

use crate::entity::{Entity, Table};
use crate::keys::EntityKey;
use crate::storage::schema::table_def;
use crate::storage::{format_value, DbStats};

/// Render rows of one entity with the table's column names as headers
pub fn rows_table<E: Entity>(rows: &[E]) -> String {
    let mut builder = Builder::default();
    builder.push_record(table_def(E::TABLE).columns().into_iter().map(String::from));
    for row in rows {
        let cells = row
            .key()
            .values()
            .iter()
            .chain(row.attributes().iter())
            .map(format_value)
            .collect::<Vec<_>>();
        builder.push_record(cells);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// Row counts per table
pub fn stats_table(stats: &DbStats) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Table".to_string(), "Rows".to_string()]);
    for (table, count) in &stats.counts {
        builder.push_record([table.to_string(), count.to_string()]);
    }
    builder.push_record(["Total".to_string(), stats.total().to_string()]);

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// Two-column table of (table, value) pairs
pub fn counts_table(header: &str, counts: &[(Table, usize)]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Table".to_string(), header.to_string()]);
    for (table, count) in counts {
        builder.push_record([table.to_string(), count.to_string()]);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}
