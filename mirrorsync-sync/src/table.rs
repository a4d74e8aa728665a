//! Key/Value rendering of a mirror record for the log.

use tabled::{settings::Style, Table, Tabled};

use mirrorsync_core::MirrorRecord;

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Key")]
    key: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

/// One row per field, `Name` first.
pub fn mirror_table(record: &MirrorRecord) -> String {
    let rows: Vec<FieldRow> = record
        .rows()
        .into_iter()
        .map(|(key, value)| FieldRow { key, value })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}
