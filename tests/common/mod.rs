/// Shared integration test infrastructure
///
/// - FixtureRunner: CommandRunner answering from registered output
/// - fixtures: captured tool output for complete hosts
/// - table helpers for reading the reconciled CSV
pub mod fixtures;
pub mod mock_commands;

#[allow(unused_imports)]
pub use mock_commands::FixtureRunner;

/// Data rows of a reconciled table, header excluded.
#[allow(dead_code)]
pub fn data_rows(table: &str) -> Vec<&str> {
    table.lines().skip(1).collect()
}

/// Value of column `name` in a non-verbose data row.
#[allow(dead_code)]
pub fn cell<'a>(table: &str, row: &'a str, name: &str) -> &'a str {
    let index = table
        .lines()
        .next()
        .and_then(|header| header.split(',').position(|c| c == name))
        .unwrap_or_else(|| panic!("no column {name}"));
    row.split(',').nth(index).unwrap_or_default()
}
