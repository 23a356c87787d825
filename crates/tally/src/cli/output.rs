//! Terminal rendering for list-style commands.

use chrono::{DateTime, Utc};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    println!("{}", build_table(headers, rows));
}

fn build_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|name| Cell::new(name).fg(Color::Cyan)));
    for row in rows {
        table.add_row(row);
    }
    table
}

/// `YYYY-MM-DD HH:MM:SS UTC`
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_timestamp() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 0).unwrap();
        assert_eq!(format_timestamp(&ts), "2024-03-09 07:05:00 UTC");
    }

    #[test]
    fn test_table_contains_cells() {
        let table = build_table(
            &["Player", "Name"],
            vec![vec!["42".to_string(), "Nova".to_string()]],
        );
        let rendered = table.to_string();
        assert!(rendered.contains("Player"));
        assert!(rendered.contains("Nova"));
    }
}
