use std::borrow::Cow;

use comfy_table::{Table, presets::ASCII_BORDERS_ONLY_CONDENSED};

use super::{COLUMNS, ResourceTable};

/// Maximum width for the connection details column
const MAX_DETAILS_WIDTH: usize = 60;

/// Index of the connection details column
const DETAILS_COLUMN: usize = 4;

/// Truncate a string to max_len chars, adding "..." if truncated
fn truncate_value(s: &str, max_len: usize) -> Cow<'_, str> {
    if s.chars().count() <= max_len {
        Cow::Borrowed(s)
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        Cow::Owned(format!("{}...", truncated))
    }
}

pub struct TableFormatter;

impl TableFormatter {
    pub fn format(result: &ResourceTable, no_headers: bool) -> String {
        if result.resources.is_empty() {
            return "(0 resources)".to_string();
        }

        let mut table = Table::new();
        table.load_preset(ASCII_BORDERS_ONLY_CONDENSED);

        if !no_headers {
            table.set_header(COLUMNS);
        }

        for row in result.rows() {
            let cells: Vec<Cow<'_, str>> = row
                .iter()
                .enumerate()
                .map(|(idx, val)| {
                    if idx == DETAILS_COLUMN {
                        truncate_value(val, MAX_DETAILS_WIDTH)
                    } else {
                        Cow::Borrowed(val.as_str())
                    }
                })
                .collect();
            table.add_row(cells);
        }

        let output = table.to_string();
        format!("{}\n({} resources)", output, result.resources.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::ResourceSummary;

    fn summary(name: &str, details: &str) -> ResourceSummary {
        ResourceSummary {
            name: name.to_string(),
            kind: "VsphereVMAnsible".to_string(),
            ready: true,
            status_message: "Ready".to_string(),
            connection_details: details.to_string(),
        }
    }

    #[test]
    fn test_truncate_value_short() {
        let result = truncate_value("hello", 10);
        assert_eq!(result, "hello");
        assert!(matches!(result, Cow::Borrowed(_)));
    }

    #[test]
    fn test_truncate_value_too_long() {
        let long = "this is a very long string that needs truncation";
        let result = truncate_value(long, 20);
        assert!(result.ends_with("..."));
        assert!(result.chars().count() <= 20);
        assert!(matches!(result, Cow::Owned(_)));
    }

    #[test]
    fn test_empty_table() {
        let output = TableFormatter::format(&ResourceTable::new(vec![]), false);
        assert_eq!(output, "(0 resources)");
    }

    #[test]
    fn test_table_contents() {
        let result = ResourceTable::new(vec![summary("vm-01", "10.0.0.5"), summary("vm-02", "")]);
        let output = TableFormatter::format(&result, false);
        assert!(output.contains("NAME"));
        assert!(output.contains("CONNECTION DETAILS"));
        assert!(output.contains("vm-01"));
        assert!(output.contains("10.0.0.5"));
        assert!(output.ends_with("(2 resources)"));

        let output = TableFormatter::format(&result, true);
        assert!(!output.contains("NAME"));
    }

    #[test]
    fn test_long_ip_list_truncated() {
        let ips = vec!["10.100.100.100"; 10].join(",");
        let result = ResourceTable::new(vec![summary("vm-01", &ips)]);
        let output = TableFormatter::format(&result, false);
        assert!(!output.contains(&ips));
        assert!(output.contains("..."));
    }
}
