mod csv;
mod json;
mod table;
mod yaml;

pub use csv::CsvFormatter;
pub use json::JsonFormatter;
pub use table::TableFormatter;
pub use yaml::YamlFormatter;

use crate::aggregator::ResourceSummary;
use crate::cli::OutputFormat;

/// Column headers, in display order
pub const COLUMNS: &[&str] = &["NAME", "KIND", "READY", "STATUS", "CONNECTION DETAILS"];

/// Result of a `get` call, ready for printing
#[derive(Debug, Clone)]
pub struct ResourceTable {
    pub resources: Vec<ResourceSummary>,
}

impl ResourceTable {
    pub fn new(resources: Vec<ResourceSummary>) -> Self {
        Self { resources }
    }

    pub fn format(&self, format: &OutputFormat, no_headers: bool) -> String {
        match format {
            OutputFormat::Table => TableFormatter::format(self, no_headers),
            OutputFormat::Json => JsonFormatter::format(self),
            OutputFormat::Csv => CsvFormatter::format(self, no_headers),
            OutputFormat::Yaml => YamlFormatter::format(self),
        }
    }

    /// Rows as display strings, one per resource
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.resources
            .iter()
            .map(|r| {
                vec![
                    r.name.clone(),
                    r.kind.clone(),
                    r.ready.to_string(),
                    r.status_message.clone(),
                    r.connection_details.clone(),
                ]
            })
            .collect()
    }
}
