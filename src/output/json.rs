use super::ResourceTable;

pub struct JsonFormatter;

impl JsonFormatter {
    pub fn format(result: &ResourceTable) -> String {
        serde_json::to_string_pretty(&result.resources).unwrap_or_else(|_| "[]".to_string())
    }
}
