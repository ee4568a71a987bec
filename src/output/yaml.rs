use super::ResourceTable;

pub struct YamlFormatter;

impl YamlFormatter {
    pub fn format(result: &ResourceTable) -> String {
        serde_yaml::to_string(&result.resources).unwrap_or_else(|_| "[]".to_string())
    }
}
