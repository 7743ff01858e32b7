use serde::{Deserialize, Serialize};

/// Using directives emitted at the top of every generated unit.
pub const DEFAULT_USINGS: [&str; 3] = [
    "System",
    "System.Collections",
    "System.Collections.Generic",
];

/// Configuration options that drive C# rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CSharpConfig {
    /// Indentation string used for each nesting level.
    pub indent: String,
    /// Namespaces imported by every generated unit, in order.
    pub usings: Vec<String>,
}

impl Default for CSharpConfig {
    fn default() -> Self {
        Self {
            indent: "\t".to_string(),
            usings: DEFAULT_USINGS.iter().map(|u| u.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_tabs_and_system_usings() {
        let config = CSharpConfig::default();
        assert_eq!(config.indent, "\t");
        assert_eq!(config.usings, DEFAULT_USINGS);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: CSharpConfig = serde_json::from_str(r#"{"indent": "    "}"#).unwrap();
        assert_eq!(config.indent, "    ");
        assert_eq!(config.usings.len(), 3);
    }
}
