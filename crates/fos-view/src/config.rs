//! Stage Configuration

use crate::{ViewError, ViewResult};
use serde::Deserialize;

/// Stage configuration options
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// URL of the host document
    pub document_url: String,

    /// Attribute carrying role markers for `get_by_role`
    pub role_attribute: String,
}

impl StageConfig {
    /// Load from a JSON object; missing fields keep their defaults
    pub fn from_json(json: &str) -> ViewResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ViewError::Config(e.to_string()))?;
        if config.role_attribute.trim().is_empty() {
            return Err(ViewError::Config("role_attribute must not be empty".to_string()));
        }
        Ok(config)
    }
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            document_url: "about:blank".to_string(),
            role_attribute: "role".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = StageConfig::from_json(r#"{ "role_attribute": "data-role" }"#).unwrap();
        assert_eq!(config.role_attribute, "data-role");
        assert_eq!(config.document_url, "about:blank");
    }

    #[test]
    fn test_rejects_empty_role_attribute() {
        assert!(StageConfig::from_json(r#"{ "role_attribute": " " }"#).is_err());
        assert!(StageConfig::from_json("not json").is_err());
    }
}
