use serde::{Deserialize, Serialize};

pub const DEFAULT_STORAGE_KEY: &str = "control-dashboard.web.active-tab.v1";
pub const DEFAULT_QUERY_PARAM: &str = "tab";
pub const DEFAULT_CONTROL_ATTRIBUTE: &str = "data-view-tab";
pub const DEFAULT_PANEL_ATTRIBUTE: &str = "data-view-panel";
pub const DEFAULT_ACTIVE_CLASS: &str = "is-active";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavConfigError {
    #[error("navigation config is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("navigation config field `{0}` must not be empty")]
    EmptyField(&'static str),
    #[error("navigation config field `{field}` is not a data attribute name: {value}")]
    InvalidAttribute { field: &'static str, value: String },
}

/// Fixed identifiers shared by the whole dashboard session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavConfig {
    pub storage_key: String,
    pub query_param: String,
    pub control_attribute: String,
    pub panel_attribute: String,
    pub active_class: String,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            query_param: DEFAULT_QUERY_PARAM.to_string(),
            control_attribute: DEFAULT_CONTROL_ATTRIBUTE.to_string(),
            panel_attribute: DEFAULT_PANEL_ATTRIBUTE.to_string(),
            active_class: DEFAULT_ACTIVE_CLASS.to_string(),
        }
    }
}

impl NavConfig {
    /// Parse a partial JSON override; missing fields keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self, NavConfigError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_json::from_str(trimmed)
            .map_err(|error| NavConfigError::InvalidJson(error.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), NavConfigError> {
        let fields = [
            ("storage_key", &self.storage_key),
            ("query_param", &self.query_param),
            ("control_attribute", &self.control_attribute),
            ("panel_attribute", &self.panel_attribute),
            ("active_class", &self.active_class),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(NavConfigError::EmptyField(field));
            }
        }
        for (field, value) in [
            ("control_attribute", &self.control_attribute),
            ("panel_attribute", &self.panel_attribute),
        ] {
            if !is_data_attribute(value) {
                return Err(NavConfigError::InvalidAttribute {
                    field,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }
}

fn is_data_attribute(name: &str) -> bool {
    let Some(suffix) = name.strip_prefix("data-") else {
        return false;
    };
    !suffix.is_empty()
        && suffix
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
}
