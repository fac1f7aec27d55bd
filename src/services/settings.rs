use crate::constants::{api, network, pagination};
use crate::errors::ToolError;
use crate::utils::paths::{env_value, resolve_artifacts_root};
use std::path::PathBuf;

/// Process-wide defaults. Task inputs may override `base_url` and `max_pages`
/// per invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub api_token: Option<String>,
    pub timeout_ms: u64,
    pub max_pages: usize,
    pub artifacts_root: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: api::DEFAULT_BASE_URL.to_string(),
            api_token: None,
            timeout_ms: network::TIMEOUT_API_REQUEST_MS,
            max_pages: pagination::MAX_PAGES,
            artifacts_root: resolve_artifacts_root(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ToolError> {
        let mut settings = Self::default();
        if let Some(base_url) = env_value("TODOIST_BASE_URL") {
            settings.base_url = base_url;
        }
        settings.api_token = env_value("TODOIST_API_TOKEN");
        if let Some(raw) = env_value("TODOIST_TIMEOUT_MS") {
            settings.timeout_ms = parse_positive("TODOIST_TIMEOUT_MS", &raw)?;
        }
        if let Some(raw) = env_value("TODOIST_MAX_PAGES") {
            settings.max_pages = parse_positive("TODOIST_MAX_PAGES", &raw)? as usize;
        }
        Ok(settings)
    }
}

fn parse_positive(key: &str, raw: &str) -> Result<u64, ToolError> {
    raw.parse::<u64>()
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| {
            ToolError::invalid_params(format!("{} must be a positive integer", key))
                .with_details(serde_json::json!({ "value": raw }))
        })
}
