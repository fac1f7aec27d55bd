use crate::constants::priority;
use crate::errors::ToolError;
use serde_json::Value;

/// Coerces rendered input values into the typed shapes tasks need. Every
/// failure is a configuration error.
#[derive(Clone, Default)]
pub struct Validation;

impl Validation {
    pub fn new() -> Self {
        Self
    }

    /// Null, blank strings and absent values all mean "omit this parameter".
    /// Non-blank text is returned as given, surrounding whitespace included.
    pub fn ensure_optional_string(
        &self,
        value: Option<&Value>,
        label: &str,
    ) -> Result<Option<String>, ToolError> {
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
            Some(Value::String(text)) => Ok(Some(text.clone())),
            Some(Value::Number(num)) => Ok(Some(num.to_string())),
            Some(Value::Bool(flag)) => Ok(Some(flag.to_string())),
            Some(_) => Err(ToolError::invalid_params(format!(
                "{} must be a string",
                label
            ))),
        }
    }

    pub fn ensure_string(&self, value: Option<&Value>, label: &str) -> Result<String, ToolError> {
        self.ensure_optional_string(value, label)?.ok_or_else(|| {
            ToolError::invalid_params(format!("{} is required", label))
                .with_hint(format!("Provide args.{} as a non-empty string.", label))
        })
    }

    pub fn ensure_optional_int(
        &self,
        value: Option<&Value>,
        label: &str,
    ) -> Result<Option<i64>, ToolError> {
        let parsed = match value {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Number(num)) => num.as_i64(),
            Some(Value::String(text)) if text.trim().is_empty() => return Ok(None),
            Some(Value::String(text)) => text.trim().parse::<i64>().ok(),
            Some(_) => None,
        };
        parsed.map(Some).ok_or_else(|| {
            ToolError::invalid_params(format!("{} must be an integer", label))
                .with_details(serde_json::json!({ "value": value }))
        })
    }

    pub fn ensure_optional_positive(
        &self,
        value: Option<&Value>,
        label: &str,
    ) -> Result<Option<u32>, ToolError> {
        match self.ensure_optional_int(value, label)? {
            None => Ok(None),
            Some(n) if n > 0 && n <= u32::MAX as i64 => Ok(Some(n as u32)),
            Some(n) => Err(ToolError::invalid_params(format!(
                "{} must be a positive integer",
                label
            ))
            .with_details(serde_json::json!({ "value": n }))),
        }
    }

    pub fn ensure_optional_priority(
        &self,
        value: Option<&Value>,
    ) -> Result<Option<i64>, ToolError> {
        match self.ensure_optional_int(value, "priority")? {
            Some(p) if !(priority::MIN..=priority::MAX).contains(&p) => Err(
                ToolError::invalid_params(format!(
                    "priority must be between {} (normal) and {} (urgent)",
                    priority::MIN,
                    priority::MAX
                ))
                .with_details(serde_json::json!({ "value": p })),
            ),
            other => Ok(other),
        }
    }

    pub fn ensure_identifier(&self, value: Option<&Value>, label: &str) -> Result<String, ToolError> {
        let text = self.ensure_string(value, label)?.trim().to_string();
        if text.contains('\0') || text.contains('/') {
            return Err(ToolError::invalid_params(format!(
                "{} must not contain '/' or null bytes",
                label
            )));
        }
        Ok(text)
    }
}
