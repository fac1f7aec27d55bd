use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::services::validation::Validation;
use crate::utils::template::render_templates;
use serde_json::Value;

/// Per-invocation state: run id, template variables and a scoped logger.
/// Nothing here is shared between invocations.
#[derive(Clone)]
pub struct RunContext {
    run_id: String,
    variables: Value,
    logger: Logger,
    validation: Validation,
}

impl RunContext {
    pub fn new(logger: Logger, variables: Value) -> Self {
        let run_id = uuid::Uuid::new_v4().simple().to_string();
        Self {
            logger: logger.child(&run_id[..8]),
            run_id,
            variables,
            validation: Validation::new(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Resolves a declared property to its concrete value, or `None` when absent.
    pub fn render(&self, raw: Option<&Value>) -> Result<Option<Value>, ToolError> {
        match raw {
            None | Some(Value::Null) => Ok(None),
            Some(value) => render_templates(value, &self.variables).map(Some),
        }
    }

    pub fn render_string(&self, args: &Value, key: &str) -> Result<Option<String>, ToolError> {
        let rendered = self.render(args.get(key))?;
        self.validation.ensure_optional_string(rendered.as_ref(), key)
    }

    /// Like `render_string`, trimmed. For ids, queries and connection settings
    /// rather than task text.
    pub fn render_selector(&self, args: &Value, key: &str) -> Result<Option<String>, ToolError> {
        Ok(self
            .render_string(args, key)?
            .map(|text| text.trim().to_string()))
    }

    pub fn render_required_string(&self, args: &Value, key: &str) -> Result<String, ToolError> {
        let rendered = self.render(args.get(key))?;
        self.validation.ensure_string(rendered.as_ref(), key)
    }

    pub fn render_identifier(&self, args: &Value, key: &str) -> Result<String, ToolError> {
        let rendered = self.render(args.get(key))?;
        self.validation.ensure_identifier(rendered.as_ref(), key)
    }

    pub fn render_positive(&self, args: &Value, key: &str) -> Result<Option<u32>, ToolError> {
        let rendered = self.render(args.get(key))?;
        self.validation.ensure_optional_positive(rendered.as_ref(), key)
    }

    pub fn render_priority(&self, args: &Value) -> Result<Option<i64>, ToolError> {
        let rendered = self.render(args.get("priority"))?;
        self.validation.ensure_optional_priority(rendered.as_ref())
    }
}
