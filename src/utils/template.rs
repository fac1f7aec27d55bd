use crate::errors::ToolError;
use crate::utils::data_path::lookup;
use serde_json::Value;

fn resolve_expression(expression: &str, variables: &Value) -> Result<Value, ToolError> {
    let trimmed = expression.trim();
    if trimmed.is_empty() {
        return Ok(Value::String(String::new()));
    }
    // `{{ ?path }}` renders as empty instead of failing when the variable is missing.
    let (path, optional) = match trimmed.strip_prefix('?') {
        Some(stripped) => (stripped.trim(), true),
        None => (trimmed, false),
    };
    match lookup(variables, path)? {
        Some(value) => Ok(value.clone()),
        None if optional => Ok(Value::String(String::new())),
        None => Err(
            ToolError::invalid_params(format!("Unknown template variable '{}'", path))
                .with_hint("Pass the variable through --vars or drop the template."),
        ),
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Renders `{{ path }}` placeholders. A string that is exactly one placeholder
/// keeps the variable's JSON type.
pub fn render_template_string(template: &str, variables: &Value) -> Result<Value, ToolError> {
    let trimmed = template.trim();
    if let Some(inner) = trimmed.strip_prefix("{{").and_then(|s| s.strip_suffix("}}")) {
        if !inner.contains("{{") && !inner.contains("}}") {
            return resolve_expression(inner, variables);
        }
    }

    let mut out = String::new();
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let (prefix, tail) = rest.split_at(start);
        out.push_str(prefix);
        match tail.find("}}") {
            Some(end) => {
                let value = resolve_expression(&tail[2..end], variables)?;
                out.push_str(&stringify(&value));
                rest = &tail[end + 2..];
            }
            None => {
                out.push_str(tail);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    Ok(Value::String(out))
}

pub fn render_templates(value: &Value, variables: &Value) -> Result<Value, ToolError> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| render_templates(item, variables))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (key, entry) in map {
                out.insert(key.clone(), render_templates(entry, variables)?);
            }
            Ok(Value::Object(out))
        }
        Value::String(text) => render_template_string(text, variables),
        _ => Ok(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn whole_placeholder_keeps_type() {
        let vars = json!({"inputs": {"priority": 4}});
        assert_eq!(
            render_template_string("{{ inputs.priority }}", &vars).expect("render"),
            json!(4)
        );
    }

    #[test]
    fn embedded_placeholders_are_stringified() {
        let vars = json!({"inputs": {"who": "Ada", "n": 2}});
        assert_eq!(
            render_template_string("Call {{ inputs.who }} x{{inputs.n}}", &vars).expect("render"),
            json!("Call Ada x2")
        );
    }

    #[test]
    fn missing_variable_is_a_configuration_error() {
        let err = render_template_string("{{ secrets.TOKEN }}", &json!({})).unwrap_err();
        assert_eq!(err.kind, crate::errors::ToolErrorKind::InvalidParams);
        assert_eq!(
            render_template_string("{{ ?secrets.TOKEN }}", &json!({})).expect("optional"),
            json!("")
        );
    }

    #[test]
    fn plain_strings_pass_through() {
        assert_eq!(
            render_template_string("Buy milk", &json!({})).expect("render"),
            json!("Buy milk")
        );
    }
}
