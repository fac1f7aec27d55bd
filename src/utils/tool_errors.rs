use crate::errors::ToolError;
use crate::utils::suggest::suggest;
use serde_json::Value;

fn build_hint(suggestions: &[String], known: &[&str]) -> String {
    let mut parts = Vec::new();
    if !suggestions.is_empty() {
        parts.push(format!("Did you mean: {}?", suggestions.join(", ")));
    }
    if !known.is_empty() {
        parts.push(format!("Use one of: {}.", known.join(", ")));
    }
    parts.join(" ")
}

pub fn unknown_action_error(tool: &str, action: Option<&Value>, known_actions: &[&str]) -> ToolError {
    let action_value = action.and_then(|v| v.as_str()).unwrap_or("").to_string();
    let suggestions = suggest(&action_value, known_actions, 3);
    ToolError::invalid_params(format!("Unknown {} action: {}", tool, action_value))
        .with_hint(build_hint(&suggestions, known_actions))
        .with_details(serde_json::json!({
            "known_actions": known_actions,
            "did_you_mean": suggestions,
        }))
}

pub fn unknown_tool_error(tool: &str, known_tools: &[&str]) -> ToolError {
    let suggestions = suggest(tool, known_tools, 3);
    ToolError::not_found(format!("Unknown tool: {}", tool))
        .with_hint(build_hint(&suggestions, known_tools))
        .with_details(serde_json::json!({
            "known_tools": known_tools,
            "did_you_mean": suggestions,
        }))
}
