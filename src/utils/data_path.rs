use crate::errors::ToolError;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Parses `a.b[0].c` / `a["b"]` style lookups into segments.
pub fn parse_path(path: &str) -> Result<Vec<PathSegment>, ToolError> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(ToolError::invalid_params("Path must be a non-empty string"));
    }
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_brackets = false;
    for ch in trimmed.chars() {
        match ch {
            '.' if !in_brackets => {
                push_segment(&mut segments, &current);
                current.clear();
            }
            '[' => {
                push_segment(&mut segments, &current);
                current.clear();
                in_brackets = true;
            }
            ']' => {
                push_segment(&mut segments, &current);
                current.clear();
                in_brackets = false;
            }
            _ => current.push(ch),
        }
    }
    push_segment(&mut segments, &current);
    if in_brackets {
        return Err(ToolError::invalid_params(format!(
            "Path '{}' has an unclosed bracket",
            trimmed
        )));
    }
    Ok(segments)
}

fn push_segment(segments: &mut Vec<PathSegment>, raw: &str) {
    let trimmed = raw.trim().trim_matches('"').trim_matches('\'').trim();
    if trimmed.is_empty() {
        return;
    }
    match trimmed.parse::<usize>() {
        Ok(index) => segments.push(PathSegment::Index(index)),
        Err(_) => segments.push(PathSegment::Key(trimmed.to_string())),
    }
}

pub fn lookup<'a>(target: &'a Value, path: &str) -> Result<Option<&'a Value>, ToolError> {
    let mut current = target;
    for segment in parse_path(path)? {
        let next = match &segment {
            PathSegment::Key(key) => current.get(key.as_str()),
            PathSegment::Index(index) => current.as_array().and_then(|arr| arr.get(*index)),
        };
        match next {
            Some(value) => current = value,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}
