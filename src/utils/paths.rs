use std::env;
use std::path::PathBuf;

pub fn normalize_env_value(value: Option<String>) -> Option<String> {
    let raw = value?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lowered = trimmed.to_lowercase();
    if lowered == "undefined" || lowered == "null" {
        return None;
    }
    Some(trimmed.to_string())
}

pub fn env_value(key: &str) -> Option<String> {
    normalize_env_value(env::var(key).ok())
}

fn resolve_xdg_state_dir() -> Option<PathBuf> {
    if let Some(path) = env_value("XDG_STATE_HOME") {
        return Some(PathBuf::from(path));
    }
    env_value("HOME").map(|home| PathBuf::from(home).join(".local").join("state"))
}

pub fn resolve_state_dir() -> PathBuf {
    if let Some(path) = resolve_xdg_state_dir() {
        return path.join("todoist-tasks");
    }
    env::temp_dir().join("todoist-tasks")
}

pub fn resolve_artifacts_root() -> PathBuf {
    if let Some(path) = env_value("TODOIST_ARTIFACTS_DIR") {
        return PathBuf::from(path);
    }
    resolve_state_dir()
}
