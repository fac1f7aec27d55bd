use crate::errors::ToolError;
use crate::utils::fs_atomic::{ensure_dir_for_file, temp_sibling_path};
use std::path::{Component, Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

pub const ARTIFACT_SCHEME: &str = "artifact://";
const ARTIFACTS_DIR: &str = "artifacts";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    pub uri: String,
    pub rel: String,
}

#[derive(Debug, Clone)]
pub struct ArtifactInfo {
    pub uri: String,
    pub path: PathBuf,
    pub bytes: u64,
}

fn normalize_segment(value: &str, label: &str) -> Result<String, ToolError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ToolError::invalid_params(format!(
            "{} must be a non-empty string",
            label
        )));
    }
    if trimmed == "." || trimmed == ".." {
        return Err(ToolError::invalid_params(format!(
            "{} must not be '.' or '..'",
            label
        )));
    }
    if trimmed.contains('/') || trimmed.contains('\\') {
        return Err(ToolError::invalid_params(format!(
            "{} must not contain path separators",
            label
        )));
    }
    Ok(trimmed.to_string())
}

pub fn build_run_file_ref(run_id: &str, filename: &str) -> Result<ArtifactRef, ToolError> {
    let run = normalize_segment(run_id, "run_id")?;
    let name = normalize_segment(filename, "filename")?;
    let rel = format!("runs/{}/tasks/{}", run, name);
    Ok(ArtifactRef {
        uri: format!("{}{}", ARTIFACT_SCHEME, rel),
        rel,
    })
}

pub fn resolve_artifact_path(root: &Path, rel: &str) -> Result<PathBuf, ToolError> {
    let rel = rel.trim();
    if rel.is_empty() {
        return Err(ToolError::invalid_params(
            "artifact rel must be a non-empty string",
        ));
    }
    let relative = Path::new(rel);
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(ToolError::invalid_params("Artifact path escapes storage root")
            .with_details(serde_json::json!({ "rel": rel })));
    }
    Ok(root.join(ARTIFACTS_DIR).join(relative))
}

pub fn resolve_artifact_uri(root: &Path, uri: &str) -> Result<PathBuf, ToolError> {
    let rel = uri.trim().strip_prefix(ARTIFACT_SCHEME).ok_or_else(|| {
        ToolError::invalid_params(format!("Not an artifact uri: {}", uri))
            .with_hint(format!("Artifact uris start with {}", ARTIFACT_SCHEME))
    })?;
    resolve_artifact_path(root, rel)
}

/// Copies `source_path` into the artifact tree through a temp sibling so a
/// reader never observes a partially written artifact.
pub async fn copy_file_artifact(
    root: &Path,
    reference: &ArtifactRef,
    source_path: &Path,
) -> Result<ArtifactInfo, ToolError> {
    let path = resolve_artifact_path(root, &reference.rel)?;
    ensure_dir_for_file(&path)
        .map_err(|err| ToolError::internal(format!("Failed to prepare artifact dir: {}", err)))?;
    let tmp_path = temp_sibling_path(&path);

    let mut reader = File::open(source_path)
        .await
        .map_err(|err| ToolError::internal(format!("Failed to open spill file: {}", err)))?;
    let mut writer = File::create(&tmp_path)
        .await
        .map_err(|err| ToolError::internal(format!("Failed to create artifact: {}", err)))?;

    let mut buf = vec![0u8; 64 * 1024];
    let mut total = 0u64;
    let copied: Result<(), ToolError> = async {
        loop {
            let n = reader
                .read(&mut buf)
                .await
                .map_err(|err| ToolError::internal(format!("Failed to read spill file: {}", err)))?;
            if n == 0 {
                break;
            }
            writer
                .write_all(&buf[..n])
                .await
                .map_err(|err| ToolError::internal(format!("Failed to write artifact: {}", err)))?;
            total += n as u64;
        }
        writer
            .flush()
            .await
            .map_err(|err| ToolError::internal(format!("Failed to flush artifact: {}", err)))?;
        Ok(())
    }
    .await;
    drop(writer);
    if let Err(err) = copied {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(err);
    }

    fs::rename(&tmp_path, &path)
        .await
        .map_err(|err| ToolError::internal(format!("Failed to finalize artifact: {}", err)))?;
    Ok(ArtifactInfo {
        uri: reference.uri.clone(),
        path,
        bytes: total,
    })
}
