use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::utils::artifacts::{build_run_file_ref, copy_file_artifact, resolve_artifact_uri};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Durable storage for spilled results: accepts a finished local file and
/// returns a URI it can later be retrieved by.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn put_file(&self, run_id: &str, local_path: &Path) -> Result<String, ToolError>;
}

#[derive(Clone)]
pub struct ArtifactStorage {
    logger: Logger,
    root: PathBuf,
}

impl ArtifactStorage {
    pub fn new(logger: Logger, root: impl Into<PathBuf>) -> Self {
        Self {
            logger: logger.child("storage"),
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps an `artifact://` URI back to the file it names.
    pub fn resolve(&self, uri: &str) -> Result<PathBuf, ToolError> {
        let path = resolve_artifact_uri(&self.root, uri)?;
        if !path.is_file() {
            return Err(ToolError::not_found(format!("Artifact does not exist: {}", uri)));
        }
        Ok(path)
    }
}

#[async_trait]
impl Storage for ArtifactStorage {
    async fn put_file(&self, run_id: &str, local_path: &Path) -> Result<String, ToolError> {
        let filename = format!("{}.jsonl", uuid::Uuid::new_v4());
        let reference = build_run_file_ref(run_id, &filename)?;
        let info = copy_file_artifact(&self.root, &reference, local_path).await?;
        self.logger.debug(
            "Stored artifact",
            Some(&serde_json::json!({
                "uri": info.uri,
                "path": info.path.display().to_string(),
                "bytes": info.bytes,
            })),
        );
        Ok(info.uri)
    }
}
