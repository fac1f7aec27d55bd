use crate::errors::ToolError;
use crate::managers::todoist::paginate::PageConsumer;
use crate::services::storage::Storage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use tempfile::NamedTempFile;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FetchMode {
    FirstOnly,
    #[default]
    AllInMemory,
    SpillToStorage,
}

impl FromStr for FetchMode {
    type Err = ToolError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_uppercase().replace('-', "_").as_str() {
            "FIRST_ONLY" | "FETCH_ONE" => Ok(FetchMode::FirstOnly),
            "ALL_IN_MEMORY" | "FETCH" => Ok(FetchMode::AllInMemory),
            "SPILL_TO_STORAGE" | "STORE" => Ok(FetchMode::SpillToStorage),
            _ => Err(ToolError::invalid_params(format!("Unknown fetch_type: {}", raw))
                .with_hint("Use FIRST_ONLY, ALL_IN_MEMORY or SPILL_TO_STORAGE.")),
        }
    }
}

/// Exactly one shape per fetch mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "fetch_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListOutput {
    FirstOnly { task: Option<Value>, count: usize },
    AllInMemory { tasks: Vec<Value>, count: usize },
    SpillToStorage { uri: String, count: usize },
}

impl ListOutput {
    pub fn count(&self) -> usize {
        match self {
            ListOutput::FirstOnly { count, .. }
            | ListOutput::AllInMemory { count, .. }
            | ListOutput::SpillToStorage { count, .. } => *count,
        }
    }
}

pub async fn materialize(
    items: Vec<Value>,
    mode: FetchMode,
    storage: &dyn Storage,
    run_id: &str,
) -> Result<ListOutput, ToolError> {
    match mode {
        FetchMode::FirstOnly => {
            let task = items.into_iter().next();
            let count = usize::from(task.is_some());
            Ok(ListOutput::FirstOnly { task, count })
        }
        FetchMode::AllInMemory => {
            let count = items.len();
            Ok(ListOutput::AllInMemory { tasks: items, count })
        }
        FetchMode::SpillToStorage => {
            let mut sink = SpillSink::create()?;
            sink.accept(items).await?;
            sink.finish(storage, run_id).await
        }
    }
}

/// Scoped JSON Lines temp file. The backing file is removed when the sink is
/// dropped, whether or not `finish` ran.
pub struct SpillSink {
    file: NamedTempFile,
    writer: BufWriter<File>,
    written: usize,
}

impl SpillSink {
    pub fn create() -> Result<Self, ToolError> {
        let file = tempfile::Builder::new()
            .prefix("todoist-tasks-")
            .suffix(".jsonl")
            .tempfile()
            .map_err(|err| ToolError::internal(format!("Failed to create spill file: {}", err)))?;
        let handle = file
            .reopen()
            .map_err(|err| ToolError::internal(format!("Failed to open spill file: {}", err)))?;
        Ok(Self {
            file,
            writer: BufWriter::new(File::from_std(handle)),
            written: 0,
        })
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub async fn write_item(&mut self, item: &Value) -> Result<(), ToolError> {
        let mut line = serde_json::to_vec(item)?;
        line.push(b'\n');
        self.writer
            .write_all(&line)
            .await
            .map_err(|err| ToolError::internal(format!("Failed to write spill file: {}", err)))?;
        self.written += 1;
        Ok(())
    }

    /// Flushes and hands the finished file to storage.
    pub async fn finish(
        mut self,
        storage: &dyn Storage,
        run_id: &str,
    ) -> Result<ListOutput, ToolError> {
        self.writer
            .flush()
            .await
            .map_err(|err| ToolError::internal(format!("Failed to flush spill file: {}", err)))?;
        self.writer
            .get_mut()
            .sync_all()
            .await
            .map_err(|err| ToolError::internal(format!("Failed to sync spill file: {}", err)))?;
        let uri = storage.put_file(run_id, self.file.path()).await?;
        Ok(ListOutput::SpillToStorage {
            uri,
            count: self.written,
        })
    }
}

#[async_trait]
impl PageConsumer for SpillSink {
    async fn accept(&mut self, items: Vec<Value>) -> Result<(), ToolError> {
        for item in &items {
            self.write_item(item).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    #[derive(Default)]
    struct CapturingStorage {
        stored: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Storage for CapturingStorage {
        async fn put_file(&self, run_id: &str, local_path: &Path) -> Result<String, ToolError> {
            let content = std::fs::read_to_string(local_path)?;
            self.stored.lock().unwrap().push(content);
            Ok(format!("mem://{}/0", run_id))
        }
    }

    fn abc() -> Vec<Value> {
        vec![
            json!({"id": "A", "content": "a"}),
            json!({"id": "B", "content": "b"}),
            json!({"id": "C", "content": "c"}),
        ]
    }

    #[tokio::test]
    async fn first_only_takes_head() {
        let storage = CapturingStorage::default();
        let out = materialize(abc(), FetchMode::FirstOnly, &storage, "r").await.unwrap();
        assert_eq!(
            out,
            ListOutput::FirstOnly { task: Some(json!({"id": "A", "content": "a"})), count: 1 }
        );
        let empty = materialize(vec![], FetchMode::FirstOnly, &storage, "r").await.unwrap();
        assert_eq!(empty, ListOutput::FirstOnly { task: None, count: 0 });
    }

    #[tokio::test]
    async fn all_in_memory_keeps_order() {
        let storage = CapturingStorage::default();
        let out = materialize(abc(), FetchMode::AllInMemory, &storage, "r").await.unwrap();
        assert_eq!(out, ListOutput::AllInMemory { tasks: abc(), count: 3 });
        let empty = materialize(vec![], FetchMode::AllInMemory, &storage, "r").await.unwrap();
        assert_eq!(empty.count(), 0);
    }

    #[tokio::test]
    async fn spill_writes_one_line_per_item() {
        let storage = CapturingStorage::default();
        let out = materialize(abc(), FetchMode::SpillToStorage, &storage, "r1").await.unwrap();
        assert_eq!(out, ListOutput::SpillToStorage { uri: "mem://r1/0".into(), count: 3 });

        let stored = storage.stored.lock().unwrap();
        let lines: Vec<Value> = stored[0]
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines, abc());
    }

    #[tokio::test]
    async fn dropped_sink_removes_temp_file() {
        let mut sink = SpillSink::create().unwrap();
        sink.write_item(&json!({"id": "A"})).await.unwrap();
        assert_eq!(sink.written(), 1);
        let path: PathBuf = sink.file.path().to_path_buf();
        assert!(path.exists());
        drop(sink);
        assert!(!path.exists());
    }

    #[test]
    fn fetch_mode_accepts_aliases() {
        assert_eq!("fetch_one".parse::<FetchMode>().unwrap(), FetchMode::FirstOnly);
        assert_eq!("FETCH".parse::<FetchMode>().unwrap(), FetchMode::AllInMemory);
        assert_eq!("store".parse::<FetchMode>().unwrap(), FetchMode::SpillToStorage);
        assert_eq!("spill-to-storage".parse::<FetchMode>().unwrap(), FetchMode::SpillToStorage);
        assert!("everything".parse::<FetchMode>().is_err());
    }

    #[test]
    fn output_serializes_with_its_mode_tag() {
        let out = ListOutput::SpillToStorage { uri: "artifact://x".into(), count: 2 };
        assert_eq!(
            serde_json::to_value(out).unwrap(),
            json!({"fetch_type": "SPILL_TO_STORAGE", "uri": "artifact://x", "count": 2})
        );
    }
}
