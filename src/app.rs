use crate::errors::ToolError;
use crate::managers::todoist::TodoistManager;
use crate::services::http::{HttpTransport, ReqwestTransport};
use crate::services::logger::Logger;
use crate::services::settings::Settings;
use crate::services::storage::{ArtifactStorage, Storage};
use crate::services::tool_executor::{ToolExecutor, ToolHandler};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

pub struct App {
    pub logger: Logger,
    pub settings: Settings,
    pub tool_executor: Arc<ToolExecutor>,
}

impl App {
    pub fn initialize() -> Result<Self, ToolError> {
        let logger = Logger::new("todoist-tasks");
        let settings = Settings::from_env()?;
        let transport: Arc<dyn HttpTransport> =
            Arc::new(ReqwestTransport::new(logger.clone(), settings.timeout_ms)?);
        let storage: Arc<dyn Storage> = Arc::new(ArtifactStorage::new(
            logger.clone(),
            settings.artifacts_root.clone(),
        ));
        Ok(Self::with_services(logger, settings, transport, storage))
    }

    /// Wires the executor around caller-provided transport and storage.
    pub fn with_services(
        logger: Logger,
        settings: Settings,
        transport: Arc<dyn HttpTransport>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        let todoist = Arc::new(TodoistManager::new(
            logger.clone(),
            settings.clone(),
            transport,
            storage,
        ));

        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
        handlers.insert("todoist".to_string(), todoist);

        let tool_executor = Arc::new(ToolExecutor::new(logger.clone(), handlers));
        logger.debug(
            "initialized",
            Some(&serde_json::json!({
                "base_url": settings.base_url,
                "artifacts_root": settings.artifacts_root.display().to_string(),
                "tools": tool_executor.tools(),
            })),
        );

        Self {
            logger,
            settings,
            tool_executor,
        }
    }

    pub async fn run(&self, tool: &str, args: Value, vars: Value) -> Result<Value, ToolError> {
        self.tool_executor.execute(tool, args, vars).await
    }
}
