use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::{ToolError, ToolErrorKind};
use crate::services::logger::Logger;
use crate::services::run_context::RunContext;
use crate::utils::tool_errors::unknown_tool_error;

#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle(&self, ctx: RunContext, args: Value) -> Result<Value, ToolError>;
}

/// Routes a tool invocation to its handler and wraps the result with run metadata.
#[derive(Clone)]
pub struct ToolExecutor {
    logger: Logger,
    handlers: Arc<HashMap<String, Arc<dyn ToolHandler>>>,
}

impl ToolExecutor {
    pub fn new(logger: Logger, handlers: HashMap<String, Arc<dyn ToolHandler>>) -> Self {
        Self {
            logger: logger.child("executor"),
            handlers: Arc::new(handlers),
        }
    }

    pub fn tools(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub async fn execute(&self, tool: &str, args: Value, vars: Value) -> Result<Value, ToolError> {
        let started_at = chrono::Utc::now().timestamp_millis();
        let handler = match self.handlers.get(tool) {
            Some(handler) => handler.clone(),
            None => return Err(unknown_tool_error(tool, &self.tools())),
        };

        let action = args.get("action").cloned().unwrap_or(Value::Null);
        let ctx = RunContext::new(self.logger.child(tool), vars);
        let run_id = ctx.run_id().to_string();
        self.logger.debug(
            tool,
            Some(&serde_json::json!({ "action": action, "run_id": run_id })),
        );

        let outcome = handler.handle(ctx, args).await;
        let duration_ms = chrono::Utc::now().timestamp_millis() - started_at;
        match outcome {
            Ok(result) => Ok(serde_json::json!({
                "success": true,
                "result": result,
                "meta": {
                    "tool": tool,
                    "action": action,
                    "run_id": run_id,
                    "duration_ms": duration_ms,
                },
            })),
            Err(err) => {
                let meta = serde_json::json!({
                    "run_id": run_id,
                    "code": err.code,
                    "duration_ms": duration_ms,
                });
                let message = format!("{} failed: {}", tool, err.message);
                // Caller mistakes are warnings; remote and internal failures are errors.
                if err.kind == ToolErrorKind::InvalidParams {
                    self.logger.warn(&message, Some(&meta));
                } else {
                    self.logger.error(&message, Some(&meta));
                }
                Err(err)
            }
        }
    }
}
