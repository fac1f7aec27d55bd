use crate::errors::ToolError;
use crate::services::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::services::logger::Logger;
use crate::services::run_context::RunContext;
use crate::services::settings::Settings;
use crate::services::storage::Storage;
use crate::utils::tool_errors::unknown_action_error;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

pub mod crud;
pub mod materialize;
pub mod normalize;
pub mod paginate;
pub mod request;

use materialize::{materialize, FetchMode, ListOutput, SpillSink};
use paginate::{ListQuery, PaginationDriver};
use request::RequestBuilder;

const TODOIST_ACTIONS: &[&str] = &["create", "get", "update", "delete", "complete", "list"];

#[derive(Clone)]
pub struct TodoistManager {
    logger: Logger,
    settings: Settings,
    transport: Arc<dyn HttpTransport>,
    storage: Arc<dyn Storage>,
}

impl TodoistManager {
    pub fn new(
        logger: Logger,
        settings: Settings,
        transport: Arc<dyn HttpTransport>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            logger: logger.child("todoist"),
            settings,
            transport,
            storage,
        }
    }

    pub async fn handle_action(&self, ctx: &RunContext, args: Value) -> Result<Value, ToolError> {
        let action = args.get("action");
        match action.and_then(|v| v.as_str()).unwrap_or("") {
            "create" => Ok(serde_json::to_value(self.create_task(ctx, &args).await?)?),
            "get" => Ok(serde_json::to_value(self.get_task(ctx, &args).await?)?),
            "update" => Ok(serde_json::to_value(self.update_task(ctx, &args).await?)?),
            "delete" => Ok(serde_json::to_value(self.delete_task(ctx, &args).await?)?),
            "complete" => Ok(serde_json::to_value(self.complete_task(ctx, &args).await?)?),
            "list" => Ok(serde_json::to_value(self.list_tasks(ctx, &args).await?)?),
            _ => Err(unknown_action_error("todoist", action, TODOIST_ACTIONS)),
        }
    }

    /// Token comes from the task input, falling back to `TODOIST_API_TOKEN`.
    fn request_builder(&self, ctx: &RunContext, args: &Value) -> Result<RequestBuilder, ToolError> {
        let token = match ctx.render_selector(args, "api_token")? {
            Some(token) => token,
            None => self.settings.api_token.clone().ok_or_else(|| {
                ToolError::invalid_params("api_token is required").with_hint(
                    "Pass args.api_token (e.g. \"{{ secrets.TODOIST_API_TOKEN }}\") or set TODOIST_API_TOKEN.",
                )
            })?,
        };
        let base_url = ctx
            .render_selector(args, "base_url")?
            .unwrap_or_else(|| self.settings.base_url.clone());
        RequestBuilder::new(&base_url, token)
    }

    async fn send(&self, request: HttpRequest, operation: &str) -> Result<HttpResponse, ToolError> {
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(ToolError::status(operation, response.status, response.body));
        }
        Ok(response)
    }

    pub async fn list_tasks(&self, ctx: &RunContext, args: &Value) -> Result<ListOutput, ToolError> {
        let query = ListQuery::new(
            ctx.render_selector(args, "project_id")?,
            ctx.render_selector(args, "filter")?,
            ctx.render_positive(args, "limit")?,
        )?;
        let mode = match ctx.render_selector(args, "fetch_type")? {
            Some(raw) => raw.parse::<FetchMode>()?,
            None => FetchMode::default(),
        };
        let max_pages = ctx
            .render_positive(args, "max_pages")?
            .map(|n| n as usize)
            .unwrap_or(self.settings.max_pages);
        let requests = self.request_builder(ctx, args)?;

        let started = Instant::now();
        let driver = PaginationDriver::new(self.transport.as_ref(), &requests, ctx.logger(), max_pages);
        let (output, summary) = match mode {
            // Spilled listings stream each page straight to disk.
            FetchMode::SpillToStorage => {
                let mut sink = SpillSink::create()?;
                let summary = driver.drive(&query, &mut sink).await?;
                (sink.finish(self.storage.as_ref(), ctx.run_id()).await?, summary)
            }
            _ => {
                let mut items = Vec::new();
                let summary = driver.drive(&query, &mut items).await?;
                let output = materialize(items, mode, self.storage.as_ref(), ctx.run_id()).await?;
                (output, summary)
            }
        };

        ctx.logger().info(
            &format!("Retrieved {} tasks", output.count()),
            Some(&serde_json::json!({
                "fetch_type": mode,
                "fetch_all": query.fetch_all(),
                "pages": summary.pages,
                "duration_ms": started.elapsed().as_millis() as u64,
            })),
        );
        Ok(output)
    }
}

#[async_trait::async_trait]
impl crate::services::tool_executor::ToolHandler for TodoistManager {
    async fn handle(&self, ctx: RunContext, args: Value) -> Result<Value, ToolError> {
        self.logger.debug("handle_action", args.get("action"));
        self.handle_action(&ctx, args).await
    }
}
