use crate::errors::ToolError;
use crate::managers::todoist::TodoistManager;
use crate::services::run_context::RunContext;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateOutput {
    pub task_id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub response: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GetOutput {
    pub task: Value,
    pub task_id: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateOutput {
    pub task_id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub response: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteOutput {
    pub task_id: String,
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompleteOutput {
    pub task_id: String,
    pub success: bool,
}

impl TodoistManager {
    pub async fn create_task(&self, ctx: &RunContext, args: &Value) -> Result<CreateOutput, ToolError> {
        let mut fields = Map::new();
        fields.insert(
            "content".to_string(),
            Value::String(ctx.render_required_string(args, "content")?),
        );
        collect_optional_fields(ctx, args, &mut fields, true)?;
        let requests = self.request_builder(ctx, args)?;

        let response = self.send(requests.create(&fields)?, "create task").await?;
        let task = parse_task(&response.body)?;
        let output = CreateOutput {
            task_id: string_field(&task, "id", &response.body)?,
            content: string_field(&task, "content", &response.body)?,
            url: optional_string_field(&task, "url"),
            response: task,
        };
        ctx.logger().info(
            "Task created",
            Some(&serde_json::json!({ "task_id": output.task_id })),
        );
        Ok(output)
    }

    pub async fn get_task(&self, ctx: &RunContext, args: &Value) -> Result<GetOutput, ToolError> {
        let task_id = ctx.render_identifier(args, "task_id")?;
        let requests = self.request_builder(ctx, args)?;

        let response = self.send(requests.get(&task_id)?, "get task").await?;
        let task = parse_task(&response.body)?;
        let output = GetOutput {
            task_id: string_field(&task, "id", &response.body)?,
            content: string_field(&task, "content", &response.body)?,
            task,
        };
        ctx.logger().info(
            "Retrieved task",
            Some(&serde_json::json!({ "task_id": output.task_id })),
        );
        Ok(output)
    }

    pub async fn update_task(&self, ctx: &RunContext, args: &Value) -> Result<UpdateOutput, ToolError> {
        let task_id = ctx.render_identifier(args, "task_id")?;
        let mut fields = Map::new();
        if let Some(content) = ctx.render_string(args, "content")? {
            fields.insert("content".to_string(), Value::String(content));
        }
        collect_optional_fields(ctx, args, &mut fields, false)?;
        if fields.is_empty() {
            return Err(
                ToolError::invalid_params("At least one field must be provided to update")
                    .with_hint("Set content, description, priority or due_string."),
            );
        }
        let requests = self.request_builder(ctx, args)?;

        let response = self
            .send(requests.update(&task_id, &fields)?, "update task")
            .await?;
        let task = parse_task(&response.body)?;
        let output = UpdateOutput {
            task_id: string_field(&task, "id", &response.body)?,
            content: string_field(&task, "content", &response.body)?,
            url: optional_string_field(&task, "url"),
            response: task,
        };
        ctx.logger().info(
            "Task updated",
            Some(&serde_json::json!({
                "task_id": output.task_id,
                "fields": fields.keys().collect::<Vec<_>>(),
            })),
        );
        Ok(output)
    }

    pub async fn delete_task(&self, ctx: &RunContext, args: &Value) -> Result<DeleteOutput, ToolError> {
        let task_id = ctx.render_identifier(args, "task_id")?;
        let requests = self.request_builder(ctx, args)?;

        self.send(requests.delete(&task_id)?, "delete task").await?;
        ctx.logger().info(
            "Task deleted",
            Some(&serde_json::json!({ "task_id": task_id })),
        );
        Ok(DeleteOutput {
            task_id,
            deleted: true,
        })
    }

    pub async fn complete_task(&self, ctx: &RunContext, args: &Value) -> Result<CompleteOutput, ToolError> {
        let task_id = ctx.render_identifier(args, "task_id")?;
        let requests = self.request_builder(ctx, args)?;

        self.send(requests.close(&task_id)?, "complete task").await?;
        ctx.logger().info(
            "Task completed",
            Some(&serde_json::json!({ "task_id": task_id })),
        );
        Ok(CompleteOutput {
            task_id,
            success: true,
        })
    }
}

/// Optional fields shared by create and update; absent values are omitted
/// from the body entirely, never sent as null.
fn collect_optional_fields(
    ctx: &RunContext,
    args: &Value,
    fields: &mut Map<String, Value>,
    with_project: bool,
) -> Result<(), ToolError> {
    let description = match ctx.render_string(args, "description")? {
        Some(description) => Some(description),
        None => ctx.render_string(args, "task_description")?,
    };
    if let Some(description) = description {
        fields.insert("description".to_string(), Value::String(description));
    }
    if let Some(priority) = ctx.render_priority(args)? {
        fields.insert("priority".to_string(), Value::from(priority));
    }
    if with_project {
        if let Some(project_id) = ctx.render_selector(args, "project_id")? {
            fields.insert("project_id".to_string(), Value::String(project_id));
        }
    }
    if let Some(due_string) = ctx.render_string(args, "due_string")? {
        fields.insert("due_string".to_string(), Value::String(due_string));
    }
    Ok(())
}

fn parse_task(body: &str) -> Result<Value, ToolError> {
    match serde_json::from_str::<Value>(body) {
        Ok(task @ Value::Object(_)) => Ok(task),
        Ok(_) => Err(ToolError::parse(body, "expected a task object")),
        Err(err) => Err(ToolError::parse(body, err)),
    }
}

fn optional_string_field(task: &Value, key: &str) -> Option<String> {
    match task.get(key)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(num) => Some(num.to_string()),
        _ => None,
    }
}

fn string_field(task: &Value, key: &str, body: &str) -> Result<String, ToolError> {
    optional_string_field(task, key)
        .ok_or_else(|| ToolError::parse(body, format!("task is missing '{}'", key)))
}
