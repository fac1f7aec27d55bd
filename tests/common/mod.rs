#![allow(dead_code)]

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;

use todoist_tasks::errors::ToolError;
use todoist_tasks::managers::todoist::TodoistManager;
use todoist_tasks::services::http::{HttpRequest, HttpResponse, HttpTransport};
use todoist_tasks::services::logger::Logger;
use todoist_tasks::services::run_context::RunContext;
use todoist_tasks::services::settings::Settings;
use todoist_tasks::services::storage::ArtifactStorage;

pub static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

pub const BASE_URL: &str = "https://api.test/api/v1";

/// Replays canned responses in order and records every request it sees.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: StdMutex<VecDeque<HttpResponse>>,
    requests: StdMutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<(u16, Value)>) -> Arc<Self> {
        let queue = responses
            .into_iter()
            .map(|(status, body)| HttpResponse {
                status,
                body: match body {
                    Value::String(text) => text,
                    other => other.to_string(),
                },
            })
            .collect();
        Arc::new(Self {
            responses: StdMutex::new(queue),
            requests: StdMutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ToolError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ToolError::internal("scripted transport ran out of responses"))
    }
}

/// In-memory stand-in for the tasks API. Routes on method and path.
#[derive(Default)]
pub struct FakeTodoist {
    tasks: StdMutex<BTreeMap<String, Value>>,
    next_id: StdMutex<u64>,
    requests: StdMutex<Vec<HttpRequest>>,
}

impl FakeTodoist {
    pub fn starting_at(id: u64) -> Arc<Self> {
        let fake = Self::default();
        *fake.next_id.lock().unwrap() = id;
        Arc::new(fake)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn task(&self, id: &str) -> Option<Value> {
        self.tasks.lock().unwrap().get(id).cloned()
    }

    fn respond(status: u16, body: impl Into<String>) -> HttpResponse {
        HttpResponse {
            status,
            body: body.into(),
        }
    }

    fn not_found() -> HttpResponse {
        Self::respond(404, "Task not found")
    }
}

#[async_trait]
impl HttpTransport for FakeTodoist {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ToolError> {
        self.requests.lock().unwrap().push(request.clone());
        if request.header("authorization") != Some("Bearer test-token") {
            return Ok(Self::respond(401, "Unauthorized"));
        }
        let url = url::Url::parse(&request.url).unwrap();
        let segments: Vec<String> = url
            .path_segments()
            .unwrap()
            .skip_while(|s| *s != "tasks")
            .skip(1)
            .map(|s| s.to_string())
            .collect();
        let body: Value = request
            .body
            .as_deref()
            .filter(|b| !b.is_empty())
            .map(|b| serde_json::from_str(b).unwrap())
            .unwrap_or(Value::Null);
        let mut tasks = self.tasks.lock().unwrap();

        let response = match (request.method.as_str(), segments.as_slice()) {
            ("POST", []) => {
                let mut id = self.next_id.lock().unwrap();
                let task_id = id.to_string();
                *id += 1;
                let mut task = body.as_object().cloned().unwrap_or_default();
                task.insert("id".into(), Value::String(task_id.clone()));
                task.insert("is_completed".into(), Value::Bool(false));
                task.insert(
                    "url".into(),
                    Value::String(format!("https://app.todoist.test/task/{}", task_id)),
                );
                let task = Value::Object(task);
                tasks.insert(task_id, task.clone());
                Self::respond(200, task.to_string())
            }
            ("GET", []) => {
                let open: Vec<Value> = tasks
                    .values()
                    .filter(|t| t["is_completed"] == false)
                    .cloned()
                    .collect();
                Self::respond(
                    200,
                    serde_json::json!({ "results": open, "next_cursor": null }).to_string(),
                )
            }
            ("GET", [id]) => match tasks.get(id) {
                Some(task) => Self::respond(200, task.to_string()),
                None => Self::not_found(),
            },
            ("POST", [id]) => match tasks.get_mut(id) {
                Some(task) => {
                    if let (Some(target), Some(patch)) = (task.as_object_mut(), body.as_object()) {
                        for (key, value) in patch {
                            target.insert(key.clone(), value.clone());
                        }
                    }
                    Self::respond(200, task.to_string())
                }
                None => Self::not_found(),
            },
            ("POST", [id, close]) if close == "close" => match tasks.get_mut(id) {
                Some(task) => {
                    task["is_completed"] = Value::Bool(true);
                    Self::respond(204, "")
                }
                None => Self::not_found(),
            },
            ("DELETE", [id]) => match tasks.remove(id) {
                Some(_) => Self::respond(204, ""),
                None => Self::not_found(),
            },
            _ => Self::respond(400, "unsupported route"),
        };
        Ok(response)
    }
}

pub fn settings(artifacts_root: &std::path::Path) -> Settings {
    Settings {
        base_url: BASE_URL.to_string(),
        api_token: Some("test-token".to_string()),
        artifacts_root: artifacts_root.to_path_buf(),
        ..Settings::default()
    }
}

pub struct Harness {
    pub manager: TodoistManager,
    pub storage: Arc<ArtifactStorage>,
    pub dir: tempfile::TempDir,
}

pub fn harness(transport: Arc<dyn HttpTransport>) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let logger = Logger::new("test");
    let storage = Arc::new(ArtifactStorage::new(logger.clone(), dir.path()));
    let manager = TodoistManager::new(
        logger,
        settings(dir.path()),
        transport,
        storage.clone(),
    );
    Harness {
        manager,
        storage,
        dir,
    }
}

pub fn ctx() -> RunContext {
    RunContext::new(Logger::new("test"), serde_json::json!({}))
}

pub fn page(ids: &[&str], cursor: Option<&str>) -> (u16, Value) {
    let results: Vec<Value> = ids
        .iter()
        .map(|id| serde_json::json!({ "id": id, "content": format!("task {}", id) }))
        .collect();
    (
        200,
        serde_json::json!({ "results": results, "next_cursor": cursor }),
    )
}

pub fn ids(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}
