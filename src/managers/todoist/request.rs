use crate::constants::api::{CLOSE_PATH, CONTENT_TYPE, FILTER_PATH, TASKS_PATH};
use crate::constants::protocols::ALLOWED_HTTP;
use crate::errors::ToolError;
use crate::managers::todoist::paginate::ListQuery;
use crate::services::http::HttpRequest;
use reqwest::Method;
use serde_json::{Map, Value};
use url::Url;

/// Builds every outbound request against one API base. Pure construction,
/// no I/O.
#[derive(Clone)]
pub struct RequestBuilder {
    base: Url,
    token: String,
}

impl std::fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("base", &self.base.as_str())
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl RequestBuilder {
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self, ToolError> {
        let base = Url::parse(base_url.trim())
            .map_err(|_| ToolError::invalid_params(format!("Invalid base_url: {}", base_url)))?;
        if !scheme_allowed(base.scheme()) {
            return Err(ToolError::invalid_params(
                "Only http/https base URLs are supported",
            ));
        }
        if base.cannot_be_a_base() {
            return Err(ToolError::invalid_params(format!(
                "base_url cannot carry path segments: {}",
                base_url
            )));
        }
        Ok(Self {
            base,
            token: token.into(),
        })
    }

    fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, ToolError> {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| ToolError::invalid_params("base_url cannot carry path segments"))?
            .pop_if_empty()
            .extend(segments);
        // Only touch the query when there is something to add; an empty
        // query_pairs_mut() would leave a dangling '?'.
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, body: Option<String>) -> HttpRequest {
        HttpRequest {
            method,
            url: url.to_string(),
            headers: vec![
                ("Authorization".to_string(), format!("Bearer {}", self.token)),
                ("Content-Type".to_string(), CONTENT_TYPE.to_string()),
            ],
            body,
        }
    }

    /// One listing page. `filter` targets `/tasks/filter?query=`; otherwise
    /// `/tasks` with an optional `project_id`. Values are form-urlencoded.
    pub fn list(&self, query: &ListQuery, cursor: Option<&str>) -> Result<HttpRequest, ToolError> {
        let limit = query.page_limit().map(|limit| limit.to_string());
        let mut pairs: Vec<(&str, &str)> = Vec::new();
        let segments: &[&str] = match (query.filter(), query.project_id()) {
            (Some(filter), _) => {
                pairs.push(("query", filter));
                &[TASKS_PATH, FILTER_PATH]
            }
            (None, Some(project_id)) => {
                pairs.push(("project_id", project_id));
                &[TASKS_PATH]
            }
            (None, None) => &[TASKS_PATH],
        };
        if let Some(limit) = limit.as_deref() {
            pairs.push(("limit", limit));
        }
        if let Some(cursor) = cursor {
            pairs.push(("cursor", cursor));
        }
        let url = self.url(segments, &pairs)?;
        Ok(self.request(Method::GET, url, None))
    }

    pub fn create(&self, fields: &Map<String, Value>) -> Result<HttpRequest, ToolError> {
        let url = self.url(&[TASKS_PATH], &[])?;
        Ok(self.request(Method::POST, url, Some(serde_json::to_string(fields)?)))
    }

    pub fn get(&self, task_id: &str) -> Result<HttpRequest, ToolError> {
        let url = self.url(&[TASKS_PATH, task_id], &[])?;
        Ok(self.request(Method::GET, url, None))
    }

    pub fn update(&self, task_id: &str, fields: &Map<String, Value>) -> Result<HttpRequest, ToolError> {
        let url = self.url(&[TASKS_PATH, task_id], &[])?;
        Ok(self.request(Method::POST, url, Some(serde_json::to_string(fields)?)))
    }

    pub fn close(&self, task_id: &str) -> Result<HttpRequest, ToolError> {
        let url = self.url(&[TASKS_PATH, task_id, CLOSE_PATH], &[])?;
        Ok(self.request(Method::POST, url, Some(String::new())))
    }

    pub fn delete(&self, task_id: &str) -> Result<HttpRequest, ToolError> {
        let url = self.url(&[TASKS_PATH, task_id], &[])?;
        Ok(self.request(Method::DELETE, url, None))
    }
}

fn scheme_allowed(scheme: &str) -> bool {
    ALLOWED_HTTP
        .iter()
        .any(|allowed| allowed.trim_end_matches(':') == scheme)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> RequestBuilder {
        RequestBuilder::new("https://api.test/api/v1", "tok").expect("builder")
    }

    fn query(project_id: Option<&str>, filter: Option<&str>, limit: Option<u32>) -> ListQuery {
        ListQuery::new(project_id.map(str::to_string), filter.map(str::to_string), limit)
            .expect("query")
    }

    #[test]
    fn plain_listing_has_no_query_string() {
        let req = builder().list(&query(None, None, None), None).expect("req");
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.url, "https://api.test/api/v1/tasks");
        assert_eq!(req.header("authorization"), Some("Bearer tok"));
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert!(req.body.is_none());
    }

    #[test]
    fn project_limit_and_cursor_are_appended_in_order() {
        let req = builder()
            .list(&query(Some("2203306141"), None, Some(50)), Some("abc=="))
            .expect("req");
        assert_eq!(
            req.url,
            "https://api.test/api/v1/tasks?project_id=2203306141&limit=50&cursor=abc%3D%3D"
        );
    }

    #[test]
    fn filter_targets_filter_endpoint_and_is_encoded() {
        let req = builder()
            .list(&query(None, Some("today & #Work"), None), None)
            .expect("req");
        assert_eq!(
            req.url,
            "https://api.test/api/v1/tasks/filter?query=today+%26+%23Work"
        );
    }

    #[test]
    fn trailing_slash_on_base_is_tolerated() {
        let b = RequestBuilder::new("https://api.test/api/v1/", "tok").expect("builder");
        assert_eq!(b.get("123").expect("req").url, "https://api.test/api/v1/tasks/123");
    }

    #[test]
    fn single_call_routes() {
        let b = builder();
        let mut fields = Map::new();
        fields.insert("content".into(), Value::String("Buy milk".into()));

        let create = b.create(&fields).expect("create");
        assert_eq!((create.method.clone(), create.url.as_str()), (Method::POST, "https://api.test/api/v1/tasks"));
        assert_eq!(create.body.as_deref(), Some(r#"{"content":"Buy milk"}"#));

        let update = b.update("123", &fields).expect("update");
        assert_eq!(update.url, "https://api.test/api/v1/tasks/123");
        assert_eq!(update.method, Method::POST);

        let close = b.close("123").expect("close");
        assert_eq!(close.url, "https://api.test/api/v1/tasks/123/close");
        assert_eq!(close.body.as_deref(), Some(""));

        let delete = b.delete("123").expect("delete");
        assert_eq!(delete.method, Method::DELETE);
        assert_eq!(delete.url, "https://api.test/api/v1/tasks/123");
    }

    #[test]
    fn task_ids_are_path_encoded() {
        let req = builder().get("a b?c").expect("req");
        assert_eq!(req.url, "https://api.test/api/v1/tasks/a%20b%3Fc");
    }

    #[test]
    fn rejects_non_http_base() {
        assert!(RequestBuilder::new("ftp://api.test", "tok").is_err());
        assert!(RequestBuilder::new("not a url", "tok").is_err());
    }

    #[test]
    fn debug_output_hides_token() {
        let rendered = format!("{:?}", builder());
        assert!(!rendered.contains("tok\""));
        assert!(rendered.contains("[REDACTED]"));
    }
}
