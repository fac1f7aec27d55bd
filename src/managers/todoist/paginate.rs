use crate::errors::ToolError;
use crate::managers::todoist::normalize::normalize_page;
use crate::managers::todoist::request::RequestBuilder;
use crate::services::http::HttpTransport;
use crate::services::logger::Logger;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;

/// Immutable parameters for one listing invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    project_id: Option<String>,
    filter: Option<String>,
    page_limit: Option<u32>,
}

impl ListQuery {
    /// `project_id` and `filter` select different endpoints and cannot be combined.
    pub fn new(
        project_id: Option<String>,
        filter: Option<String>,
        page_limit: Option<u32>,
    ) -> Result<Self, ToolError> {
        if project_id.is_some() && filter.is_some() {
            return Err(
                ToolError::invalid_params("project_id and filter are mutually exclusive")
                    .with_hint("Use a filter query such as '#Project' instead of project_id."),
            );
        }
        if page_limit == Some(0) {
            return Err(ToolError::invalid_params("limit must be a positive integer"));
        }
        Ok(Self {
            project_id,
            filter,
            page_limit,
        })
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub fn page_limit(&self) -> Option<u32> {
        self.page_limit
    }

    /// Without an explicit limit the caller wants everything.
    pub fn fetch_all(&self) -> bool {
        self.page_limit.is_none()
    }
}

/// Receives each page's items in fetch order.
#[async_trait]
pub trait PageConsumer: Send {
    async fn accept(&mut self, items: Vec<Value>) -> Result<(), ToolError>;
}

#[async_trait]
impl PageConsumer for Vec<Value> {
    async fn accept(&mut self, items: Vec<Value>) -> Result<(), ToolError> {
        self.extend(items);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationSummary {
    pub pages: usize,
    pub items: usize,
}

pub struct PaginationDriver<'a> {
    transport: &'a dyn HttpTransport,
    requests: &'a RequestBuilder,
    logger: &'a Logger,
    max_pages: usize,
}

impl<'a> PaginationDriver<'a> {
    pub fn new(
        transport: &'a dyn HttpTransport,
        requests: &'a RequestBuilder,
        logger: &'a Logger,
        max_pages: usize,
    ) -> Self {
        Self {
            transport,
            requests,
            logger,
            max_pages: max_pages.max(1),
        }
    }

    /// Follows `next_cursor` until the server stops sending one, or fetches a
    /// single page when the query carries an explicit limit. Any failure
    /// aborts the whole listing.
    pub async fn drive<C: PageConsumer>(
        &self,
        query: &ListQuery,
        consumer: &mut C,
    ) -> Result<PaginationSummary, ToolError> {
        let fetch_all = query.fetch_all();
        let mut cursor: Option<String> = None;
        let mut seen = HashSet::new();
        let mut summary = PaginationSummary { pages: 0, items: 0 };

        loop {
            if summary.pages >= self.max_pages {
                return Err(ToolError::pagination(format!(
                    "Listing exceeded {} pages",
                    self.max_pages
                ))
                .with_hint("Raise max_pages or narrow the listing with a filter or limit.")
                .with_details(serde_json::json!({
                    "pages": summary.pages,
                    "items": summary.items,
                })));
            }

            let request = self.requests.list(query, cursor.as_deref())?;
            let response = self.transport.send(request).await?;
            if !response.is_success() {
                return Err(ToolError::status("list tasks", response.status, response.body));
            }
            let page = normalize_page(&response.body)?;
            summary.pages += 1;
            summary.items += page.items.len();
            self.logger.debug(
                "Fetched page",
                Some(&serde_json::json!({
                    "page": summary.pages,
                    "items": page.items.len(),
                    "has_more": page.next_cursor.is_some(),
                })),
            );
            consumer.accept(page.items).await?;

            cursor = page.next_cursor;
            let Some(next) = cursor.as_ref() else {
                break;
            };
            if !fetch_all {
                break;
            }
            if !seen.insert(next.clone()) {
                return Err(ToolError::pagination(format!(
                    "Server repeated cursor '{}'; refusing to loop",
                    next
                ))
                .with_details(serde_json::json!({ "pages": summary.pages })));
            }
        }

        Ok(summary)
    }
}
