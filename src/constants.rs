pub mod api {
    pub const DEFAULT_BASE_URL: &str = "https://api.todoist.com/api/v1";
    pub const TASKS_PATH: &str = "tasks";
    pub const FILTER_PATH: &str = "filter";
    pub const CLOSE_PATH: &str = "close";
    pub const CONTENT_TYPE: &str = "application/json";
    pub const USER_AGENT: &str = concat!("todoist-tasks/", env!("CARGO_PKG_VERSION"));
}

pub mod network {
    pub const TIMEOUT_API_REQUEST_MS: u64 = 30_000;
    pub const TIMEOUT_CONNECTION_MS: u64 = 5_000;
}

pub mod pagination {
    pub const MAX_PAGES: usize = 1_000;
    pub const ITEM_KEYS: &[&str] = &["results", "items", "data"];
    pub const CURSOR_KEY: &str = "next_cursor";
}

pub mod priority {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 4;
}

pub mod protocols {
    pub const ALLOWED_HTTP: &[&str] = &["http:", "https:"];
}
