pub mod http;
pub mod logger;
pub mod run_context;
pub mod settings;
pub mod storage;
pub mod tool_executor;
pub mod validation;
