pub mod artifacts;
pub mod data_path;
pub mod fs_atomic;
pub mod paths;
pub mod suggest;
pub mod template;
pub mod tool_errors;
