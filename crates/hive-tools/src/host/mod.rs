//! Host tools handed to the default worker agents

pub mod fetch_page;
pub mod save_file;
pub mod shell;

pub use fetch_page::FetchPageTool;
pub use save_file::SaveCodeTool;
pub use shell::ShellTool;
