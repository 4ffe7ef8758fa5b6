// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod activity;
pub mod app_dirs;
pub mod backend;
pub mod config;
pub mod drill;
pub mod history;
pub mod prompts;
pub mod scoring;
pub mod session;
