// Infrastructure layer: server lifecycle and logging

pub mod logging;
pub mod server;

pub use server::{start_server, ServerConfig, ServerConfigError};
