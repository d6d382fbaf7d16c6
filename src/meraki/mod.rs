pub mod adapter;
pub mod client;
pub mod config;

pub use adapter::{MerakiTool, MerakiTools, Operation};
pub use client::{AuthAttempt, AuthMethod, MerakiClient, API_KEY_HEADER};
pub use config::{Credentials, MerakiConfig, MerakiConfigBuilder, DEFAULT_BASE_URL, DEFAULT_WORKFLOWS_BASE_URL};
