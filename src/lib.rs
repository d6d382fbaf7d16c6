//! # Meraki Tools
//!
//! Read-only Meraki Dashboard API operations exposed as tools for a
//! tool-calling runtime.
//!
//! ## Features
//!
//! - **API Client**: Authenticated access to the Dashboard and Workflows APIs
//! - **Dual Auth**: Workflow listing tries Bearer auth, then falls back to the API key
//! - **Tool System**: `Tool` trait, registry and executor for the host runtime
//! - **Failure Isolation**: Every tool returns JSON, failures become `[{"error": "..."}]`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use meraki_tools::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MerakiConfig::from_env()?;
//!
//!     // Build the client once and register the tools
//!     let tools = MerakiTools::new(&config);
//!     let mut registry = ToolRegistry::new();
//!     tools.register(&mut registry);
//!
//!     // Or call an operation directly
//!     let organizations = tools.get_organizations().await;
//!     println!("{}", organizations);
//!
//!     Ok(())
//! }
//! ```
//!

pub mod error;
pub mod meraki;
pub mod tool;

// Re-exports for convenient usage
pub use error::{ConfigError, MerakiError};
pub use meraki::{MerakiClient, MerakiConfig, MerakiConfigBuilder, MerakiTool, MerakiTools, Operation};
pub use tool::{Tool, ToolRegistry, ToolExecutor, ToolCall, ToolCallResult, ToolDefinition, ToolResult, ToolError, DynTool};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::meraki::{MerakiClient, MerakiConfig, MerakiTools};
    pub use crate::tool::{Tool, ToolRegistry, ToolExecutor, ToolResult, ToolError, DynTool};
    pub use crate::error::{ConfigError, MerakiError};
}
