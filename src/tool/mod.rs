pub mod registry;
pub mod executor;

pub use registry::ToolRegistry;
pub use executor::{ToolExecutor, ToolCall, ToolCallResult};
pub use tool_types::{ToolDefinition, ToolResult, ToolError, error_payload, is_error_payload};
pub use tool_trait::Tool;
pub use tool_trait::DynTool;

mod tool_types {
    use serde::{Deserialize, Serialize};
    use serde_json::Value;

    /// Definition of a tool exposed to the host runtime.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ToolDefinition {
        /// The name of the tool
        pub name: String,
        /// A description of what the tool does
        pub description: String,
        /// JSON Schema for the tool's input parameters
        pub input_schema: Value,
    }

    /// The result of executing a tool.
    #[derive(Debug, Clone, PartialEq)]
    pub struct ToolResult {
        /// The JSON value returned to the caller
        pub output: Value,
        /// Error message if the tool execution failed
        pub error: Option<String>,
    }

    impl ToolResult {
        /// Creates a successful result.
        pub fn ok(output: Value) -> Self {
            Self {
                output,
                error: None,
            }
        }

        /// Creates a failed result carrying the uniform error payload.
        pub fn error(error: impl Into<String>) -> Self {
            let error = error.into();
            Self {
                output: error_payload(&error),
                error: Some(error),
            }
        }

        /// Returns whether this result is an error.
        pub fn is_error(&self) -> bool {
            self.error.is_some()
        }
    }

    /// Builds the `[{"error": message}]` payload returned by failed tools.
    pub fn error_payload(message: &str) -> Value {
        serde_json::json!([{ "error": message }])
    }

    /// Returns whether a value has the shape of an error payload.
    pub fn is_error_payload(value: &Value) -> bool {
        match value.as_array().map(Vec::as_slice) {
            Some([Value::Object(entry)]) => {
                entry.len() == 1 && entry.get("error").is_some_and(Value::is_string)
            }
            _ => false,
        }
    }

    /// Errors that can occur when executing a tool.
    #[derive(Debug, thiserror::Error)]
    pub enum ToolError {
        #[error("Invalid arguments: {0}")]
        InvalidArguments(String),
        #[error("Tool not found: {0}")]
        NotFound(String),
    }
}

mod tool_trait {
    use super::tool_types::{ToolDefinition, ToolResult, ToolError};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Arc;

    /// Trait representing a tool that can be called by the host runtime.
    #[async_trait]
    pub trait Tool: Send + Sync {
        /// Returns the name of the tool.
        fn name(&self) -> &str;
        /// Returns a description of what the tool does.
        fn description(&self) -> &str;
        /// Returns the JSON Schema for the tool's input parameters.
        fn parameters_schema(&self) -> Value {
            serde_json::json!({
                "type": "object",
                "properties": {}
            })
        }

        /// Executes the tool with the given arguments.
        async fn execute(&self, args: Value) -> Result<ToolResult, ToolError>;

        /// Converts the tool to its definition.
        fn to_definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: self.name().to_string(),
                description: self.description().to_string(),
                input_schema: self.parameters_schema(),
            }
        }
    }

    /// A type alias for a dynamic tool reference.
    pub type DynTool = Arc<dyn Tool>;
}
