use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::tool::{ToolDefinition, ToolError, ToolRegistry, ToolResult};

/// A request from the host runtime to run a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Identifier echoed back in the result
    pub id: String,
    /// The tool to run
    pub name: String,
    /// Tool arguments
    #[serde(default)]
    pub arguments: Value,
}

/// The outcome of a tool call. Failures are carried in `output` as the
/// uniform error payload, never as a Rust error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub tool_call_id: String,
    pub output: Value,
    pub is_error: bool,
}

/// Executes tool calls from the host runtime.
#[derive(Debug, Clone)]
pub struct ToolExecutor {
    registry: Arc<Mutex<ToolRegistry>>,
}

impl ToolExecutor {
    /// Creates a new tool executor with the given registry.
    pub fn new(registry: Arc<Mutex<ToolRegistry>>) -> Self {
        Self { registry }
    }

    /// Returns all tool definitions for the host runtime.
    pub async fn get_tool_definitions(&self) -> Vec<ToolDefinition> {
        let registry = self.registry.lock().await;
        registry.to_tool_definitions()
    }

    /// Executes a single tool call.
    pub async fn execute(&self, call: &ToolCall) -> ToolCallResult {
        let registry = self.registry.lock().await;
        let tool = match registry.get(&call.name) {
            Some(tool) => tool.clone(),
            None => {
                let err = ToolError::NotFound(call.name.clone());
                error!(tool = %call.name, error = %err, "Tool execution failed");
                return Self::finish(call, ToolResult::error(err.to_string()));
            }
        };
        drop(registry);

        debug!(tool = %call.name, id = %call.id, "Executing tool");

        let result = match tool.execute(call.arguments.clone()).await {
            Ok(result) => result,
            Err(err) => {
                error!(tool = %call.name, error = %err, "Tool execution failed");
                ToolResult::error(err.to_string())
            }
        };

        Self::finish(call, result)
    }

    /// Executes multiple tool calls in order.
    pub async fn execute_all(&self, calls: &[ToolCall]) -> Vec<ToolCallResult> {
        let mut results = Vec::with_capacity(calls.len());

        for call in calls {
            results.push(self.execute(call).await);
        }

        results
    }

    fn finish(call: &ToolCall, result: ToolResult) -> ToolCallResult {
        ToolCallResult {
            tool_call_id: call.id.clone(),
            is_error: result.is_error(),
            output: result.output,
        }
    }
}
