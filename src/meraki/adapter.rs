use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::error;

use crate::error::{ConfigError, MerakiError};
use crate::meraki::client::MerakiClient;
use crate::meraki::config::MerakiConfig;
use crate::tool::{DynTool, Tool, ToolError, ToolRegistry, ToolResult, error_payload};

/// The operations exposed as tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GetOrganizations,
    GetOrganizationNetworks,
    ListWorkflows,
}

impl Operation {
    /// Every operation, in registration order.
    pub const ALL: [Operation; 3] = [
        Operation::GetOrganizations,
        Operation::GetOrganizationNetworks,
        Operation::ListWorkflows,
    ];

    /// Returns the tool name.
    pub fn name(self) -> &'static str {
        match self {
            Operation::GetOrganizations => "get_organizations",
            Operation::GetOrganizationNetworks => "get_organization_networks",
            Operation::ListWorkflows => "list_workflows",
        }
    }

    /// Returns the description shown to the host runtime.
    pub fn description(self) -> &'static str {
        match self {
            Operation::GetOrganizations => {
                "Retrieves a list of all organizations accessible by the API key."
            }
            Operation::GetOrganizationNetworks => {
                "Retrieves a list of all networks within the configured organization."
            }
            Operation::ListWorkflows => "Retrieves a list of available Meraki Workflows.",
        }
    }

    /// Looks up an operation by tool name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }
}

/// Exposes the Meraki client operations as tools.
///
/// The client is built once from the given configuration. If that fails,
/// the failure is kept and reported by every call instead.
#[derive(Debug, Clone)]
pub struct MerakiTools {
    client: Result<Arc<MerakiClient>, ConfigError>,
}

impl MerakiTools {
    /// Creates the tools from an explicit configuration.
    pub fn new(config: &MerakiConfig) -> Self {
        Self {
            client: MerakiClient::new(config).map(Arc::new),
        }
    }

    /// Creates the tools around an existing client.
    pub fn with_client(client: Arc<MerakiClient>) -> Self {
        Self { client: Ok(client) }
    }

    /// Retrieves all organizations accessible by the API key.
    pub async fn get_organizations(&self) -> Value {
        self.invoke_operation(Operation::GetOrganizations).await
    }

    /// Retrieves the networks of the configured organization.
    pub async fn get_organization_networks(&self) -> Value {
        self.invoke_operation(Operation::GetOrganizationNetworks).await
    }

    /// Retrieves the available workflows.
    pub async fn list_workflows(&self) -> Value {
        self.invoke_operation(Operation::ListWorkflows).await
    }

    /// Invokes a tool by name. Unknown names yield an error payload.
    pub async fn invoke(&self, name: &str) -> Value {
        match Operation::from_name(name) {
            Some(op) => self.invoke_operation(op).await,
            None => {
                error!(tool = %name, "Unknown Meraki tool");
                error_payload(&format!("Unknown tool: {}", name))
            }
        }
    }

    /// Runs an operation and converts any failure into the error payload.
    pub async fn invoke_operation(&self, op: Operation) -> Value {
        self.run_logged(op)
            .await
            .unwrap_or_else(|message| error_payload(&message))
    }

    /// Runs an operation, logging a failure and returning its message.
    async fn run_logged(&self, op: Operation) -> Result<Value, String> {
        self.run(op).await.map_err(|err| {
            error!(tool = op.name(), error = %err, "Error in {} tool", op.name());
            err.to_string()
        })
    }

    async fn run(&self, op: Operation) -> Result<Value, MerakiError> {
        let client = self.client.as_ref().map_err(|e| e.clone())?;
        match op {
            Operation::GetOrganizations => client.list_organizations().await,
            Operation::GetOrganizationNetworks => client.list_networks().await,
            Operation::ListWorkflows => client.list_workflows().await,
        }
    }

    /// Returns the three operations as tools.
    pub fn tools(&self) -> Vec<DynTool> {
        Operation::ALL
            .into_iter()
            .map(|op| Arc::new(MerakiTool::new(self.clone(), op)) as DynTool)
            .collect()
    }

    /// Registers the three operations with a registry.
    pub fn register(&self, registry: &mut ToolRegistry) {
        for tool in self.tools() {
            registry.register(tool);
        }
    }
}

/// A single Meraki operation wrapped as a [`Tool`].
#[derive(Debug, Clone)]
pub struct MerakiTool {
    tools: MerakiTools,
    operation: Operation,
}

impl MerakiTool {
    /// Wraps one operation of the given tools.
    pub fn new(tools: MerakiTools, operation: Operation) -> Self {
        Self { tools, operation }
    }
}

#[async_trait]
impl Tool for MerakiTool {
    fn name(&self) -> &str {
        self.operation.name()
    }

    fn description(&self) -> &str {
        self.operation.description()
    }

    // Arguments are ignored; none of the operations take parameters.
    async fn execute(&self, _args: Value) -> Result<ToolResult, ToolError> {
        Ok(match self.tools.run_logged(self.operation).await {
            Ok(body) => ToolResult::ok(body),
            Err(message) => ToolResult::error(message),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{ToolCall, ToolExecutor, is_error_payload};
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::Mutex;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tools_for_server(server: &MockServer, org_id: Option<&str>) -> MerakiTools {
        let mut builder = MerakiConfig::builder()
            .with_api_key("test-key")
            .with_base_url(server.uri())
            .with_workflows_base_url(server.uri())
            .with_timeout(Duration::from_secs(2));
        if let Some(org_id) = org_id {
            builder = builder.with_org_id(org_id);
        }
        MerakiTools::new(&builder.build())
    }

    fn error_message(value: &Value) -> &str {
        assert!(is_error_payload(value), "not an error payload: {value}");
        value[0]["error"].as_str().unwrap()
    }

    #[tokio::test]
    async fn test_missing_api_key_returns_error_payload() {
        let tools = MerakiTools::new(&MerakiConfig::builder().with_org_id("42").build());

        for op in Operation::ALL {
            let value = tools.invoke_operation(op).await;
            assert!(error_message(&value).contains("MERAKI_API_KEY"));
        }
    }

    #[tokio::test]
    async fn test_missing_org_id_returns_error_payload() {
        let server = MockServer::start().await;
        let tools = tools_for_server(&server, None);

        let networks = tools.get_organization_networks().await;
        assert!(error_message(&networks).contains("organization id"));
        let workflows = tools.list_workflows().await;
        assert!(error_message(&workflows).contains("MERAKI_ORG_ID"));

        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_organizations_returns_body_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/organizations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "1"}])))
            .mount(&server)
            .await;

        let tools = tools_for_server(&server, None);
        assert_eq!(tools.get_organizations().await, json!([{"id": "1"}]));
    }

    #[tokio::test]
    async fn test_upstream_failure_returns_error_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/organizations"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let tools = tools_for_server(&server, None);
        let value = tools.get_organizations().await;
        assert!(error_message(&value).contains("500"));
    }

    #[tokio::test]
    async fn test_list_workflows_falls_back_to_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/organizations/42/workflows"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/organizations/42/workflows"))
            .and(header("X-Cisco-Meraki-API-Key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "wf1"}])))
            .expect(1)
            .mount(&server)
            .await;

        let tools = tools_for_server(&server, Some("42"));
        assert_eq!(tools.list_workflows().await, json!([{"name": "wf1"}]));
    }

    #[tokio::test]
    async fn test_list_workflows_bearer_success_skips_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/organizations/42/workflows"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "wf1"}])))
            .expect(1)
            .mount(&server)
            .await;

        let tools = tools_for_server(&server, Some("42"));
        assert_eq!(tools.list_workflows().await, json!([{"name": "wf1"}]));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_with_client_shares_existing_client() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/organizations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "1"}])))
            .expect(2)
            .mount(&server)
            .await;

        let config = MerakiConfig::builder()
            .with_api_key("test-key")
            .with_base_url(server.uri())
            .build();
        let client = Arc::new(MerakiClient::new(&config).unwrap());
        let tools = MerakiTools::with_client(client.clone());

        assert_eq!(tools.get_organizations().await, json!([{"id": "1"}]));
        assert_eq!(client.list_organizations().await.unwrap(), json!([{"id": "1"}]));
    }

    #[tokio::test]
    async fn test_invoke_by_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/organizations/42/networks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "N_1"}])))
            .mount(&server)
            .await;

        let tools = tools_for_server(&server, Some("42"));
        assert_eq!(
            tools.invoke("get_organization_networks").await,
            json!([{"id": "N_1"}])
        );
        assert_eq!(
            error_message(&tools.invoke("delete_everything").await),
            "Unknown tool: delete_everything"
        );
    }

    #[tokio::test]
    async fn test_registered_tools_run_through_executor() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/organizations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "1"}])))
            .mount(&server)
            .await;

        let mut registry = ToolRegistry::new();
        tools_for_server(&server, None).register(&mut registry);
        assert_eq!(
            registry.names(),
            vec!["get_organization_networks", "get_organizations", "list_workflows"]
        );

        let executor = ToolExecutor::new(Arc::new(Mutex::new(registry)));
        let definitions = executor.get_tool_definitions().await;
        assert!(definitions.iter().all(|def| def.input_schema["properties"] == json!({})));

        let ok = executor
            .execute(&ToolCall {
                id: "1".to_string(),
                name: "get_organizations".to_string(),
                arguments: json!({}),
            })
            .await;
        assert!(!ok.is_error);
        assert_eq!(ok.output, json!([{"id": "1"}]));

        let failed = executor
            .execute(&ToolCall {
                id: "2".to_string(),
                name: "list_workflows".to_string(),
                arguments: json!({}),
            })
            .await;
        assert!(failed.is_error);
        assert!(error_message(&failed.output).contains("MERAKI_ORG_ID"));
    }
}
