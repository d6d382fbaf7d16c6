use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use meraki_tools::{
    MerakiConfig, MerakiConfigBuilder, MerakiTools, ToolCall, ToolExecutor, ToolRegistry,
};

/// Run read-only Meraki API tools from the command line.
#[derive(Debug, Parser)]
#[command(name = "meraki-tools", version, about)]
struct Cli {
    /// Path of the .env file to load
    #[arg(long, global = true, default_value = ".env")]
    env_file: PathBuf,

    /// Organization id, overrides MERAKI_ORG_ID
    #[arg(long, global = true)]
    org_id: Option<String>,

    /// Request timeout in seconds, overrides MERAKI_TIMEOUT_SECS
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Disable TLS certificate verification
    #[arg(long, global = true)]
    insecure: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the available tool definitions
    List,
    /// Run a tool and print its JSON result
    Call {
        /// Tool name, e.g. get_organizations
        tool: String,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<MerakiConfig> {
    let config = MerakiConfig::from_env_file(&cli.env_file)
        .with_context(|| format!("loading configuration from {}", cli.env_file.display()))?;

    let mut builder = MerakiConfigBuilder::from_config(config);
    if let Some(org_id) = &cli.org_id {
        builder = builder.with_org_id(org_id.clone());
    }
    if let Some(secs) = cli.timeout {
        builder = builder.with_timeout(Duration::from_secs(secs));
    }
    if cli.insecure {
        builder = builder.accept_invalid_certs(true);
    }

    Ok(builder.build())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr, stdout carries the JSON output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    tracing::debug!(?config, "Loaded configuration");

    let mut registry = ToolRegistry::new();
    MerakiTools::new(&config).register(&mut registry);
    let executor = ToolExecutor::new(Arc::new(Mutex::new(registry)));

    match cli.command {
        Command::List => {
            let definitions = executor.get_tool_definitions().await;
            println!("{}", serde_json::to_string_pretty(&definitions)?);
        }
        Command::Call { tool } => {
            let call = ToolCall {
                id: "cli".to_string(),
                name: tool,
                arguments: serde_json::json!({}),
            };
            let result = executor.execute(&call).await;
            println!("{}", serde_json::to_string_pretty(&result.output)?);
        }
    }

    Ok(())
}
