//! Protocol clients.
//!
//! Concrete invokers for the two resource classes: agent-class endpoints
//! receive the task description plus context, tool-class endpoints receive a
//! tool name plus parameters. The wire shapes here are intentionally thin:
//! the dispatcher only relies on responses normalizing into an envelope.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use taskmesh_core::{
    config::DispatchConfig,
    traits::Invoker,
    types::{Envelope, InvokePayload},
    Error, Result,
};

fn build_client(config: &DispatchConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(config.request_timeout_ms))
        .build()
        .map_err(|e| Error::connection(format!("failed to build HTTP client: {}", e)))
}

fn map_reqwest_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::timeout(e.to_string())
    } else {
        Error::connection(e.to_string())
    }
}

/// Turn a remote JSON response into an envelope.
///
/// A top-level `error` field marks failure; anything else is carried as the
/// success value.
fn normalize_response(body: Value) -> Envelope {
    match body.get("error") {
        Some(error) if !error.is_null() => Envelope::failure(
            "RemoteError",
            error
                .as_str()
                .map(String::from)
                .unwrap_or_else(|| error.to_string()),
        ),
        _ => Envelope::success(body),
    }
}

// =============================================================================
// Agent-class client
// =============================================================================

/// HTTP client for agent-class resources.
pub struct HttpAgentInvoker {
    client: reqwest::Client,
}

impl HttpAgentInvoker {
    pub fn new(config: &DispatchConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
        })
    }
}

#[async_trait]
impl Invoker for HttpAgentInvoker {
    fn protocol(&self) -> &str {
        "a2a"
    }

    async fn connect(&self) -> Result<()> {
        // The pooled HTTP client is the connection; nothing to pre-establish.
        Ok(())
    }

    async fn invoke(&self, endpoint: &str, payload: InvokePayload) -> Result<Envelope> {
        let InvokePayload::Agent {
            description,
            context,
        } = payload
        else {
            return Err(Error::internal("agent invoker received a tool payload"));
        };

        let body = json!({
            "task": description,
            "context": context,
        });

        let response = self
            .client
            .post(endpoint)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Ok(Envelope::failure(
                "ConnectionError",
                format!("agent endpoint returned HTTP {}", status),
            ));
        }

        let value: Value = response.json().await.map_err(map_reqwest_error)?;
        Ok(normalize_response(value))
    }
}

// =============================================================================
// Tool-class client
// =============================================================================

/// HTTP client for tool-class resources.
pub struct HttpToolInvoker {
    client: reqwest::Client,
}

impl HttpToolInvoker {
    pub fn new(config: &DispatchConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
        })
    }
}

#[async_trait]
impl Invoker for HttpToolInvoker {
    fn protocol(&self) -> &str {
        "mcp"
    }

    async fn connect(&self) -> Result<()> {
        Ok(())
    }

    async fn invoke(&self, endpoint: &str, payload: InvokePayload) -> Result<Envelope> {
        let InvokePayload::Tool { tool, params } = payload else {
            return Err(Error::internal("tool invoker received an agent payload"));
        };

        let body = json!({
            "tool": tool,
            "params": params,
        });

        let response = self
            .client
            .post(endpoint)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Ok(Envelope::failure(
                "ConnectionError",
                format!("tool endpoint returned HTTP {}", status),
            ));
        }

        let value: Value = response.json().await.map_err(map_reqwest_error)?;
        Ok(normalize_response(value))
    }
}

// =============================================================================
// Loopback client
// =============================================================================

/// Offline invoker that answers locally, echoing what it would have sent.
///
/// Useful for demos and wiring tests where no remote endpoint exists.
pub struct LoopbackInvoker;

#[async_trait]
impl Invoker for LoopbackInvoker {
    fn protocol(&self) -> &str {
        "loopback"
    }

    async fn connect(&self) -> Result<()> {
        Ok(())
    }

    async fn invoke(&self, endpoint: &str, payload: InvokePayload) -> Result<Envelope> {
        let value = match payload {
            InvokePayload::Agent {
                description,
                context,
            } => json!({
                "endpoint": endpoint,
                "executed": description,
                "context": context,
            }),
            InvokePayload::Tool { tool, params } => json!({
                "endpoint": endpoint,
                "tool": tool,
                "params": params,
            }),
        };
        Ok(Envelope::success(value))
    }
}

/// Create a protocol client by name.
pub fn create_invoker(
    protocol: &str,
    config: &DispatchConfig,
) -> Result<std::sync::Arc<dyn Invoker>> {
    match protocol {
        "a2a" => Ok(std::sync::Arc::new(HttpAgentInvoker::new(config)?)),
        "mcp" => Ok(std::sync::Arc::new(HttpToolInvoker::new(config)?)),
        "loopback" => Ok(std::sync::Arc::new(LoopbackInvoker)),
        other => Err(Error::validation(format!(
            "unknown protocol '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_loopback_echoes_agent_payload() {
        let invoker = LoopbackInvoker;
        invoker.connect().await.unwrap();

        let envelope = invoker
            .invoke(
                "http://localhost:9009",
                InvokePayload::Agent {
                    description: "search for cats".into(),
                    context: json!({"query": "cats"}),
                },
            )
            .await
            .unwrap();

        assert!(envelope.ok);
        let value = envelope.value.unwrap();
        assert_eq!(value["executed"], json!("search for cats"));
        assert_eq!(value["endpoint"], json!("http://localhost:9009"));
    }

    #[test]
    fn test_normalize_response_error_field() {
        let env = normalize_response(json!({"error": "remote failed"}));
        assert!(!env.ok);
        assert_eq!(env.error.unwrap().message, "remote failed");

        let env = normalize_response(json!({"result": 4}));
        assert!(env.ok);
    }

    #[test]
    fn test_factory_rejects_unknown_protocol() {
        let config = DispatchConfig::default();
        assert!(create_invoker("a2a", &config).is_ok());
        assert!(create_invoker("mcp", &config).is_ok());
        assert!(create_invoker("loopback", &config).is_ok());
        assert!(create_invoker("carrier-pigeon", &config).is_err());
    }
}
