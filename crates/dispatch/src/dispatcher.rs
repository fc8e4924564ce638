//! Protocol dispatcher.
//!
//! One invoker is registered per resource class. Connections are established
//! lazily on first use and reused afterwards; every failure mode is captured
//! in the returned envelope so a dispatch can never crash the orchestrator.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::Mutex;

use taskmesh_core::{
    config::DispatchConfig,
    traits::Invoker,
    types::{Envelope, InvokePayload, Resource, ResourceClass, Task},
};

struct InvokerSlot {
    invoker: Arc<dyn Invoker>,
    connected: Mutex<bool>,
}

/// Routes invocations to the protocol client matching the resource class.
pub struct ProtocolDispatcher {
    slots: DashMap<String, Arc<InvokerSlot>>,
    config: DispatchConfig,
}

impl ProtocolDispatcher {
    /// Create a dispatcher with no invokers registered.
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            slots: DashMap::new(),
            config,
        }
    }

    /// Register the invoker for agent-class resources.
    pub fn with_agent_invoker(self, invoker: Arc<dyn Invoker>) -> Self {
        self.register_invoker(ResourceClass::Agent, invoker);
        self
    }

    /// Register the invoker for tool-class resources.
    pub fn with_tool_invoker(self, invoker: Arc<dyn Invoker>) -> Self {
        self.register_invoker(ResourceClass::Tool, invoker);
        self
    }

    /// Register an invoker for a resource class.
    pub fn register_invoker(&self, class: ResourceClass, invoker: Arc<dyn Invoker>) {
        tracing::info!(class = %class, protocol = %invoker.protocol(), "Registering invoker");
        self.slots.insert(
            class.to_string(),
            Arc::new(InvokerSlot {
                invoker,
                connected: Mutex::new(false),
            }),
        );
    }

    /// Invoke `resource` for `task` with the configured default timeout.
    pub async fn invoke(&self, resource: &Resource, task: &Task) -> Envelope {
        self.invoke_with_timeout(
            resource,
            task,
            Duration::from_millis(self.config.request_timeout_ms),
        )
        .await
    }

    /// Invoke `resource` for `task`, bounding the call to `timeout`.
    ///
    /// Always returns an envelope: unknown classes, connection failures,
    /// timeouts, and invoker errors are all reported as `{ok: false}`.
    pub async fn invoke_with_timeout(
        &self,
        resource: &Resource,
        task: &Task,
        timeout: Duration,
    ) -> Envelope {
        // Single dispatch point over the closed class set.
        let payload = match &resource.class {
            ResourceClass::Agent => InvokePayload::Agent {
                description: task.description.clone(),
                context: task.context.clone(),
            },
            ResourceClass::Tool => InvokePayload::Tool {
                tool: tool_name(resource),
                params: task.context.clone(),
            },
            ResourceClass::Other(class) => {
                tracing::warn!(resource = %resource.id, class = %class, "Unsupported resource class");
                return Envelope::failure(
                    "UnsupportedResourceClass",
                    format!("no protocol for resource class '{}'", class),
                );
            }
        };

        let Some(slot) = self
            .slots
            .get(&resource.class.to_string())
            .map(|e| e.value().clone())
        else {
            return Envelope::failure(
                "UnsupportedResourceClass",
                format!("no invoker registered for class '{}'", resource.class),
            );
        };

        if let Err(e) = ensure_connected(&slot).await {
            tracing::warn!(resource = %resource.id, error = %e, "Invoker connection failed");
            return Envelope::failure("ConnectionError", e.to_string());
        }

        tracing::debug!(
            resource = %resource.id,
            endpoint = %resource.endpoint,
            protocol = %slot.invoker.protocol(),
            "Dispatching invocation"
        );

        match tokio::time::timeout(timeout, slot.invoker.invoke(&resource.endpoint, payload)).await
        {
            Ok(Ok(envelope)) => envelope,
            Ok(Err(e)) => Envelope::from_error(&e),
            Err(_) => Envelope::failure(
                "TimeoutError",
                format!("invocation exceeded {}ms", timeout.as_millis()),
            ),
        }
    }
}

/// Establish the slot's connection once; later calls reuse it.
async fn ensure_connected(slot: &InvokerSlot) -> taskmesh_core::Result<()> {
    let mut connected = slot.connected.lock().await;
    if !*connected {
        slot.invoker.connect().await?;
        *connected = true;
    }
    Ok(())
}

/// Tool name for tool-class invocations: explicit manifest entry, else the
/// resource's display name.
fn tool_name(resource: &Resource) -> String {
    resource
        .manifest
        .get("tool")
        .and_then(Value::as_str)
        .unwrap_or(&resource.name)
        .to_string()
}
