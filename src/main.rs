//! Taskmesh - orchestration and resource-matching engine.
//!
//! Demo wiring: one gateway with a couple of registered resources, a
//! dispatcher with loopback protocol clients, and an orchestrator executing
//! a sample request end to end.

use std::sync::Arc;

use taskmesh_core::config::AppConfig;
use taskmesh_core::types::{ResourceClass, ResourceDescriptor};
use taskmesh_dispatch::{LoopbackInvoker, ProtocolDispatcher};
use taskmesh_orchestrator::Orchestrator;
use taskmesh_registry::{EndpointSchemePredicate, ResourceGateway};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("config load failed ({}), using defaults", e);
        AppConfig::default()
    });

    taskmesh_core::telemetry::configure_tracing(config.telemetry.json_logs)?;
    tracing::info!("Starting Taskmesh v{}", env!("CARGO_PKG_VERSION"));

    // =========================================================================
    // Gateway: capability-indexed resource registry
    // =========================================================================
    let gateway = Arc::new(ResourceGateway::new(
        "demo-gateway",
        "http://localhost:8000",
        config.registry.clone(),
    ));
    gateway.add_predicate(Arc::new(EndpointSchemePredicate::default()));

    gateway
        .register(
            ResourceDescriptor::new("calculator", "http://localhost:9001/calc")
                .with_capabilities(vec!["arithmetic", "math"])
                .with_class(ResourceClass::Tool)
                .with_manifest(serde_json::json!({"tool": "calculator"})),
        )
        .await?;
    gateway
        .register(
            ResourceDescriptor::new("web-searcher", "http://localhost:9002/agent")
                .with_capabilities(vec!["search", "information_retrieval", "web"])
                .with_class(ResourceClass::Agent),
        )
        .await?;

    tracing::info!(resources = gateway.list().await.len(), "Gateway populated");

    // =========================================================================
    // Dispatcher: loopback protocol clients, no remote endpoints needed
    // =========================================================================
    let dispatcher = Arc::new(
        ProtocolDispatcher::new(config.dispatch.clone())
            .with_agent_invoker(Arc::new(LoopbackInvoker))
            .with_tool_invoker(Arc::new(LoopbackInvoker)),
    );

    // =========================================================================
    // Orchestrator
    // =========================================================================
    let orchestrator = Orchestrator::builder("principal")
        .with_config(config.orchestrator.clone())
        .with_dispatcher(dispatcher)
        .build();
    orchestrator.connect_registry(gateway.clone());

    let summary = orchestrator
        .execute("calculate 2+2 and search for cats")
        .await;

    println!("{}", serde_json::to_string_pretty(&summary)?);

    let metrics = gateway.metrics();
    tracing::info!(
        total_queries = metrics.total_queries,
        successful_matches = metrics.successful_matches,
        average_search_time_ms = metrics.average_search_time_ms,
        "Gateway metrics"
    );

    Ok(())
}
