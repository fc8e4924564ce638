//! End-to-end tests wiring gateway, dispatcher, and orchestrator together.

use std::sync::Arc;

use serde_json::json;
use taskmesh_core::config::{AppConfig, DispatchConfig};
use taskmesh_core::types::{OperationalMode, ResourceClass, ResourceDescriptor, TaskStatus};
use taskmesh_dispatch::{LoopbackInvoker, ProtocolDispatcher};
use taskmesh_orchestrator::Orchestrator;
use taskmesh_registry::{EndpointSchemePredicate, ResourceGateway};

async fn wired_system() -> (Arc<ResourceGateway>, Orchestrator) {
    let config = AppConfig::default();

    let gateway = Arc::new(ResourceGateway::new(
        "system-gateway",
        "http://localhost:8000",
        config.registry.clone(),
    ));
    gateway.add_predicate(Arc::new(EndpointSchemePredicate::default()));

    gateway
        .register(
            ResourceDescriptor::new("calculator", "http://localhost:9001/calc")
                .with_capabilities(vec!["arithmetic", "math"])
                .with_class(ResourceClass::Tool)
                .with_manifest(json!({"tool": "calculator"})),
        )
        .await
        .unwrap();
    gateway
        .register(
            ResourceDescriptor::new("web-searcher", "http://localhost:9002/agent")
                .with_capabilities(vec!["search", "information_retrieval"])
                .with_class(ResourceClass::Agent),
        )
        .await
        .unwrap();
    gateway
        .register(
            ResourceDescriptor::new("generalist", "http://localhost:9003/agent")
                .with_capabilities(vec!["general"])
                .with_class(ResourceClass::Agent),
        )
        .await
        .unwrap();

    let dispatcher = Arc::new(
        ProtocolDispatcher::new(DispatchConfig::default())
            .with_agent_invoker(Arc::new(LoopbackInvoker))
            .with_tool_invoker(Arc::new(LoopbackInvoker)),
    );

    let orchestrator = Orchestrator::builder("system")
        .with_config(config.orchestrator.clone())
        .with_dispatcher(dispatcher)
        .build();
    orchestrator.connect_registry(gateway.clone());

    (gateway, orchestrator)
}

#[tokio::test]
async fn test_compound_request_decomposes_and_completes() {
    let (_gateway, orchestrator) = wired_system().await;

    let summary = orchestrator
        .execute("calculate 2+2 and search for cats")
        .await;

    assert_eq!(summary.tasks_executed, 2);
    assert_eq!(summary.mode, OperationalMode::Agent);
    assert!(summary.results.iter().all(|r| r["ok"] == json!(true)));

    let history = orchestrator.history().await;
    let tasks = &history[0].tasks;
    assert_eq!(tasks[0].requirements, vec!["arithmetic", "math"]);
    assert_eq!(
        tasks[1].requirements,
        vec!["search", "information_retrieval"]
    );
    assert!(tasks.iter().all(|t| t.status == TaskStatus::Completed));
    assert!(tasks.iter().all(|t| t.assigned_resource.is_some()));
}

#[tokio::test]
async fn test_unmatched_request_falls_back_to_generalist() {
    let (_gateway, orchestrator) = wired_system().await;

    let summary = orchestrator.execute("hello there").await;

    assert_eq!(summary.tasks_executed, 1);
    let history = orchestrator.history().await;
    let task = &history[0].tasks[0];
    assert_eq!(task.requirements, vec!["general"]);
    assert_eq!(task.description, "hello there");
    assert_eq!(task.status, TaskStatus::Completed);
}

#[tokio::test]
async fn test_repeat_requests_use_the_local_pool() {
    let (gateway, orchestrator) = wired_system().await;

    orchestrator.execute("calculate 2+2").await;
    let queries_after_first = gateway.metrics().total_queries;
    assert!(queries_after_first > 0);

    orchestrator.execute("calculate 6*7").await;
    assert_eq!(
        gateway.metrics().total_queries,
        queries_after_first,
        "second request must be served from the local pool"
    );

    // Both executions completed and were recorded.
    let history = orchestrator.history().await;
    assert_eq!(history.len(), 2);
    assert!(history
        .iter()
        .all(|record| record.tasks[0].status == TaskStatus::Completed));
}

#[tokio::test]
async fn test_summary_mode_tracks_runtime_switch() {
    let (_gateway, orchestrator) = wired_system().await;

    orchestrator.set_mode(OperationalMode::Hybrid);
    let summary = orchestrator.execute("calculate 2+2").await;
    assert_eq!(summary.mode, OperationalMode::Hybrid);
}
