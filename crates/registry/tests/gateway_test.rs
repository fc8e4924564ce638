//! Integration tests for registration, discovery, and ranking.

use std::sync::Arc;

use serde_json::json;
use taskmesh_core::config::RegistryConfig;
use taskmesh_core::mocks::MockPredicate;
use taskmesh_core::types::{InvocationOutcome, ResourceClass, ResourceDescriptor};
use taskmesh_registry::{CapabilityBlocklist, EndpointSchemePredicate, ResourceGateway};

fn gateway() -> ResourceGateway {
    ResourceGateway::new(
        "it-gateway",
        "http://localhost:8000",
        RegistryConfig::default(),
    )
}

fn descriptor(name: &str, caps: Vec<&str>) -> ResourceDescriptor {
    ResourceDescriptor::new(name, "http://localhost:9001")
        .with_capabilities(caps)
        .with_class(ResourceClass::Tool)
        .with_manifest(json!({"tool": name}))
}

#[tokio::test]
async fn test_registration_ids_unique_and_discoverable() {
    let gw = gateway();

    let mut ids = Vec::new();
    for i in 0..25 {
        let id = gw
            .register(descriptor(&format!("res-{}", i), vec!["search", "web"]))
            .await
            .unwrap();
        assert!(
            !ids.contains(&id),
            "registration produced a duplicate id: {}",
            id
        );
        // Immediately discoverable on each capability tag.
        let hits = gw.search(&["web".to_string()]).await.unwrap();
        assert!(hits.iter().any(|r| r.id == id));
        ids.push(id);
    }
}

#[tokio::test]
async fn test_search_is_order_stable() {
    let gw = gateway();
    gw.register(descriptor("alpha", vec!["search"])).await.unwrap();
    gw.register(descriptor("beta", vec!["search", "web"]))
        .await
        .unwrap();
    gw.register(descriptor("gamma", vec!["search"])).await.unwrap();

    let reqs = vec!["search".to_string(), "web".to_string()];
    let first: Vec<String> = gw
        .search(&reqs)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(first.len(), 3);

    for _ in 0..5 {
        let again: Vec<String> = gw
            .search(&reqs)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(again, first, "search order must be stable across calls");
    }
}

#[tokio::test]
async fn test_full_match_outranks_partial_match() {
    let gw = gateway();
    let partial = gw
        .register(descriptor("partial", vec!["data_analysis", "statistics"]))
        .await
        .unwrap();
    let full = gw
        .register(descriptor(
            "full",
            vec!["data_analysis", "statistics", "visualization"],
        ))
        .await
        .unwrap();

    let reqs = vec![
        "data_analysis".to_string(),
        "statistics".to_string(),
        "visualization".to_string(),
    ];
    let hits = gw.search(&reqs).await.unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, full, "3/3 match must rank above 2/3");
    assert_eq!(hits[1].id, partial);
}

#[tokio::test]
async fn test_ties_break_by_registration_order() {
    let gw = gateway();
    let first = gw.register(descriptor("first", vec!["search"])).await.unwrap();
    let second = gw
        .register(descriptor("second", vec!["search"]))
        .await
        .unwrap();

    let hits = gw.search(&["search".to_string()]).await.unwrap();
    assert_eq!(hits[0].id, first);
    assert_eq!(hits[1].id, second);
}

#[tokio::test]
async fn test_fuzzy_requirement_still_surfaces_candidates() {
    let gw = gateway();
    let id = gw
        .register(descriptor("retriever", vec!["information_retrieval"]))
        .await
        .unwrap();

    // Near-synonym requirement tag; no exact index entry exists.
    let hits = gw
        .search(&["information-retrieval".to_string()])
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, id);
}

#[tokio::test]
async fn test_metrics_influence_ranking() {
    let gw = gateway();
    let flaky = gw.register(descriptor("flaky", vec!["search"])).await.unwrap();
    let solid = gw.register(descriptor("solid", vec!["search"])).await.unwrap();

    // Equal coverage; give the later registration much better metrics.
    for _ in 0..4 {
        gw.update_metrics(&flaky, &InvocationOutcome::failure(4000.0))
            .await
            .unwrap();
        gw.update_metrics(&solid, &InvocationOutcome::success(50.0))
            .await
            .unwrap();
    }

    let hits = gw.search(&["search".to_string()]).await.unwrap();
    assert_eq!(hits[0].id, solid, "better metrics must outrank on equal coverage");
}

#[tokio::test]
async fn test_predicates_exclude_candidates() {
    let gw = gateway();
    let safe = gw.register(descriptor("safe", vec!["search"])).await.unwrap();
    let denied = gw
        .register(descriptor("denied", vec!["search"]))
        .await
        .unwrap();

    gw.add_predicate(Arc::new(MockPredicate::denying(vec![denied.as_str()])));

    let hits = gw.search(&["search".to_string()]).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, safe);
}

#[tokio::test]
async fn test_builtin_predicate_chain() {
    let gw = gateway();
    gw.add_predicate(Arc::new(EndpointSchemePredicate::default()));
    gw.add_predicate(Arc::new(CapabilityBlocklist::new(vec!["shell_execution"])));

    gw.register(
        ResourceDescriptor::new("plain", "http://localhost:9001")
            .with_capabilities(vec!["search"]),
    )
    .await
    .unwrap();
    gw.register(
        ResourceDescriptor::new("wss-only", "wss://stream.example.com")
            .with_capabilities(vec!["search"]),
    )
    .await
    .unwrap();
    gw.register(
        ResourceDescriptor::new("shelly", "http://localhost:9002")
            .with_capabilities(vec!["search", "shell_execution"]),
    )
    .await
    .unwrap();

    let hits = gw.search(&["search".to_string()]).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "plain");
}
