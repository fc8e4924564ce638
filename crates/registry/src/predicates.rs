//! Built-in security and compliance predicates.

use url::Url;

use taskmesh_core::{traits::ResourcePredicate, types::Resource};

/// Rejects resources whose endpoint scheme is not on the allowed list.
pub struct EndpointSchemePredicate {
    allowed: Vec<String>,
}

impl EndpointSchemePredicate {
    /// Allow only the given URL schemes.
    pub fn new(allowed: Vec<&str>) -> Self {
        Self {
            allowed: allowed.into_iter().map(|s| s.to_lowercase()).collect(),
        }
    }
}

impl Default for EndpointSchemePredicate {
    fn default() -> Self {
        Self::new(vec!["http", "https"])
    }
}

impl ResourcePredicate for EndpointSchemePredicate {
    fn name(&self) -> &str {
        "endpoint_scheme"
    }

    fn allow(&self, resource: &Resource, _requirements: &[String]) -> bool {
        match Url::parse(&resource.endpoint) {
            Ok(url) => self.allowed.iter().any(|s| s == url.scheme()),
            Err(_) => false,
        }
    }
}

/// Rejects resources advertising any blocklisted capability tag.
pub struct CapabilityBlocklist {
    denied: Vec<String>,
}

impl CapabilityBlocklist {
    pub fn new(denied: Vec<&str>) -> Self {
        Self {
            denied: denied.into_iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ResourcePredicate for CapabilityBlocklist {
    fn name(&self) -> &str {
        "capability_blocklist"
    }

    fn allow(&self, resource: &Resource, _requirements: &[String]) -> bool {
        !self
            .denied
            .iter()
            .any(|tag| resource.has_capability(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::collections::HashMap;
    use taskmesh_core::types::ResourceClass;

    fn resource(endpoint: &str, caps: Vec<&str>) -> Resource {
        Resource {
            id: "r".into(),
            name: "r".into(),
            capabilities: caps.into_iter().map(String::from).collect(),
            endpoint: endpoint.into(),
            class: ResourceClass::Tool,
            manifest: Value::Null,
            registry_id: "g".into(),
            metrics: HashMap::new(),
        }
    }

    #[test]
    fn test_scheme_predicate() {
        let predicate = EndpointSchemePredicate::default();
        assert!(predicate.allow(&resource("https://api.example.com", vec!["x"]), &[]));
        assert!(!predicate.allow(&resource("ftp://files.example.com", vec!["x"]), &[]));
        assert!(!predicate.allow(&resource("not a url", vec!["x"]), &[]));
    }

    #[test]
    fn test_capability_blocklist() {
        let predicate = CapabilityBlocklist::new(vec!["shell_execution"]);
        assert!(predicate.allow(&resource("http://h", vec!["search"]), &[]));
        assert!(!predicate.allow(
            &resource("http://h", vec!["search", "shell_execution"]),
            &[]
        ));
    }
}
