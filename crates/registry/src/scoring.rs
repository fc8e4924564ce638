//! Capability relevance scoring.
//!
//! Exact tag matches dominate; fuzzy similarity and performance metrics only
//! break ties between candidates with equal exact coverage.

use std::collections::HashSet;

use taskmesh_core::types::{metric, RegisteredResource};

/// Similarity between two capability strings, in `0..=1`.
///
/// Exact matches (case-insensitive) score 1.0. Otherwise the score is the
/// larger of token-overlap (Jaccard over `_`/`-`/whitespace-separated tokens)
/// and normalized Levenshtein similarity, so both `information_retrieval` vs
/// `retrieval` and `analyse` vs `analyze` land in usable range.
pub fn capability_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a == b {
        return 1.0;
    }

    fn tokens(s: &str) -> HashSet<&str> {
        s.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .collect()
    }

    let ta = tokens(&a);
    let tb = tokens(&b);
    let overlap = if ta.is_empty() || tb.is_empty() {
        0.0
    } else {
        let inter = ta.intersection(&tb).count() as f64;
        let union = ta.union(&tb).count() as f64;
        inter / union
    };

    overlap.max(strsim::normalized_levenshtein(&a, &b))
}

/// Relevance of a registered resource for a requirement set.
///
/// Per requirement: +1.0 for an exact capability match, else +0.5 × the best
/// fuzzy similarity when it reaches `similarity_threshold`. A bounded
/// performance bonus (≤ 0.3) favors high success rates and low response
/// times. The weights guarantee that an additional exact match always
/// outranks any combination of fuzzy and performance contributions.
pub fn relevance_score(
    entry: &RegisteredResource,
    requirements: &[String],
    similarity_threshold: f64,
) -> f64 {
    let resource = &entry.resource;
    let mut score = 0.0;

    for req in requirements {
        if resource.has_capability(req) {
            score += 1.0;
        } else {
            let best = resource
                .capabilities
                .iter()
                .map(|cap| capability_similarity(cap, req))
                .fold(0.0, f64::max);
            if best >= similarity_threshold {
                score += 0.5 * best;
            }
        }
    }

    let success_rate = resource.metric(metric::SUCCESS_RATE).unwrap_or(100.0);
    let avg_response = resource.metric(metric::AVG_RESPONSE_TIME).unwrap_or(0.0);
    score += (success_rate / 100.0) * 0.2;
    score += 0.1 / (1.0 + avg_response / 1000.0);

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::Value;
    use std::collections::HashMap;
    use taskmesh_core::types::{Resource, ResourceClass};

    fn entry(caps: Vec<&str>, metrics: HashMap<String, f64>) -> RegisteredResource {
        RegisteredResource::new(
            Resource {
                id: "r".into(),
                name: "r".into(),
                capabilities: caps.into_iter().map(String::from).collect(),
                endpoint: "http://localhost:1".into(),
                class: ResourceClass::Tool,
                manifest: Value::Null,
                registry_id: "g".into(),
                metrics,
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_similarity_exact_and_fuzzy() {
        assert_eq!(capability_similarity("search", "Search"), 1.0);
        assert!(capability_similarity("information_retrieval", "retrieval") > 0.4);
        assert!(capability_similarity("analyse", "analyze") > 0.7);
        assert!(capability_similarity("search", "arithmetic") < 0.4);
    }

    #[test]
    fn test_exact_matches_dominate() {
        let reqs: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
        let full = entry(vec!["a", "b", "c"], HashMap::new());
        let partial = entry(vec!["a", "b"], HashMap::new());

        // Give the partial match perfect metrics; it still must lose.
        let mut good_metrics = HashMap::new();
        good_metrics.insert(metric::SUCCESS_RATE.to_string(), 100.0);
        good_metrics.insert(metric::AVG_RESPONSE_TIME.to_string(), 0.0);
        let partial_good = entry(vec!["a", "b"], good_metrics);

        assert!(relevance_score(&full, &reqs, 0.6) > relevance_score(&partial, &reqs, 0.6));
        assert!(relevance_score(&full, &reqs, 0.6) > relevance_score(&partial_good, &reqs, 0.6));
    }

    #[test]
    fn test_performance_breaks_ties() {
        let reqs: Vec<String> = vec!["a".into()];
        let mut fast = HashMap::new();
        fast.insert(metric::SUCCESS_RATE.to_string(), 100.0);
        fast.insert(metric::AVG_RESPONSE_TIME.to_string(), 50.0);
        let mut slow = HashMap::new();
        slow.insert(metric::SUCCESS_RATE.to_string(), 60.0);
        slow.insert(metric::AVG_RESPONSE_TIME.to_string(), 4000.0);

        let fast = entry(vec!["a"], fast);
        let slow = entry(vec!["a"], slow);
        assert!(relevance_score(&fast, &reqs, 0.6) > relevance_score(&slow, &reqs, 0.6));
    }
}
