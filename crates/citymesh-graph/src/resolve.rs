//! Free-text city lookup.
//!
//! Every node's `"name, country"` label is scored against the query and the
//! best-scoring node wins if its score clears the threshold. The scan is
//! linear in the number of nodes; there is no index. Text is compared as
//! given, without case folding or whitespace trimming.

use crate::graph::{CityGraph, NodeId};
use tracing::debug;

/// Scores must be strictly above this for a match.
pub const DEFAULT_THRESHOLD: f64 = 80.0;

/// A string similarity measure scored in `[0, 100]`, 100 meaning identical.
pub trait Similarity {
    fn similarity(&self, a: &str, b: &str) -> f64;
}

impl<F> Similarity for F
where
    F: Fn(&str, &str) -> f64,
{
    fn similarity(&self, a: &str, b: &str) -> f64 {
        self(a, b)
    }
}

/// Levenshtein edit distance normalized by the longer string's length.
#[derive(Debug, Default, Clone, Copy)]
pub struct LevenshteinRatio;

impl Similarity for LevenshteinRatio {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        100.0 * strsim::normalized_levenshtein(a, b)
    }
}

/// Jaro-Winkler similarity, which favours shared prefixes.
#[derive(Debug, Default, Clone, Copy)]
pub struct JaroWinkler;

impl Similarity for JaroWinkler {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        100.0 * strsim::jaro_winkler(a, b)
    }
}

/// Resolves free text to a node of a [`CityGraph`].
#[derive(Debug, Clone)]
pub struct NameResolver<S = LevenshteinRatio> {
    similarity: S,
    threshold: f64,
}

impl Default for NameResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl NameResolver {
    /// Creates a resolver with [`LevenshteinRatio`] and the default threshold.
    pub fn new() -> Self {
        Self::with_similarity(LevenshteinRatio)
    }
}

impl<S: Similarity> NameResolver<S> {
    pub fn with_similarity(similarity: S) -> Self {
        Self {
            similarity,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Replaces the acceptance threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// The highest-scoring node and its score, whatever the score.
    ///
    /// Ties go to the lexicographically smallest city id, so the answer
    /// never depends on node order.
    pub fn best_match(&self, graph: &CityGraph, text: &str) -> Option<(NodeId, f64)> {
        let mut best: Option<(NodeId, f64)> = None;

        for index in graph.node_indexes() {
            let city = &graph.graph[index];
            let score = self.similarity.similarity(&city.label, text);

            let better = match best {
                None => true,
                Some((current, top)) => {
                    score > top || (score == top && city.id < graph.graph[current].id)
                }
            };
            if better {
                best = Some((index, score));
            }
        }

        best
    }

    /// Resolves `text` to a node, or `None` if nothing scores above the
    /// threshold.
    pub fn resolve(&self, graph: &CityGraph, text: &str) -> Option<NodeId> {
        let (index, score) = self.best_match(graph, text)?;
        debug!(
            "Best match for '{}': '{}' ({:.1})",
            text, graph.graph[index].id, score
        );
        (score > self.threshold).then_some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use crate::params::GraphParams;
    use citymesh_core::{CityRecord, LatLon};

    fn graph() -> CityGraph {
        let records = vec![
            CityRecord::new("Barcelona", "es", "Catalonia", 1_600_000, LatLon::new(41.38, 2.17)),
            CityRecord::new("Madrid", "es", "Madrid", 3_200_000, LatLon::new(40.42, -3.70)),
            CityRecord::new("Valencia", "es", "Valencia", 790_000, LatLon::new(39.47, -0.38)),
            CityRecord::new("Valencia", "ve", "Carabobo", 1_400_000, LatLon::new(10.16, -68.0)),
        ];
        let mut builder = GraphBuilder::new(GraphParams::new(300.0, 0));
        builder.add_records(&records);
        builder.build()
    }

    fn resolved_id(graph: &CityGraph, resolver: &NameResolver, text: &str) -> Option<String> {
        resolver
            .resolve(graph, text)
            .and_then(|idx| graph.get(idx))
            .map(|city| city.id.clone())
    }

    #[test]
    fn test_exact_label_resolves() {
        let graph = graph();
        let resolver = NameResolver::new();
        assert_eq!(
            resolved_id(&graph, &resolver, "Barcelona, es").as_deref(),
            Some("Barcelona, es; Catalonia")
        );
    }

    #[test]
    fn test_small_typo_resolves() {
        let graph = graph();
        let resolver = NameResolver::new();
        assert_eq!(
            resolved_id(&graph, &resolver, "Barcelone, es").as_deref(),
            Some("Barcelona, es; Catalonia")
        );
    }

    #[test]
    fn test_unrelated_text_is_not_found() {
        let graph = graph();
        let resolver = NameResolver::new();
        assert_eq!(resolved_id(&graph, &resolver, "Xyzzyxyz"), None);
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let graph = graph();
        let resolver = NameResolver::new();
        // every letter differs in case
        assert_eq!(resolved_id(&graph, &resolver, "MADRID, ES"), None);
    }

    #[test]
    fn test_threshold_is_strict() {
        let graph = graph();
        let constant = |_: &str, _: &str| 80.0;
        let resolver = NameResolver::with_similarity(constant);
        assert!(resolver.resolve(&graph, "anything").is_none());

        let resolver = NameResolver::with_similarity(constant).with_threshold(79.9);
        assert!(resolver.resolve(&graph, "anything").is_some());
    }

    #[test]
    fn test_ties_go_to_smallest_id() {
        let graph = graph();
        let constant = |_: &str, _: &str| 100.0;
        let resolver = NameResolver::with_similarity(constant);

        let index = resolver.resolve(&graph, "anything").unwrap();
        assert_eq!(graph.get(index).unwrap().id, "Barcelona, es; Catalonia");
    }

    #[test]
    fn test_empty_graph() {
        let graph = GraphBuilder::default().build();
        assert!(NameResolver::new().best_match(&graph, "Barcelona, es").is_none());
    }

    #[test]
    fn test_jaro_winkler_scores() {
        let jw = JaroWinkler;
        assert_eq!(jw.similarity("Madrid, es", "Madrid, es"), 100.0);
        assert!(jw.similarity("Madrid, es", "Xyz") < 80.0);
    }
}
