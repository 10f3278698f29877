//! Hierarchy Expansion
//!
//! Depth-first descent over the breakdown relation from a root CU to its
//! terminal (stock code) edges. The walk keeps an explicit stack of frames
//! instead of recursing, and tracks the ids on the active path so a cycle in the
//! source data surfaces as `CyclicHierarchy` rather than running forever.
//!
//! Output order is pre-order by registry order: each top-level edge contributes
//! either itself (terminal) or the full expansion of its child, before the next
//! sibling is visited.

use crate::error::{LookupError, Result};
use crate::relations::{ComponentEdge, ComponentRegistry, EdgeKind};
use std::collections::HashSet;
use tracing::{debug, warn};

/// One component being expanded: its id and the next sibling edge to visit
struct Frame<'e, 'i> {
    id: &'i str,
    edges: &'e [ComponentEdge],
    next: usize,
}

pub struct HierarchyExpander<'a> {
    registry: &'a ComponentRegistry,
}

impl<'a> HierarchyExpander<'a> {
    pub fn new(registry: &'a ComponentRegistry) -> Self {
        Self { registry }
    }

    /// Expand `root_id` into its terminal edges. An unknown root yields an empty
    /// result.
    pub fn expand(&self, root_id: &str) -> Result<Vec<&'a ComponentEdge>> {
        let Some(root_edges) = self.registry.edges(root_id) else {
            debug!("CU {} has no breakdown rows", root_id);
            return Ok(Vec::new());
        };

        let mut terminals = Vec::new();
        let mut on_path: HashSet<&str> = HashSet::new();
        on_path.insert(root_id);
        let mut stack = vec![Frame {
            id: root_id,
            edges: root_edges,
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let edges = frame.edges;
            let Some(edge) = edges.get(frame.next) else {
                on_path.remove(frame.id);
                stack.pop();
                continue;
            };
            frame.next += 1;

            match edge.kind() {
                EdgeKind::Terminal(_) => terminals.push(edge),
                EdgeKind::Descend(child) => {
                    if on_path.contains(child) {
                        let mut path: Vec<String> = stack.iter().map(|f| f.id.to_string()).collect();
                        path.push(child.to_string());
                        warn!("Cycle in breakdown data at {}", child);
                        return Err(LookupError::CyclicHierarchy {
                            id: child.to_string(),
                            path,
                        });
                    }
                    if let Some(child_edges) = self.registry.edges(child) {
                        on_path.insert(child);
                        stack.push(Frame {
                            id: child,
                            edges: child_edges,
                            next: 0,
                        });
                    }
                }
                EdgeKind::DeadEnd => {}
            }
        }

        debug!("CU {} expanded to {} stock code rows", root_id, terminals.len());
        Ok(terminals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(parent: &str, child: Option<&str>, leaf: Option<&str>, qty: Option<f64>) -> ComponentEdge {
        ComponentEdge::new(parent, child, leaf, qty)
    }

    fn leaves(result: &[&ComponentEdge]) -> Vec<(String, Option<f64>)> {
        result
            .iter()
            .map(|e| (e.leaf_id.clone().unwrap_or_default(), e.quantity))
            .collect()
    }

    #[test]
    fn test_two_level_expansion() {
        let registry = ComponentRegistry::from_edges(vec![
            edge("10", Some("20"), None, None),
            edge("20", None, Some("500"), Some(3.0)),
            edge("20", None, Some("501"), Some(1.0)),
        ]);
        let result = HierarchyExpander::new(&registry).expand("10").unwrap();
        assert_eq!(
            leaves(&result),
            vec![("500".to_string(), Some(3.0)), ("501".to_string(), Some(1.0))]
        );
        assert_eq!(result[0].parent_id, "20");
    }

    #[test]
    fn test_unknown_root_is_empty() {
        let registry = ComponentRegistry::from_edges(vec![edge("10", None, Some("1"), None)]);
        let expander = HierarchyExpander::new(&registry);
        assert!(expander.expand("missing").unwrap().is_empty());
        assert!(expander.expand("").unwrap().is_empty());
    }

    #[test]
    fn test_preorder_interleaves_siblings_and_children() {
        let registry = ComponentRegistry::from_edges(vec![
            edge("A", None, Some("1"), None),
            edge("A", Some("B"), None, None),
            edge("A", None, Some("4"), None),
            edge("B", None, Some("2"), None),
            edge("B", Some("C"), None, None),
            edge("C", None, Some("3"), None),
        ]);
        let result = HierarchyExpander::new(&registry).expand("A").unwrap();
        let ids: Vec<_> = leaves(&result).into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_leaf_wins_over_child() {
        let registry = ComponentRegistry::from_edges(vec![
            edge("A", Some("B"), Some("9"), Some(2.0)),
            edge("B", None, Some("should-not-appear"), None),
        ]);
        let result = HierarchyExpander::new(&registry).expand("A").unwrap();
        assert_eq!(leaves(&result), vec![("9".to_string(), Some(2.0))]);
    }

    #[test]
    fn test_dead_ends_and_unknown_children_contribute_nothing() {
        let registry = ComponentRegistry::from_edges(vec![
            edge("A", None, None, Some(5.0)),
            edge("A", Some("nowhere"), None, None),
            edge("A", None, Some("7"), None),
        ]);
        let result = HierarchyExpander::new(&registry).expand("A").unwrap();
        assert_eq!(leaves(&result), vec![("7".to_string(), None)]);
    }

    #[test]
    fn test_shared_subcomponent_expanded_each_time() {
        let registry = ComponentRegistry::from_edges(vec![
            edge("A", Some("B"), None, None),
            edge("A", Some("C"), None, None),
            edge("B", Some("D"), None, None),
            edge("C", Some("D"), None, None),
            edge("D", None, Some("1"), None),
        ]);
        let result = HierarchyExpander::new(&registry).expand("A").unwrap();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_two_node_cycle_is_reported() {
        let registry = ComponentRegistry::from_edges(vec![
            edge("A", Some("B"), None, None),
            edge("B", Some("A"), None, None),
        ]);
        let err = HierarchyExpander::new(&registry).expand("A").unwrap_err();
        match err {
            LookupError::CyclicHierarchy { id, path } => {
                assert_eq!(id, "A");
                assert_eq!(path, vec!["A", "B", "A"]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_self_loop_is_reported() {
        let registry = ComponentRegistry::from_edges(vec![
            edge("A", None, Some("1"), None),
            edge("A", Some("A"), None, None),
        ]);
        let err = HierarchyExpander::new(&registry).expand("A").unwrap_err();
        assert!(matches!(err, LookupError::CyclicHierarchy { ref id, .. } if id == "A"));
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let depth = 50_000;
        let mut edges: Vec<ComponentEdge> = (0..depth)
            .map(|i| edge(&i.to_string(), Some(&(i + 1).to_string()), None, None))
            .collect();
        edges.push(edge(&depth.to_string(), None, Some("bottom"), None));
        let registry = ComponentRegistry::from_edges(edges);

        let result = HierarchyExpander::new(&registry).expand("0").unwrap();
        assert_eq!(leaves(&result), vec![("bottom".to_string(), None)]);
    }

    #[test]
    fn test_expansion_is_deterministic() {
        let registry = ComponentRegistry::from_edges(vec![
            edge("R", Some("X"), None, None),
            edge("R", None, Some("5"), None),
            edge("X", None, Some("6"), None),
            edge("X", None, Some("7"), None),
        ]);
        let expander = HierarchyExpander::new(&registry);
        let first = expander.expand("R").unwrap();
        let second = expander.expand("R").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_every_result_has_a_leaf() {
        let registry = ComponentRegistry::from_edges(vec![
            edge("R", Some("X"), None, None),
            edge("R", None, None, None),
            edge("X", Some("Y"), Some("8"), None),
            edge("X", None, Some("9"), None),
        ]);
        let result = HierarchyExpander::new(&registry).expand("R").unwrap();
        assert!(result.iter().all(|e| e.leaf_id.is_some()));
    }
}
