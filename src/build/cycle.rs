//! Cycle detection over the target graph.
//!
//! The walk uses the graph's `seen` marks and clears every mark after each
//! child returns, at every depth. It therefore only notices a cycle that
//! closes on an ancestor before a sibling subtree at the same level has
//! finished, and a level reports whatever its last child reported. A cycle
//! found under an earlier child is masked by a later acyclic sibling.
//!
//! Reaching a node that is still open on the walk is always reported as a
//! repetition, even when its mark was cleared by a reset deeper down; the
//! mark-only walk would otherwise recurse forever on such graphs.

use crate::graph::{Digraph, NodeId};

/// Whether the walk from `root` runs into a repeated node.
///
/// All `seen` marks are cleared before and after the walk.
///
/// # Examples
///
/// ```
/// use mymake::build::detect_cycle;
/// use mymake::graph::Digraph;
///
/// let mut graph = Digraph::new();
/// let a = graph.add_node("a".to_owned());
/// let b = graph.add_node("b".to_owned());
/// graph.add_link(a, b);
/// assert!(!detect_cycle(&mut graph, a));
/// graph.add_link(b, a);
/// assert!(detect_cycle(&mut graph, a));
/// ```
pub fn detect_cycle<T>(graph: &mut Digraph<T>, root: NodeId) -> bool {
    graph.reset_seen();
    let mut open = Vec::new();
    let found = walk(graph, root, &mut open);
    graph.reset_seen();
    found
}

fn walk<T>(graph: &mut Digraph<T>, node: NodeId, open: &mut Vec<NodeId>) -> bool {
    if graph.is_seen(node) || open.contains(&node) {
        return true;
    }
    graph.set_seen(node, true);
    open.push(node);
    let children = graph.children(node).to_vec();
    let mut found = false;
    for child in children {
        found = walk(graph, child, open);
        graph.reset_seen();
    }
    open.pop();
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn graph_of(names: &[&str], links: &[(usize, usize)]) -> (Digraph<String>, Vec<NodeId>) {
        let mut graph = Digraph::new();
        let ids: Vec<NodeId> = names.iter().map(|n| graph.add_node((*n).to_owned())).collect();
        for (from, to) in links {
            graph.add_link(ids[*from], ids[*to]);
        }
        (graph, ids)
    }

    #[rstest]
    #[case::single_node(&["a"], &[], false)]
    #[case::chain(&["a", "b", "c"], &[(0, 1), (1, 2)], false)]
    #[case::diamond(&["a", "b", "c", "d"], &[(0, 1), (0, 2), (1, 3), (2, 3)], false)]
    #[case::self_loop(&["a"], &[(0, 0)], true)]
    #[case::mutual(&["a", "b"], &[(0, 1), (1, 0)], true)]
    #[case::three_cycle(&["a", "b", "c"], &[(0, 1), (1, 2), (2, 0)], true)]
    #[case::cycle_after_sibling(&["a", "b", "c"], &[(0, 1), (1, 2), (1, 0)], true)]
    fn detects_repetitions_from_root(
        #[case] names: &[&str],
        #[case] links: &[(usize, usize)],
        #[case] expected: bool,
    ) {
        let (mut graph, ids) = graph_of(names, links);
        assert_eq!(detect_cycle(&mut graph, ids[0]), expected);
    }

    #[rstest]
    fn later_acyclic_sibling_masks_an_earlier_cycle() {
        // a -> b -> a is a cycle, but a's last child c is acyclic.
        let (mut graph, ids) = graph_of(&["a", "b", "c"], &[(0, 1), (1, 0), (0, 2)]);
        assert!(!detect_cycle(&mut graph, ids[0]));
    }

    #[rstest]
    fn earlier_acyclic_sibling_does_not_mask_a_later_cycle() {
        let (mut graph, ids) = graph_of(&["a", "c", "b"], &[(0, 1), (0, 2), (2, 0)]);
        assert!(detect_cycle(&mut graph, ids[0]));
    }

    #[rstest]
    fn cycle_outside_the_reachable_subgraph_is_ignored() {
        let (mut graph, ids) = graph_of(&["a", "b", "x", "y"], &[(0, 1), (2, 3), (3, 2)]);
        assert!(!detect_cycle(&mut graph, ids[0]));
    }

    #[rstest]
    fn marks_are_clear_after_detection() {
        let (mut graph, ids) = graph_of(&["a"], &[]);
        graph.set_seen(ids[0], true);
        assert!(!detect_cycle(&mut graph, ids[0]));
        assert!(!graph.is_seen(ids[0]));
    }
}
