//! Owned directed graph with arena-addressed nodes.
//!
//! [`Digraph`] stores every node in a growable slot table and expresses edges
//! as lists of [`NodeId`] indices. Each edge is recorded twice: the source
//! lists the target among its children and the target lists the source among
//! its parents. Removing a node empties its slot, so a stale [`NodeId`] simply
//! stops resolving instead of dangling.
//!
//! Nodes also carry an ordered recipe and a transient `seen` mark. Both exist
//! for the build engine layered on top; the graph itself never interprets
//! them.
//!
//! # Examples
//!
//! ```
//! use mymake::graph::Digraph;
//!
//! let mut graph = Digraph::new();
//! let app = graph.add_node("app".to_owned());
//! let lib = graph.add_node("lib.o".to_owned());
//! graph.add_link(app, lib);
//! graph.add_link(app, lib);
//! assert_eq!(graph.outgoing_link_count(app), 1);
//! assert_eq!(graph.incoming_link_count(lib), 1);
//! ```

use std::fmt;

/// Handle to a node stored in a [`Digraph`].
///
/// Handles are never reused, so a handle to a removed node resolves to
/// nothing for the lifetime of the graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node's slot in the arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Callback run on a payload when its node is destroyed.
pub type Destructor<T> = Box<dyn FnMut(T)>;

/// A single vertex together with its edges, recipe and traversal mark.
#[derive(Debug, Clone)]
pub struct Node<T> {
    payload: T,
    children: Vec<NodeId>,
    parents: Vec<NodeId>,
    recipe: Vec<String>,
    seen: bool,
}

impl<T> Node<T> {
    const fn new(payload: T) -> Self {
        Self {
            payload,
            children: Vec::new(),
            parents: Vec::new(),
            recipe: Vec::new(),
            seen: false,
        }
    }

    /// Borrow the node's payload.
    #[must_use]
    pub const fn payload(&self) -> &T {
        &self.payload
    }

    /// Outgoing edges (dependencies) in insertion order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Incoming edges (dependents) in insertion order.
    #[must_use]
    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    /// Recipe lines in the order they were appended.
    #[must_use]
    pub fn recipe(&self) -> &[String] {
        &self.recipe
    }

    /// Whether the traversal mark is set.
    #[must_use]
    pub const fn is_seen(&self) -> bool {
        self.seen
    }

    /// Number of outgoing edges.
    #[must_use]
    pub const fn outgoing_link_count(&self) -> usize {
        self.children.len()
    }

    /// Number of incoming edges.
    #[must_use]
    pub const fn incoming_link_count(&self) -> usize {
        self.parents.len()
    }
}

/// Directed graph owning its nodes and their payloads.
///
/// Nodes are kept in insertion order; [`Digraph::visit_all`],
/// [`Digraph::find`] and [`Digraph::iter`] all observe that order. Dropping
/// the graph runs the destructor once for every node still present.
pub struct Digraph<T> {
    slots: Vec<Option<Node<T>>>,
    order: Vec<NodeId>,
    destructor: Option<Destructor<T>>,
}

impl<T> Default for Digraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Digraph<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Digraph")
            .field("nodes", &self.iter().collect::<Vec<_>>())
            .field("destructor", &self.destructor.is_some())
            .finish()
    }
}

impl<T> Digraph<T> {
    /// Create an empty graph without a payload destructor.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            order: Vec::new(),
            destructor: None,
        }
    }

    /// Create an empty graph that hands every destroyed payload to
    /// `destructor`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::{cell::RefCell, rc::Rc};
    /// use mymake::graph::Digraph;
    ///
    /// let dropped = Rc::new(RefCell::new(Vec::new()));
    /// let sink = Rc::clone(&dropped);
    /// let mut graph = Digraph::with_destructor(move |name: String| sink.borrow_mut().push(name));
    /// let node = graph.add_node("a".to_owned());
    /// graph.remove_node(node);
    /// assert_eq!(*dropped.borrow(), vec!["a".to_owned()]);
    /// ```
    #[must_use]
    pub fn with_destructor(destructor: impl FnMut(T) + 'static) -> Self {
        Self {
            slots: Vec::new(),
            order: Vec::new(),
            destructor: Some(Box::new(destructor)),
        }
    }

    /// Number of live nodes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the graph has no live nodes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether `id` refers to a live node of this graph.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Borrow a live node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node<T>> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<T>> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Take ownership of `payload` and append a fresh node for it.
    pub fn add_node(&mut self, payload: T) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Some(Node::new(payload)));
        self.order.push(id);
        id
    }

    /// Destroy a node, severing its edges in both directions.
    ///
    /// The destructor runs exactly once on the removed payload. Returns
    /// `false` and does nothing when `id` is not a live node of this graph.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let Some(node) = self.slots.get_mut(id.0).and_then(Option::take) else {
            return false;
        };
        for child in &node.children {
            if let Some(child_node) = self.node_mut(*child) {
                child_node.parents.retain(|parent| *parent != id);
            }
        }
        for parent in &node.parents {
            if let Some(parent_node) = self.node_mut(*parent) {
                parent_node.children.retain(|child| *child != id);
            }
        }
        self.order.retain(|live| *live != id);
        if let Some(destructor) = self.destructor.as_mut() {
            destructor(node.payload);
        }
        true
    }

    /// Add the edge `from -> to`.
    ///
    /// Adding an edge that already exists leaves both nodes untouched.
    /// Returns `true` only when a new edge was recorded.
    pub fn add_link(&mut self, from: NodeId, to: NodeId) -> bool {
        if !self.contains(to) {
            return false;
        }
        let Some(source) = self.node_mut(from) else {
            return false;
        };
        if source.children.contains(&to) {
            return false;
        }
        source.children.push(to);
        if let Some(target) = self.node_mut(to) {
            target.parents.push(from);
        }
        true
    }

    /// Apply `predicate` to every node in insertion order.
    ///
    /// Stops at the first node for which the predicate returns `false` and
    /// reports `false`; an empty graph reports `true`.
    pub fn visit_all<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(NodeId, &T) -> bool,
    {
        self.iter().all(|(id, node)| predicate(id, &node.payload))
    }

    /// First node, in insertion order, accepted by `predicate`.
    pub fn find<F>(&self, mut predicate: F) -> Option<NodeId>
    where
        F: FnMut(NodeId, &T) -> bool,
    {
        self.iter()
            .find(|(id, node)| predicate(*id, &node.payload))
            .map(|(id, _)| id)
    }

    /// Apply `visitor` to each direct child of `id`.
    ///
    /// Every child is visited; the return value is the visitor's result for
    /// the last child only, or `true` when there are no children.
    pub fn visit_children<F>(&self, id: NodeId, mut visitor: F) -> bool
    where
        F: FnMut(NodeId, &T) -> bool,
    {
        let mut last = true;
        for child in self.children(id) {
            if let Some(node) = self.node(*child) {
                last = visitor(*child, &node.payload);
            }
        }
        last
    }

    /// Number of outgoing edges of `id`, or zero when it is not live.
    #[must_use]
    pub fn outgoing_link_count(&self, id: NodeId) -> usize {
        self.node(id).map_or(0, Node::outgoing_link_count)
    }

    /// Number of incoming edges of `id`, or zero when it is not live.
    #[must_use]
    pub fn incoming_link_count(&self, id: NodeId) -> usize {
        self.node(id).map_or(0, Node::incoming_link_count)
    }

    /// Children of `id`; empty when it is not live.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::children).unwrap_or_default()
    }

    /// Parents of `id`; empty when it is not live.
    #[must_use]
    pub fn parents(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::parents).unwrap_or_default()
    }

    /// Borrow the payload of `id`.
    #[must_use]
    pub fn payload(&self, id: NodeId) -> Option<&T> {
        self.node(id).map(Node::payload)
    }

    /// Store `payload` in `id` and hand back the previous value.
    ///
    /// The destructor is not run on the returned value. When `id` is not live
    /// the new payload is dropped and `None` is returned.
    pub fn replace_payload(&mut self, id: NodeId, payload: T) -> Option<T> {
        self.node_mut(id)
            .map(|node| std::mem::replace(&mut node.payload, payload))
    }

    /// Recipe lines of `id`; empty when it is not live.
    #[must_use]
    pub fn recipe(&self, id: NodeId) -> &[String] {
        self.node(id).map(Node::recipe).unwrap_or_default()
    }

    /// Append one line to the recipe of `id`.
    pub fn push_recipe_line(&mut self, id: NodeId, line: impl Into<String>) -> bool {
        self.node_mut(id).is_some_and(|node| {
            node.recipe.push(line.into());
            true
        })
    }

    /// Whether `id` carries the traversal mark.
    #[must_use]
    pub fn is_seen(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(Node::is_seen)
    }

    /// Set or clear the traversal mark on `id`.
    pub fn set_seen(&mut self, id: NodeId, seen: bool) {
        if let Some(node) = self.node_mut(id) {
            node.seen = seen;
        }
    }

    /// Clear the traversal mark on every node.
    pub fn reset_seen(&mut self) {
        for node in self.slots.iter_mut().flatten() {
            node.seen = false;
        }
    }

    /// First live node in insertion order.
    #[must_use]
    pub fn first(&self) -> Option<NodeId> {
        self.order.first().copied()
    }

    /// Iterate over live nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node<T>)> {
        self.order
            .iter()
            .filter_map(|id| self.node(*id).map(|node| (*id, node)))
    }
}

impl<T> Drop for Digraph<T> {
    fn drop(&mut self) {
        let order = std::mem::take(&mut self.order);
        let Some(destructor) = self.destructor.as_mut() else {
            return;
        };
        for id in order {
            if let Some(node) = self.slots.get_mut(id.0).and_then(Option::take) {
                destructor(node.payload);
            }
        }
    }
}
