//! Target registration on top of the graph store.
//!
//! [`BuildModel`] maps target and dependency names onto [`Digraph`] nodes.
//! Names are matched byte for byte. A name first seen as a dependency gets a
//! placeholder node; registering it later as a target adopts that node so its
//! existing dependents keep pointing at it.

use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, warn};

use crate::graph::{Digraph, NodeId};
use crate::parser::Rule;

/// Errors raised while registering targets.
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum ModelError {
    /// The target already has dependencies.
    #[error("target '{name}' is already defined")]
    #[diagnostic(
        code(mymake::model::duplicate_target),
        help("merge the two rules or rename one of the targets")
    )]
    DuplicateTarget {
        /// Name of the rejected target.
        name: String,
    },
}

/// Named targets, their dependencies and recipes.
#[derive(Debug, Default)]
pub struct BuildModel {
    graph: Digraph<String>,
    default_target: Option<NodeId>,
}

impl BuildModel {
    /// Create an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` with its dependencies and recipe.
    ///
    /// Dependencies that do not exist yet become placeholder nodes. The
    /// recipe lines are appended in order. A node without dependencies is
    /// reused, so a recipe-only target may be extended by a later rule.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateTarget`] when `name` already has
    /// dependencies; the model is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use mymake::model::BuildModel;
    ///
    /// let mut model = BuildModel::new();
    /// model.add_target("app", &["main.o"], &["cc -o app main.o"]).expect("register app");
    /// assert!(model.add_target::<&str, &str>("app", &["util.o"], &[]).is_err());
    /// assert_eq!(model.dependencies("app"), vec!["main.o"]);
    /// ```
    pub fn add_target<D, R>(&mut self, name: &str, deps: &[D], recipe: &[R]) -> Result<NodeId, ModelError>
    where
        D: AsRef<str>,
        R: AsRef<str>,
    {
        let target = match self.lookup(name) {
            Some(existing) if self.is_target(existing) => {
                return Err(ModelError::DuplicateTarget {
                    name: name.to_owned(),
                });
            }
            Some(existing) => {
                debug!(target = name, "reusing node without dependencies");
                existing
            }
            None => self.graph.add_node(name.to_owned()),
        };

        for dep in deps {
            let dep = dep.as_ref();
            let dep_node = self
                .lookup(dep)
                .unwrap_or_else(|| self.graph.add_node(dep.to_owned()));
            self.graph.add_link(target, dep_node);
        }
        for line in recipe {
            self.graph.push_recipe_line(target, line.as_ref());
        }

        self.default_target.get_or_insert(target);
        debug!(
            target = name,
            deps = deps.len(),
            recipe_lines = recipe.len(),
            "registered target"
        );
        Ok(target)
    }

    /// Register every target named by a parsed rule.
    ///
    /// All targets are attempted even when one of them is rejected.
    ///
    /// # Errors
    ///
    /// Returns the first [`ModelError`] encountered.
    pub fn add_rule(&mut self, rule: &Rule) -> Result<(), ModelError> {
        let mut first_error = None;
        for target in &rule.targets {
            if let Err(err) = self.add_target(target, &rule.deps, &rule.recipe) {
                warn!(line = rule.line, error = %err, "rule rejected");
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Node registered under `name`, if any.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.graph.find(|_, payload| payload == name)
    }

    /// Whether `node` has dependencies of its own. Only such nodes reject a
    /// second registration.
    #[must_use]
    pub fn is_target(&self, node: NodeId) -> bool {
        self.graph.outgoing_link_count(node) > 0
    }

    /// The first target ever registered.
    #[must_use]
    pub const fn default_target(&self) -> Option<NodeId> {
        self.default_target
    }

    /// Name stored in `node`.
    #[must_use]
    pub fn name(&self, node: NodeId) -> Option<&str> {
        self.graph.payload(node).map(String::as_str)
    }

    /// Dependency names of `target` in declaration order.
    #[must_use]
    pub fn dependencies(&self, target: &str) -> Vec<&str> {
        self.lookup(target)
            .map(|node| {
                self.graph
                    .children(node)
                    .iter()
                    .filter_map(|child| self.name(*child))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Recipe lines of `target`; empty when it is unknown.
    #[must_use]
    pub fn recipe(&self, target: &str) -> &[String] {
        self.lookup(target)
            .map(|node| self.graph.recipe(node))
            .unwrap_or_default()
    }

    /// Borrow the underlying graph.
    #[must_use]
    pub const fn graph(&self) -> &Digraph<String> {
        &self.graph
    }

    /// Mutably borrow the underlying graph.
    ///
    /// Traversals use this to manage `seen` marks. Links added here bypass
    /// duplicate-target detection.
    pub const fn graph_mut(&mut self) -> &mut Digraph<String> {
        &mut self.graph
    }
}
