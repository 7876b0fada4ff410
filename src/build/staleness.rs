//! Post-order staleness evaluation and recipe dispatch.
//!
//! Each node is compared against the modification time its caller requires:
//! the root is entered with its own time, and every child is entered with its
//! parent's time. A node propagates `true` upwards when its recipe ran or when
//! it is newer than that requirement.

use std::io::Write;

use tracing::{debug, info, warn};

use super::{BuildError, BuildOptions};
use crate::executor::{RecipeExecutor, Sinks};
use crate::graph::{Digraph, NodeId};
use crate::timestamps::Timestamps;

pub(super) struct Evaluator<'a, 'w, T, X> {
    pub(super) graph: &'a Digraph<String>,
    pub(super) root: NodeId,
    pub(super) timestamps: &'a T,
    pub(super) executor: &'a mut X,
    pub(super) sinks: &'a mut Sinks<'w>,
    pub(super) options: BuildOptions,
    pub(super) open: Vec<NodeId>,
}

impl<T, X> Evaluator<'_, '_, T, X>
where
    T: Timestamps,
    X: RecipeExecutor,
{
    fn name(&self, node: NodeId) -> String {
        self.graph.payload(node).cloned().unwrap_or_default()
    }

    /// Evaluate `node` against the time `required` by its caller.
    pub(super) fn visit(&mut self, node: NodeId, required: u64) -> Result<bool, BuildError> {
        let graph = self.graph;
        let name = graph.payload(node).map_or("", String::as_str);
        if self.open.contains(&node) {
            return Err(BuildError::CycleDetected {
                target: name.to_owned(),
            });
        }

        let current = self.timestamps.last_modification(name);
        let newer = current > required;
        if self.options.verbose {
            writeln!(self.sinks.out, "mymake: considering '{name}'")?;
        }
        debug!(target = name, mtime = current, required, "considering");

        let children = graph.children(node);
        let recipe = graph.recipe(node);
        let executed = if children.is_empty() {
            self.visit_leaf(node, name, recipe, current, required)?
        } else {
            self.open.push(node);
            let mut stale = false;
            for child in children {
                // Every child is evaluated; a rebuilt child does not skip its siblings.
                let child_stale = self.visit(*child, current)?;
                stale |= child_stale;
            }
            self.open.pop();
            if stale {
                if !recipe.is_empty() {
                    self.run(name, recipe);
                }
                true
            } else {
                debug!(target = name, "up to date");
                false
            }
        };
        Ok(executed || newer)
    }

    /// A leaf with a recipe runs when it is the root, missing, or newer than
    /// `required`; an existing older one is up to date rather than an error.
    fn visit_leaf(
        &mut self,
        node: NodeId,
        name: &str,
        recipe: &[String],
        current: u64,
        required: u64,
    ) -> Result<bool, BuildError> {
        if recipe.is_empty() {
            if current == 0 {
                let needed_by = self.open.last().copied().unwrap_or(node);
                return Err(BuildError::NoRuleForTarget {
                    missing: name.to_owned(),
                    needed_by: self.name(needed_by),
                });
            }
            return Ok(false);
        }
        if node == self.root || current == 0 || current > required {
            return Ok(self.run(name, recipe));
        }
        debug!(target = name, "up to date");
        Ok(false)
    }

    fn run(&mut self, name: &str, recipe: &[String]) -> bool {
        info!(target = name, dry_run = self.options.dry_run, "executing recipe");
        let done = self
            .executor
            .execute(recipe, self.sinks, self.options.dry_run);
        if !done {
            warn!(target = name, "recipe did not complete");
        }
        done
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, reason = "tests use expect to keep fixtures terse")]
    use super::*;
    use crate::model::BuildModel;
    use crate::timestamps::MockTimestamps;
    use rstest::rstest;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Recorder {
        runs: Vec<Vec<String>>,
    }

    impl RecipeExecutor for Recorder {
        fn execute(&mut self, recipe: &[String], _sinks: &mut Sinks<'_>, _dry_run: bool) -> bool {
            self.runs.push(recipe.to_vec());
            true
        }
    }

    fn clock(times: &[(&'static str, u64)]) -> MockTimestamps {
        let table: HashMap<String, u64> =
            times.iter().map(|(k, v)| ((*k).to_owned(), *v)).collect();
        let mut mock = MockTimestamps::new();
        mock.expect_last_modification()
            .returning(move |name| table.get(name).copied().unwrap_or(0));
        mock
    }

    fn evaluate(
        model: &BuildModel,
        root: &str,
        times: &MockTimestamps,
        recorder: &mut Recorder,
    ) -> Result<bool, BuildError> {
        let root = model.lookup(root).expect("root registered");
        let mut out = Vec::new();
        let mut err = Vec::new();
        let mut sinks = Sinks::new(&mut out, &mut err);
        let mut evaluator = Evaluator {
            graph: model.graph(),
            root,
            timestamps: times,
            executor: recorder,
            sinks: &mut sinks,
            options: BuildOptions::default(),
            open: Vec::new(),
        };
        let required = times.last_modification(model.name(root).unwrap_or_default());
        evaluator.visit(root, required)
    }

    fn compile_model() -> BuildModel {
        let mut model = BuildModel::new();
        model
            .add_target("app", &["a.o", "b.o"], &["cc -o app a.o b.o"])
            .expect("app");
        model.add_target("a.o", &["a.c"], &["cc -c a.c"]).expect("a.o");
        model.add_target("b.o", &["b.c"], &["cc -c b.c"]).expect("b.o");
        model
    }

    #[rstest]
    fn newer_source_rebuilds_its_object_and_the_link() {
        let model = compile_model();
        let times = clock(&[("app", 50), ("a.o", 40), ("b.o", 40), ("a.c", 60), ("b.c", 10)]);
        let mut recorder = Recorder::default();
        assert!(evaluate(&model, "app", &times, &mut recorder).expect("build"));
        assert_eq!(
            recorder.runs,
            vec![vec!["cc -c a.c".to_owned()], vec!["cc -o app a.o b.o".to_owned()]]
        );
    }

    #[rstest]
    fn everything_up_to_date_runs_nothing() {
        let model = compile_model();
        let times = clock(&[("app", 50), ("a.o", 40), ("b.o", 40), ("a.c", 5), ("b.c", 5)]);
        let mut recorder = Recorder::default();
        assert!(!evaluate(&model, "app", &times, &mut recorder).expect("build"));
        assert!(recorder.runs.is_empty());
    }

    #[rstest]
    fn object_newer_than_target_relinks_without_compiling() {
        let model = compile_model();
        let times = clock(&[("app", 50), ("a.o", 70), ("b.o", 40), ("a.c", 5), ("b.c", 5)]);
        let mut recorder = Recorder::default();
        assert!(evaluate(&model, "app", &times, &mut recorder).expect("build"));
        assert_eq!(recorder.runs, vec![vec!["cc -o app a.o b.o".to_owned()]]);
    }

    #[rstest]
    fn missing_file_without_rule_names_its_nearest_dependent() {
        let model = compile_model();
        let times = clock(&[("app", 50), ("a.o", 40), ("b.o", 40), ("a.c", 5)]);
        let mut recorder = Recorder::default();
        let err = evaluate(&model, "app", &times, &mut recorder).expect_err("b.c missing");
        assert!(matches!(
            &err,
            BuildError::NoRuleForTarget { missing, needed_by }
                if missing == "b.c" && needed_by == "b.o"
        ));
        assert!(recorder.runs.is_empty());
    }

    #[rstest]
    fn abort_skips_later_siblings() {
        let mut model = BuildModel::new();
        model
            .add_target("all", &["ghost.h", "late"], &["echo all"])
            .expect("all");
        model.add_target("late", &[] as &[&str], &["echo late"]).expect("late");
        let times = clock(&[]);
        let mut recorder = Recorder::default();
        assert!(evaluate(&model, "all", &times, &mut recorder).is_err());
        assert!(recorder.runs.is_empty());
    }

    #[rstest]
    fn existing_recipe_leaf_older_than_requirer_is_up_to_date() {
        let mut model = BuildModel::new();
        model.add_target("app", &["gen.h"], &["link"]).expect("app");
        model.add_target("gen.h", &[] as &[&str], &["generate"]).expect("gen.h");
        let times = clock(&[("app", 50), ("gen.h", 10)]);
        let mut recorder = Recorder::default();
        assert!(!evaluate(&model, "app", &times, &mut recorder).expect("build"));
        assert!(recorder.runs.is_empty());
    }

    #[rstest]
    fn recipe_leaf_newer_than_requirer_runs() {
        let mut model = BuildModel::new();
        model.add_target("app", &["gen.h"], &["link"]).expect("app");
        model.add_target("gen.h", &[] as &[&str], &["generate"]).expect("gen.h");
        let times = clock(&[("app", 50), ("gen.h", 60)]);
        let mut recorder = Recorder::default();
        assert!(evaluate(&model, "app", &times, &mut recorder).expect("build"));
        assert_eq!(
            recorder.runs,
            vec![vec!["generate".to_owned()], vec!["link".to_owned()]]
        );
    }

    #[rstest]
    fn root_leaf_with_recipe_always_runs() {
        let mut model = BuildModel::new();
        model.add_target("clean", &[] as &[&str], &["rm -f app"]).expect("clean");
        let times = clock(&[("clean", 10)]);
        let mut recorder = Recorder::default();
        assert!(evaluate(&model, "clean", &times, &mut recorder).expect("build"));
        assert_eq!(recorder.runs, vec![vec!["rm -f app".to_owned()]]);
    }

    #[rstest]
    fn cycle_reached_during_evaluation_is_an_error() {
        let mut model = BuildModel::new();
        model.add_target("a", &["b"], &["echo a"]).expect("a");
        model.add_target("b", &["a"], &["echo b"]).expect("b");
        let times = clock(&[]);
        let mut recorder = Recorder::default();
        let err = evaluate(&model, "a", &times, &mut recorder).expect_err("cycle");
        assert!(matches!(err, BuildError::CycleDetected { .. }));
    }
}
