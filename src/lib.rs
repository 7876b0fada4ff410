//! mymake core library.
//!
//! A minimal make: rules from a description file are registered in a
//! [`model::BuildModel`], and [`build::Builder`] rebuilds a target whose
//! dependencies are newer than it, running recipes through an
//! [`executor::RecipeExecutor`].

pub mod build;
pub mod cli;
pub mod executor;
pub mod graph;
pub mod model;
pub mod parser;
pub mod runner;
pub mod timestamps;
