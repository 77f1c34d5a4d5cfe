//! Embeddable core library for srcfab.
//!
//! Provides clap-free entry points for configuring a tree, planning its
//! build graph and running it with make.
//!
//! # Port traits
//!
//! All I/O is abstracted behind port traits in [`ports`]:
//! - [`GitPort`](ports::GitPort): HEAD commit and origin remote
//! - [`Scanner`](ports::Scanner): run one scanner tool
//! - [`ToolchainCatalog`](ports::ToolchainCatalog): toolchains available for tool choice
//! - [`MakeExecutor`](ports::MakeExecutor): execute a rendered Makefile
//!
//! The [`adapters`] module provides default process- and filesystem-backed
//! implementations, plus in-memory ones for embedding.
//!
//! # Entry points
//!
//! - [`run_configure`](pipeline::run_configure): scan and write source units
//! - [`run_plan`](pipeline::run_plan): build the Makefile for configured units
//! - [`run_make`](pipeline::run_make): plan, then execute

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod scan;
pub mod settings;
pub mod tree_config;

pub use pipeline::{
    ConfigureOutcome, MakeOutcome, PlanOutcome, ToolError, run_configure, run_make, run_plan,
};
pub use tree_config::{
    SRCFILE, TreeConfigError, expand_paths, read_tree_config, validate_tree, validate_unit,
};
