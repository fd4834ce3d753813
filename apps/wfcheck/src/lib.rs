//! wfcheck core library.
//!
//! Validates CI workflow YAML documents in three phases: YAML syntax,
//! workflow schema, and line-level lint heuristics. Single documents and
//! glob-selected batches are supported.
//!
//! High-level modules:
//! - `app`: Command execution and exit status (binary uses this).
//! - `cli`: CLI argument parsing.
//! - `config`: Discovery and effective configuration resolution.
//! - `parse`: YAML text to a duplicate-preserving document tree.
//! - `schema`: Workflow schema rules over the document tree.
//! - `lint`: Line-level heuristics and file statistics.
//! - `structure`: Top-level workflow summary.
//! - `validate`: The validation pipeline and batch runner.
//! - `models`: Document tree, diagnostics, and result structs.
//! - `output`: Human/JSON printers and CI annotations.
//! - `utils`: Supporting helpers.
pub mod app;
pub mod cli;
pub mod config;
pub mod lint;
pub mod models;
pub mod output;
pub mod parse;
pub mod schema;
pub mod structure;
pub mod utils;
pub mod validate;
