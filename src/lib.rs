//! Command-line front end for converting markdown codelabs into notebooks.
//!
//! The conversion itself lives in [codelab_notebook]. This crate adds the
//! collaborators around it: reading the source, writing the notebook and
//! registering it when the destination is a stage.

/// Configuration file loading.
pub mod config;

/// Writing converted notebooks to files or stages.
pub mod output;

pub mod report;

/// Reading codelab sources from files, urls or stages.
pub mod source;

pub mod stage;
