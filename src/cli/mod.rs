//! Command Line Interface (CLI) layer for stylepipe.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) for stylization and benchmark
//! runs. It wires user-provided options to the library's `Pipeline`.
//!
//! If you are embedding stylepipe into another application, prefer using
//! `stylepipe::api` instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
