//! CourseQA CLI
//!
//! Argument parsing, configuration layering and console output for the
//! `courseqa` binary.

pub mod output;
pub mod settings;

pub use settings::Cli;
