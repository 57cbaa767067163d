//! CourseQA Common Library
//!
//! Page registry types, loading, validation and page selection shared by the
//! generator and the command-line tool.

pub mod error;
pub mod registry;
pub mod types;

// Re-export commonly used types
pub use error::{Error, Result};
pub use registry::{load_registry, select_pages, Registry};
pub use types::*;
