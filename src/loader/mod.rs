//! Sample loading.
//!
//! `reader` turns one latency file into a sample sequence; `discovery`
//! finds the files that make up each comparison group.

pub mod discovery;
pub mod reader;

pub use discovery::discover_groups;
pub use reader::{load_samples, ParsePolicy};
