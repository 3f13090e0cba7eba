//! Run summary reports.

mod generator;

pub use generator::{generate_json_report, generate_markdown_report};
