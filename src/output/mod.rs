//! Report formatting for console, JSON, and markdown output

pub mod formatter;

pub use formatter::{format_report, ConsoleFormatter, JsonFormatter, MarkdownFormatter};
