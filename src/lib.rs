//! Resume matcher library

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod processing;

pub use config::Config;
pub use error::{MatcherError, Result};
