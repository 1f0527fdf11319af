//! Core matching and scoring pipeline

pub mod analyzer;
pub mod embeddings;
pub mod gaps;
pub mod index;
pub mod normalizer;
pub mod scorer;
pub mod sections;
pub mod taxonomy;
