//! CLI command implementations.

pub mod codex;
pub mod evaluate;
pub mod policy;
pub mod summary;
