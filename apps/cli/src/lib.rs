//! Library surface of the CLI, split out so the orchestration is testable.

pub mod upsert;
