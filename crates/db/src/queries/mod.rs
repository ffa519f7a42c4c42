// crates/db/src/queries/mod.rs
pub mod jobs;
pub mod plans;
