// crates/server/src/routes/mod.rs
//! HTTP route handlers, grouped by resource.

pub mod health;
pub mod jobs;
pub mod plans;
