// crates/server/src/jobs/mod.rs
//! Background job execution. Handlers create a job row, spawn a task,
//! and return immediately; the task drives the job to a terminal state.

mod worker;

pub use worker::spawn_job;
