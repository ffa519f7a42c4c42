// crates/core/src/lib.rs
//! Core domain types and logic for mealweek.
//!
//! Owns the job model (typed status/payload/result), the meal-plan
//! schema with structural validation, and the LLM generation layer
//! (provider trait, HTTP client, credential rotation).

pub mod job;
pub mod llm;
pub mod plan;
pub mod prompt;

pub use job::{JobOutcome, JobPayload, JobStatus, JobStatusReport, JobType};
pub use plan::{GeneratedPlan, GeneratedRecipe, PlanSettings, PlanValidationError};
