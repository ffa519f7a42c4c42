// crates/client/src/lib.rs
//! Client-side job tracking for mealweek.
//!
//! A long-running job (plan generation, share preparation) outlives any
//! single page load. This crate persists the active job id per kind,
//! polls the server's status endpoint on an interval, and reports the
//! terminal result, surviving restarts in between.

pub mod handle;
pub mod poller;
pub mod status;

pub use handle::{ClientJobHandle, FileHandleStore, HandleStore, MemoryHandleStore};
pub use poller::{JobPoller, PollConfig, PollError};
pub use status::{HttpStatusClient, StatusClient, TransportError};
