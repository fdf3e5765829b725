//! Request handlers.
//!
//! Read and CRUD handlers call the repositories in `nextcopy_db` directly;
//! every generation action goes through the
//! [`Orchestrator`](nextcopy_pipeline::Orchestrator).

pub mod campaigns;
pub mod content;
pub mod themes;
