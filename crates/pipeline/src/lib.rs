//! Generation pipeline: themes, post fan-out, images, and their
//! orchestration.
//!
//! - [`ThemeGenerator`] produces candidate themes, one emotional strategy
//!   per candidate.
//! - [`PostFanOut`] turns a theme's content plan into post drafts under a
//!   concurrency limit and a run deadline; failures become fallback drafts.
//! - [`ImageFanOut`] derives image prompts from a post and renders them
//!   through an [`ImageProvider`](nextcopy_genai::ImageProvider).
//! - [`persist`] writes drafts in independent batches.
//! - [`Orchestrator`] ties the stages to the database, the event bus, and
//!   the background task tracker.

pub mod call;
pub mod config;
pub mod enrich;
pub mod error;
pub mod images;
pub mod orchestrator;
pub mod persist;
pub mod posts;
pub mod prompts;
pub mod themes;

pub use config::{PipelineConfig, ThemeFailurePolicy};
pub use error::{PipelineError, PipelineResult};
pub use images::{ImageFanOut, ImageOptions};
pub use orchestrator::{BatchImageAck, ImageRunReport, Orchestrator, PostRunReport, RecoveryReport};
pub use persist::PersistReport;
pub use posts::PostFanOut;
pub use themes::ThemeGenerator;
