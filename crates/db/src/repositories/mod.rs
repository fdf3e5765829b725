//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod campaign_repo;
pub mod content_post_repo;
pub mod theme_repo;

pub use campaign_repo::CampaignRepo;
pub use content_post_repo::ContentPostRepo;
pub use theme_repo::ThemeRepo;
