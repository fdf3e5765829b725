pub mod campaign;
pub mod content_post;
pub mod theme;
