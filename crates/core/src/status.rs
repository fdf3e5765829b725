//! Lifecycle status enums for campaigns, themes, and content posts.
//!
//! Statuses are stored as lowercase TEXT columns. Each enum round-trips
//! through [`as_str`](CampaignStatus::as_str) / [`FromStr`] and serializes to
//! the same string on the wire, so the API, the database, and the pipeline
//! all agree on a single spelling.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

macro_rules! define_text_status {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            /// Every variant, in lifecycle order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Return the TEXT value stored in the database.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok($name::$variant), )+
                    other => Err(CoreError::Validation(format!(
                        "Unknown {}: '{other}'",
                        stringify!($name)
                    ))),
                }
            }
        }
    };
}

define_text_status! {
    /// Campaign lifecycle status.
    CampaignStatus {
        Draft => "draft",
        Active => "active",
        Archived => "archived",
    }
}

define_text_status! {
    /// When post content for a campaign is produced.
    GenerationMode {
        /// All posts of the content plan are generated right after selection.
        PreBatch => "pre-batch",
        /// Posts are generated close to their publication date.
        JustInTime => "just-in-time",
    }
}

define_text_status! {
    /// Selection status of a candidate theme.
    ThemeStatus {
        Pending => "pending",
        Selected => "selected",
        Discarded => "discarded",
    }
}

define_text_status! {
    /// Progress of the background post fan-out for a selected theme.
    ///
    /// `themes.post_status` is NULL until the theme is selected.
    PostGenerationStatus {
        Pending => "pending",
        Ready => "ready",
        Error => "error",
    }
}

define_text_status! {
    /// Moderation status of a content post.
    PostStatus {
        Approved => "approved",
        Disapproved => "disapproved",
        Scheduled => "scheduled",
        Posted => "posted",
    }
}

define_text_status! {
    /// Image generation status of a content post.
    ImageStatus {
        Pending => "pending",
        Generating => "generating",
        Completed => "completed",
        /// Some but not all requested images were produced.
        Partial => "partial",
        Failed => "failed",
    }
}

impl ImageStatus {
    /// Terminal status for an image run that produced `succeeded` of
    /// `requested` images.
    pub fn from_outcome(succeeded: usize, requested: usize) -> Self {
        if succeeded == 0 {
            ImageStatus::Failed
        } else if succeeded < requested {
            ImageStatus::Partial
        } else {
            ImageStatus::Completed
        }
    }

    /// Whether an image run for the post is currently in flight.
    pub fn is_in_flight(self) -> bool {
        matches!(self, ImageStatus::Generating)
    }
}

// ---------------------------------------------------------------------------
// Campaign step counter
// ---------------------------------------------------------------------------

/// Pipeline progress marker stored in `campaigns.current_step` (SMALLINT).
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CampaignStep {
    Created = 0,
    /// Campaign metadata (brand voice, key messages, ...) captured.
    Enriched = 1,
    ThemesGenerated = 2,
    ThemeSelected = 3,
    PostsGenerated = 4,
}

impl CampaignStep {
    /// Return the database value.
    pub fn id(self) -> i16 {
        self as i16
    }
}

impl From<CampaignStep> for i16 {
    fn from(value: CampaignStep) -> Self {
        value as i16
    }
}

impl TryFrom<i16> for CampaignStep {
    type Error = CoreError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CampaignStep::Created),
            1 => Ok(CampaignStep::Enriched),
            2 => Ok(CampaignStep::ThemesGenerated),
            3 => Ok(CampaignStep::ThemeSelected),
            4 => Ok(CampaignStep::PostsGenerated),
            other => Err(CoreError::Validation(format!(
                "current_step must be between 0 and 4, got {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
