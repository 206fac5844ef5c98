// Resolution domain models.
//
// Field names serialize in camelCase so the stored JSON keeps the same shape
// the gallery has always written (`createdAt` as epoch milliseconds).

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Key holding the ordered list of resolutions.
pub const RESOLUTIONS_KEY: &str = "resolutions";
/// Key holding the ids this installation has already liked.
pub const LIKED_RESOLUTIONS_KEY: &str = "liked-resolutions";
/// Schema of the data under `RESOLUTIONS_KEY`. Bump when the shape changes.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;
/// Keys wiped when the stored schema is older than `CURRENT_SCHEMA_VERSION`.
pub const GOVERNED_KEYS: &[&str] = &[RESOLUTIONS_KEY];

pub const MAX_RESOLUTIONS: usize = 5;
pub const MAX_LINE_CHARS: usize = 150;
pub const MAX_AUTHOR_CHARS: usize = 50;

/// Shown in place of a missing author.
pub const ANONYMOUS: &str = "Anonymous";

/// One shared card of resolutions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub id: String,
    pub resolutions: Vec<String>,
    /// `None` for anonymous submissions.
    pub author: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// Records written before likes existed have no counter.
    #[serde(default)]
    pub likes: u64,
    pub animation_props: AnimationProps,
}

impl Resolution {
    pub fn display_author(&self) -> &str {
        self.author.as_deref().unwrap_or(ANONYMOUS)
    }
}

/// Presentation payload for the floating card. Not interpreted by the core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationProps {
    pub start_y: f64,
    pub drift_y: f64,
    pub rotation: f64,
    pub duration: f64,
    pub delay: f64,
    pub float_duration: f64,
}

impl AnimationProps {
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            start_y: rng.gen_range(20.0..80.0),
            drift_y: rng.gen_range(-20.0..20.0),
            rotation: rng.gen_range(-4.0..4.0),
            duration: rng.gen_range(25.0..45.0),
            delay: rng.gen_range(-30.0..=0.0),
            float_duration: rng.gen_range(5.0..8.0),
        }
    }
}

/// Ids already liked from this installation.
pub type LikedSet = BTreeSet<String>;

/// What the submission form hands over.
#[derive(Debug, Clone, Default)]
pub struct SubmissionRequest {
    pub resolution_lines: Vec<String>,
    pub anonymous: bool,
    pub author_name: Option<String>,
}

impl SubmissionRequest {
    pub fn anonymous(lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            resolution_lines: lines.into_iter().map(Into::into).collect(),
            anonymous: true,
            author_name: None,
        }
    }

    pub fn signed(
        lines: impl IntoIterator<Item = impl Into<String>>,
        author_name: impl Into<String>,
    ) -> Self {
        Self {
            resolution_lines: lines.into_iter().map(Into::into).collect(),
            anonymous: false,
            author_name: Some(author_name.into()),
        }
    }
}

/// First screen to show once the schema gate has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialView {
    /// Nothing stored yet: open the submission form.
    Form,
    Gallery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    Liked { likes: u64 },
    /// This installation already liked the card; nothing changed.
    AlreadyLiked,
}
