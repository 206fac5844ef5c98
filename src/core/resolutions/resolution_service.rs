// Resolution service - submission, likes and deletion on top of the store.
//
// Nothing here knows which medium backs the data; the composition root hands
// in an `Arc<dyn KvMedium>` and tests hand in the in-memory one.

use super::resolution_models::*;
use crate::core::moderation::WordFilter;
use crate::core::storage::{KvMedium, MigrationOutcome, PersistentValue, SchemaGate, Update};
use chrono::{SubsecRound, Utc};
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

/// Why a submission was turned away. Nothing is stored in any of these cases.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Please enter at least one resolution")]
    Empty,

    #[error("Please share at most {max} resolutions")]
    TooMany { max: usize },

    #[error("Resolution {index} is longer than {max} characters")]
    LineTooLong { index: usize, max: usize },

    #[error("Your name must be at most {max} characters")]
    AuthorTooLong { max: usize },

    /// Deliberately carries no detail about what matched.
    #[error("Please keep your resolutions positive and appropriate for everyone")]
    Inappropriate,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("No resolution with id {0}")]
    NotFound(String),
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct ResolutionService {
    resolutions: PersistentValue<Vec<Resolution>>,
    liked: PersistentValue<LikedSet>,
    filter: WordFilter,
    migration: MigrationOutcome,
}

impl ResolutionService {
    /// Run the schema gate, then load resolutions and likes.
    ///
    /// The gate finishes before either key is read, so a caller never sees
    /// pre-migration data. If the gate could not clear stale data, this run
    /// starts from an empty wall instead.
    pub async fn open(medium: Arc<dyn KvMedium>, filter: WordFilter) -> Self {
        let migration = SchemaGate::new(CURRENT_SCHEMA_VERSION, GOVERNED_KEYS)
            .run(medium.as_ref())
            .await;

        let resolutions = PersistentValue::open(medium.clone(), RESOLUTIONS_KEY, Vec::new()).await;
        if !migration.data_is_current() {
            resolutions.clear().await;
        }
        let liked = PersistentValue::open(medium, LIKED_RESOLUTIONS_KEY, LikedSet::new()).await;

        Self {
            resolutions,
            liked,
            filter,
            migration,
        }
    }

    pub fn migration(&self) -> MigrationOutcome {
        self.migration
    }

    /// Decide the first screen: the form when nothing is stored yet.
    pub async fn initial_view(&self) -> InitialView {
        if self.resolutions.get().await.is_empty() {
            InitialView::Form
        } else {
            InitialView::Gallery
        }
    }

    /// All cards in submission order.
    pub async fn resolutions(&self) -> Vec<Resolution> {
        self.resolutions.get().await
    }

    pub async fn has_liked(&self, id: &str) -> bool {
        self.liked.get().await.contains(id)
    }

    /// Validate, moderate and store a new card.
    pub async fn submit(&self, request: SubmissionRequest) -> Result<Resolution, SubmissionError> {
        let (lines, author) = validate(&request)?;

        let mut batch = lines.clone();
        if let Some(name) = &author {
            batch.push(name.clone());
        }

        if self.filter.evaluate(batch.as_slice()).contains_violation {
            tracing::info!(lines = lines.len(), "Submission rejected by moderation");
            return Err(SubmissionError::Inappropriate);
        }

        let resolution = Resolution {
            id: uuid::Uuid::new_v4().to_string(),
            resolutions: lines,
            author,
            created_at: Utc::now().trunc_subsecs(3),
            likes: 0,
            animation_props: AnimationProps::random(&mut rand::thread_rng()),
        };

        let record = resolution.clone();
        self.resolutions
            .set(Update::with(move |current: &Vec<Resolution>| {
                let mut next = current.clone();
                next.push(record);
                next
            }))
            .await;

        tracing::info!(
            id = %resolution.id,
            lines = resolution.resolutions.len(),
            anonymous = resolution.author.is_none(),
            "Resolution shared"
        );

        Ok(resolution)
    }

    /// Like a card once per installation.
    ///
    /// The id is recorded as liked before the counter moves, so the counter
    /// is bumped at most once per id even if the second write is lost.
    pub async fn like(&self, id: &str) -> Result<LikeOutcome, ResolutionError> {
        self.ensure_exists(id).await?;

        let newly_liked = self
            .liked
            .set_with(|current: &LikedSet| {
                let mut next = current.clone();
                let inserted = next.insert(id.to_string());
                (next, inserted)
            })
            .await;

        if !newly_liked {
            tracing::debug!(id, "Resolution already liked here");
            return Ok(LikeOutcome::AlreadyLiked);
        }

        let target = id.to_string();
        let updated = self
            .resolutions
            .set(Update::with(move |current: &Vec<Resolution>| {
                current
                    .iter()
                    .cloned()
                    .map(|mut r| {
                        if r.id == target {
                            r.likes = r.likes.saturating_add(1);
                        }
                        r
                    })
                    .collect()
            }))
            .await;

        let likes = updated
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.likes)
            .ok_or_else(|| ResolutionError::NotFound(id.to_string()))?;

        tracing::info!(id, likes, "Resolution liked");
        Ok(LikeOutcome::Liked { likes })
    }

    /// Remove a card. Callers gate this on the owner flag.
    pub async fn delete(&self, id: &str) -> Result<Resolution, ResolutionError> {
        let removed = self.ensure_exists(id).await?;

        let target = id.to_string();
        self.resolutions
            .set(Update::with(move |current: &Vec<Resolution>| {
                current.iter().filter(|r| r.id != target).cloned().collect()
            }))
            .await;

        tracing::info!(id, "Resolution deleted");
        Ok(removed)
    }

    async fn ensure_exists(&self, id: &str) -> Result<Resolution, ResolutionError> {
        self.resolutions
            .get()
            .await
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| ResolutionError::NotFound(id.to_string()))
    }
}

/// Trim lines, drop blank ones and check the length limits.
///
/// Returns the kept lines and the author to store (`None` when anonymous or
/// when no name was given).
fn validate(request: &SubmissionRequest) -> Result<(Vec<String>, Option<String>), SubmissionError> {
    let lines: Vec<String> = request
        .resolution_lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if lines.is_empty() {
        return Err(SubmissionError::Empty);
    }
    if lines.len() > MAX_RESOLUTIONS {
        return Err(SubmissionError::TooMany {
            max: MAX_RESOLUTIONS,
        });
    }
    if let Some(index) = lines
        .iter()
        .position(|line| line.chars().count() > MAX_LINE_CHARS)
    {
        return Err(SubmissionError::LineTooLong {
            index: index + 1,
            max: MAX_LINE_CHARS,
        });
    }

    let author = if request.anonymous {
        None
    } else {
        request
            .author_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    };

    if let Some(name) = &author {
        if name.chars().count() > MAX_AUTHOR_CHARS {
            return Err(SubmissionError::AuthorTooLong {
                max: MAX_AUTHOR_CHARS,
            });
        }
    }

    Ok((lines, author))
}

// ============================================================================
// TESTS
// ============================================================================
