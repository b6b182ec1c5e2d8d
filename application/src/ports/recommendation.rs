//! Recommendation service port
//!
//! Recommendations are generated elsewhere; the engine only asks for a list
//! of places and proposes them as ordinary options.

use async_trait::async_trait;
use rally_domain::{ActivityId, ActivityKind, PlaceAttributes};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecommendationError {
    #[error("Recommendation service unavailable: {0}")]
    Unavailable(String),

    #[error("Recommendation service returned an unusable response: {0}")]
    InvalidResponse(String),
}

/// What the service gets to know about the activity.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationContext {
    pub activity_id: ActivityId,
    pub kind: ActivityKind,
    pub title: String,
    pub location: Option<String>,
    pub participant_count: usize,
    /// Names of places already on the board.
    pub existing: Vec<String>,
}

#[async_trait]
pub trait RecommendationService: Send + Sync {
    async fn fetch(
        &self,
        context: &RecommendationContext,
    ) -> Result<Vec<PlaceAttributes>, RecommendationError>;
}
