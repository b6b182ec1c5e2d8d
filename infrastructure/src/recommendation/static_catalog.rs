//! Recommendations served from the `[recommendations]` config catalog.

use crate::config::FileRecommendedPlace;
use async_trait::async_trait;
use rally_application::{RecommendationContext, RecommendationError, RecommendationService};
use rally_domain::{ActivityKind, PlaceAttributes};
use tracing::debug;

struct CatalogEntry {
    place: PlaceAttributes,
    /// Empty means the place suits any kind.
    kinds: Vec<ActivityKind>,
}

/// Fixed list of places, filtered per activity kind.
pub struct StaticCatalog {
    entries: Vec<CatalogEntry>,
}

impl StaticCatalog {
    pub fn new(places: &[FileRecommendedPlace]) -> Self {
        let entries = places
            .iter()
            .filter(|p| !p.name.trim().is_empty())
            .map(|p| CatalogEntry {
                place: p.to_place(),
                kinds: p.parse_kinds(),
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl RecommendationService for StaticCatalog {
    async fn fetch(
        &self,
        context: &RecommendationContext,
    ) -> Result<Vec<PlaceAttributes>, RecommendationError> {
        if self.entries.is_empty() {
            return Err(RecommendationError::Unavailable(
                "no places configured under [recommendations]".to_string(),
            ));
        }

        let places: Vec<PlaceAttributes> = self
            .entries
            .iter()
            .filter(|e| e.kinds.is_empty() || e.kinds.contains(&context.kind))
            .filter(|e| {
                !context
                    .existing
                    .iter()
                    .any(|name| name.eq_ignore_ascii_case(&e.place.name))
            })
            .map(|e| e.place.clone())
            .collect();

        debug!(
            "Catalog offers {} place(s) for {} activity {}",
            places.len(),
            context.kind,
            context.activity_id
        );
        Ok(places)
    }
}
