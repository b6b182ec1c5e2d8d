//! Static recommendation catalog from TOML (`[[recommendations.places]]`)
//!
//! ```toml
//! [[recommendations.places]]
//! name = "Trattoria Roma"
//! address = "12 Via Appia"
//! rating = 4.5
//! price_level = 2
//! kinds = ["restaurant"]
//! ```

use rally_domain::{ActivityKind, PlaceAttributes};
use serde::{Deserialize, Serialize};

/// Raw `[recommendations]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRecommendationsConfig {
    pub places: Vec<FileRecommendedPlace>,
}

/// One catalog entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRecommendedPlace {
    pub name: String,
    pub address: Option<String>,
    pub rating: Option<f32>,
    pub price_level: Option<u8>,
    pub url: Option<String>,
    /// Activity kinds this place suits (e.g. "restaurant", "cocktails");
    /// empty means any kind
    pub kinds: Vec<String>,
}

impl FileRecommendedPlace {
    pub fn to_place(&self) -> PlaceAttributes {
        PlaceAttributes {
            name: self.name.clone(),
            address: self.address.clone(),
            rating: self.rating,
            price_level: self.price_level,
            url: self.url.clone(),
            source: Some("catalog".to_string()),
        }
    }

    /// Parsed `kinds`; unknown names are dropped.
    pub fn parse_kinds(&self) -> Vec<ActivityKind> {
        self.kinds.iter().filter_map(|k| k.parse().ok()).collect()
    }
}
