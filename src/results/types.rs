//! Result type definitions

use serde::{Deserialize, Serialize};

/// Kind of place a suggestion refers to
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlaceKind {
    #[default]
    City,
    Address,
}

/// A place or address suggestion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    /// Display label; also the identity used for deduplication
    pub formatted: String,
    /// Provider place identifier
    pub place_id: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    /// ISO 3166-1 alpha-2, lowercase
    pub country_code: Option<String>,
    /// First address line (street and number)
    pub address_line1: Option<String>,
    /// Second address line (locality)
    pub address_line2: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Provider relevance, higher is better
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub kind: PlaceKind,
}

impl Suggestion {
    /// Create a suggestion with only a label and place id
    pub fn new(formatted: impl Into<String>, place_id: impl Into<String>) -> Self {
        Self {
            formatted: formatted.into(),
            place_id: place_id.into(),
            city: None,
            state: None,
            country: None,
            country_code: None,
            address_line1: None,
            address_line2: None,
            lat: None,
            lon: None,
            score: 0.0,
            kind: PlaceKind::City,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }
}

/// Coordinates resolved for an address
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeocodeResult {
    pub lat: f64,
    pub lon: f64,
}

/// Cover image found for a destination
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DestinationImage {
    /// Full-size image URL
    pub url: String,
    pub thumb_url: Option<String>,
    pub description: Option<String>,
    /// Photographer credit
    pub photographer: Option<String>,
    pub photographer_url: Option<String>,
}
