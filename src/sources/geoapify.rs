//! Geoapify response decoding
//!
//! Geoapify answers with a GeoJSON feature collection whose `properties` bag
//! carries optional, partly redundant fields. Each feature decodes on its own
//! into either a domain record or a skip, so one odd feature never costs the
//! whole response.

use crate::results::{GeocodeResult, PlaceKind, Suggestion};
use serde::Deserialize;
use std::collections::HashSet;

/// Outcome of decoding one provider item
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    Item(T),
    Skip(SkipReason),
}

/// Why an item was left out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Malformed,
    EmptyLabel,
    DuplicateLabel,
    MissingCoordinates,
}

/// GeoJSON feature collection with undecoded features
#[derive(Debug, Default, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: FeatureProperties,
    geometry: Option<Geometry>,
}

#[derive(Debug, Default, Deserialize)]
struct Geometry {
    #[serde(default)]
    coordinates: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct Rank {
    importance: Option<f64>,
    confidence: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FeatureProperties {
    formatted: Option<String>,
    place_id: Option<String>,
    name: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    country: Option<String>,
    country_code: Option<String>,
    address_line1: Option<String>,
    address_line2: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    rank: Option<Rank>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl FeatureProperties {
    /// City, falling back through smaller settlements to the feature name
    fn locality(&self) -> Option<&str> {
        non_empty(&self.city)
            .or_else(|| non_empty(&self.town))
            .or_else(|| non_empty(&self.village))
            .or_else(|| non_empty(&self.name))
    }

    fn relevance(&self) -> f64 {
        self.rank
            .as_ref()
            .and_then(|r| r.importance.or(r.confidence))
            .unwrap_or(0.0)
    }
}

/// Rules for building display labels
#[derive(Debug, Clone)]
pub struct LabelRules {
    /// Lowercase country codes whose labels include the state
    pub state_countries: Vec<String>,
}

impl Default for LabelRules {
    fn default() -> Self {
        Self {
            state_countries: vec!["us".to_string(), "ca".to_string(), "au".to_string()],
        }
    }
}

impl LabelRules {
    fn shows_state(&self, country_code: Option<&str>) -> bool {
        country_code.is_some_and(|code| {
            self.state_countries
                .iter()
                .any(|c| c.eq_ignore_ascii_case(code))
        })
    }

    /// Display label for a feature.
    ///
    /// The provider's formatted label wins. Otherwise "city, state, country"
    /// for state countries, "city, country" elsewhere, and finally whatever
    /// fragments are present.
    pub(crate) fn label(&self, props: &FeatureProperties) -> String {
        if let Some(formatted) = non_empty(&props.formatted) {
            return formatted.to_string();
        }

        let city = props.locality();
        let state = non_empty(&props.state);
        let country = non_empty(&props.country);

        match (city, state, country) {
            (Some(city), Some(state), Some(country))
                if self.shows_state(non_empty(&props.country_code)) =>
            {
                format!("{}, {}, {}", city, state, country)
            }
            (Some(city), _, Some(country)) => format!("{}, {}", city, country),
            _ => [city, state, country]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

fn parse_feature(value: serde_json::Value) -> Option<Feature> {
    serde_json::from_value(value).ok()
}

/// Decode one feature into a suggestion
pub fn decode_suggestion(value: serde_json::Value, rules: &LabelRules, kind: PlaceKind) -> Decoded<Suggestion> {
    let Some(feature) = parse_feature(value) else {
        return Decoded::Skip(SkipReason::Malformed);
    };
    let props = feature.properties;

    let formatted = rules.label(&props);
    if formatted.is_empty() {
        return Decoded::Skip(SkipReason::EmptyLabel);
    }

    let (lat, lon) = match (props.lat, props.lon, feature.geometry) {
        (Some(lat), Some(lon), _) => (Some(lat), Some(lon)),
        (_, _, Some(geometry)) if geometry.coordinates.len() >= 2 => {
            (Some(geometry.coordinates[1]), Some(geometry.coordinates[0]))
        }
        _ => (None, None),
    };

    Decoded::Item(Suggestion {
        formatted,
        place_id: props.place_id.clone().unwrap_or_default(),
        city: props.locality().map(String::from),
        state: non_empty(&props.state).map(String::from),
        country: non_empty(&props.country).map(String::from),
        country_code: non_empty(&props.country_code).map(str::to_lowercase),
        address_line1: non_empty(&props.address_line1).map(String::from),
        address_line2: non_empty(&props.address_line2).map(String::from),
        lat,
        lon,
        score: props.relevance(),
        kind,
    })
}

/// Decode a feature collection, dropping skipped and duplicate labels
pub fn decode_suggestions(collection: FeatureCollection, rules: &LabelRules, kind: PlaceKind) -> Vec<Suggestion> {
    let mut seen = HashSet::new();
    collection
        .features
        .into_iter()
        .map(|value| match decode_suggestion(value, rules, kind.clone()) {
            Decoded::Item(s) if !seen.insert(s.formatted.clone()) => {
                Decoded::Skip(SkipReason::DuplicateLabel)
            }
            decoded => decoded,
        })
        .filter_map(|decoded| match decoded {
            Decoded::Item(s) => Some(s),
            Decoded::Skip(reason) => {
                tracing::trace!("skipping feature: {:?}", reason);
                None
            }
        })
        .collect()
}

/// Decode the coordinates of one feature
pub fn decode_coordinates(value: serde_json::Value) -> Decoded<GeocodeResult> {
    let Some(feature) = parse_feature(value) else {
        return Decoded::Skip(SkipReason::Malformed);
    };

    match (feature.properties.lat, feature.properties.lon, feature.geometry) {
        (Some(lat), Some(lon), _) => Decoded::Item(GeocodeResult { lat, lon }),
        (_, _, Some(geometry)) if geometry.coordinates.len() >= 2 => Decoded::Item(GeocodeResult {
            lat: geometry.coordinates[1],
            lon: geometry.coordinates[0],
        }),
        _ => Decoded::Skip(SkipReason::MissingCoordinates),
    }
}
