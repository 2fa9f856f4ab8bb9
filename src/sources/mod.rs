//! Source fetchers for external lookup providers
//!
//! One fetcher per provider API, plus the dual-source fan-out used for place
//! autocomplete.

mod dual;
mod geoapify;
mod geocode;
mod images;
mod places;

pub use dual::DualSource;
pub use geoapify::{
    decode_coordinates, decode_suggestion, decode_suggestions, Decoded, FeatureCollection,
    LabelRules, SkipReason,
};
pub use geocode::GeoapifyGeocoder;
pub use images::UnsplashImages;
pub use places::GeoapifyAutocomplete;
