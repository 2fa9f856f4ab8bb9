//! The four lookup kinds wired from settings

use crate::config::Settings;
use crate::lookup::Lookup;
use crate::network::HttpClient;
use crate::sources::{DualSource, GeoapifyAutocomplete, GeoapifyGeocoder, UnsplashImages};
use tracing::{info, warn};

/// Place autocomplete: priority country and worldwide, merged
pub type PlaceLookup = Lookup<DualSource<GeoapifyAutocomplete>>;
/// Free-form address autocomplete
pub type AddressLookup = Lookup<GeoapifyAutocomplete>;
/// Address to coordinates
pub type GeocodeLookup = Lookup<GeoapifyGeocoder>;
/// Destination cover image
pub type ImageLookup = Lookup<UnsplashImages>;

/// Lookups shared by every caller in the process.
///
/// Each lookup owns one cache; callers open their own sessions so that
/// tearing one down never affects another.
#[derive(Clone)]
pub struct LookupServices {
    pub places: PlaceLookup,
    pub addresses: AddressLookup,
    pub geocoder: GeocodeLookup,
    pub images: ImageLookup,
}

impl LookupServices {
    pub fn new(settings: &Settings, client: HttpClient) -> Self {
        let geoapify = &settings.providers.geoapify;
        let unsplash = &settings.providers.unsplash;
        let lookups = &settings.lookups;

        let places = DualSource::new(
            GeoapifyAutocomplete::cities(client.clone(), geoapify).scoped_to(&geoapify.priority_country),
            GeoapifyAutocomplete::cities(client.clone(), geoapify),
        );

        if client.is_rate_limited() {
            info!("Outbound requests are rate limited");
        }

        let services = Self {
            places: Lookup::from_settings(places, &lookups.place),
            addresses: Lookup::from_settings(
                GeoapifyAutocomplete::addresses(client.clone(), geoapify),
                &lookups.address,
            ),
            geocoder: Lookup::from_settings(GeoapifyGeocoder::new(client.clone(), geoapify), &lookups.geocode),
            images: Lookup::from_settings(UnsplashImages::new(client, unsplash), &lookups.image),
        };

        if !services.places.is_available() {
            warn!("Geoapify API key not configured; place, address and geocode lookups will be empty");
        }
        if !services.images.is_available() {
            warn!("Unsplash access key not configured; image lookups will be empty");
        }
        info!(
            "Lookups ready (priority country: {})",
            geoapify.priority_country
        );

        services
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_services_from_settings() {
        let mut settings = Settings::default();
        settings.providers.geoapify.api_key = Some("geo-key".to_string());
        settings.lookups.place.capacity = 25;

        let services = LookupServices::new(&settings, HttpClient::new().unwrap());

        assert!(services.places.is_available());
        assert!(services.addresses.is_available());
        assert!(!services.images.is_available());
        assert_eq!(services.places.cache().capacity(), 25);
        assert_eq!(services.geocoder.cache().capacity(), 500);
        assert_eq!(services.places.name(), "geoapify-cities-us+geoapify-cities");
    }

    #[tokio::test]
    async fn test_unavailable_lookups_resolve_empty() {
        let services = LookupServices::new(&Settings::default(), HttpClient::new().unwrap());

        assert!(services.images.resolve("kyoto").await.is_none());
        assert!(services.geocoder.resolve("paris").await.is_none());
        assert!(services.places.resolve("paris").await.is_empty());
    }
}
