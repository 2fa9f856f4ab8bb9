//! Geoapify forward geocoding

use super::geoapify::{decode_coordinates, Decoded, FeatureCollection};
use crate::config::GeoapifySettings;
use crate::lookup::{LookupError, LookupResult, SourceFetcher};
use crate::network::{HttpClient, HttpRequest};
use crate::results::GeocodeResult;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Resolves an address to coordinates
pub struct GeoapifyGeocoder {
    client: HttpClient,
    settings: GeoapifySettings,
}

impl GeoapifyGeocoder {
    pub fn new(client: HttpClient, settings: &GeoapifySettings) -> Self {
        Self {
            client,
            settings: settings.clone(),
        }
    }

    pub fn request(&self, query: &str) -> HttpRequest {
        let url = format!(
            "{}/geocode/search",
            self.settings.base_url.trim_end_matches('/')
        );
        HttpRequest::get(url)
            .param("text", query)
            .param("format", "geojson")
            .param("limit", "1")
            .param("apiKey", self.settings.api_key.clone().unwrap_or_default())
    }
}

#[async_trait]
impl SourceFetcher for GeoapifyGeocoder {
    type Output = Option<GeocodeResult>;

    fn name(&self) -> &str {
        "geoapify-geocode"
    }

    fn is_available(&self) -> bool {
        self.settings.is_configured()
    }

    async fn fetch(&self, query: &str, cancel: &CancellationToken) -> LookupResult<Option<GeocodeResult>> {
        if !self.is_available() {
            return Err(LookupError::Unavailable);
        }

        let response = self
            .client
            .execute_cancellable(self.request(query), cancel)
            .await?;

        if !response.is_success() {
            return Err(LookupError::Status(response.status));
        }

        let collection: FeatureCollection = response.json()?;

        // First feature with usable coordinates
        Ok(collection
            .features
            .into_iter()
            .find_map(|feature| match decode_coordinates(feature) {
                Decoded::Item(coords) => Some(coords),
                Decoded::Skip(_) => None,
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn geocoder(base_url: &str) -> GeoapifyGeocoder {
        let settings = GeoapifySettings {
            api_key: Some("test-key".to_string()),
            base_url: base_url.to_string(),
            ..GeoapifySettings::default()
        };
        GeoapifyGeocoder::new(HttpClient::new().unwrap(), &settings)
    }

    #[tokio::test]
    async fn test_geocode_first_usable_feature() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geocode/search"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "features": [
                    {"properties": {"formatted": "nowhere"}},
                    {"properties": {"lat": 48.8566, "lon": 2.3522}}
                ]
            })))
            .mount(&server)
            .await;

        let result = geocoder(&server.uri())
            .fetch("paris", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result, Some(GeocodeResult { lat: 48.8566, lon: 2.3522 }));
    }

    #[tokio::test]
    async fn test_geocode_no_features() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"features": []})))
            .mount(&server)
            .await;

        let result = geocoder(&server.uri())
            .fetch("atlantis", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result, None);
    }
}
