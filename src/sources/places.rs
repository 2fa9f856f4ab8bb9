//! Geoapify place and address autocomplete

use super::geoapify::{decode_suggestions, FeatureCollection, LabelRules};
use crate::config::GeoapifySettings;
use crate::lookup::{LookupError, LookupResult, SourceFetcher};
use crate::network::{HttpClient, HttpRequest};
use crate::results::{PlaceKind, Suggestion};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Autocomplete against Geoapify, optionally scoped to one country
pub struct GeoapifyAutocomplete {
    client: HttpClient,
    settings: GeoapifySettings,
    rules: LabelRules,
    kind: PlaceKind,
    country_filter: Option<String>,
    name: String,
}

impl GeoapifyAutocomplete {
    /// City-level suggestions
    pub fn cities(client: HttpClient, settings: &GeoapifySettings) -> Self {
        Self::new(client, settings, PlaceKind::City)
    }

    /// Free-form address suggestions
    pub fn addresses(client: HttpClient, settings: &GeoapifySettings) -> Self {
        Self::new(client, settings, PlaceKind::Address)
    }

    fn new(client: HttpClient, settings: &GeoapifySettings, kind: PlaceKind) -> Self {
        let name = match kind {
            PlaceKind::City => "geoapify-cities",
            PlaceKind::Address => "geoapify-addresses",
        };
        Self {
            client,
            settings: settings.clone(),
            rules: LabelRules {
                state_countries: settings.state_countries.clone(),
            },
            kind,
            country_filter: None,
            name: name.to_string(),
        }
    }

    /// Restrict results to one country code
    pub fn scoped_to(mut self, country_code: impl Into<String>) -> Self {
        let code = country_code.into().to_lowercase();
        self.name = format!("{}-{}", self.name, code);
        self.country_filter = Some(code);
        self
    }

    /// Build the autocomplete request for a normalized query
    pub fn request(&self, query: &str) -> HttpRequest {
        let url = format!(
            "{}/geocode/autocomplete",
            self.settings.base_url.trim_end_matches('/')
        );
        let mut request = HttpRequest::get(url)
            .param("text", query)
            .param("format", "geojson")
            .param("limit", self.settings.result_limit.to_string())
            .param("apiKey", self.settings.api_key.clone().unwrap_or_default());

        if self.kind == PlaceKind::City {
            request = request.param("type", "city");
        }
        if let Some(ref code) = self.country_filter {
            request = request.param("filter", format!("countrycode:{}", code));
        }

        request
    }
}

#[async_trait]
impl SourceFetcher for GeoapifyAutocomplete {
    type Output = Vec<Suggestion>;

    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        self.settings.is_configured()
    }

    async fn fetch(&self, query: &str, cancel: &CancellationToken) -> LookupResult<Vec<Suggestion>> {
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
        Ok(decode_suggestions(collection, &self.rules, self.kind.clone()))
    }
}
