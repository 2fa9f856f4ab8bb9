//! Unsplash destination cover images

use crate::config::UnsplashSettings;
use crate::lookup::{LookupError, LookupResult, SourceFetcher};
use crate::network::{HttpClient, HttpRequest};
use crate::results::DestinationImage;
use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    #[serde(default)]
    urls: PhotoUrls,
    description: Option<String>,
    alt_description: Option<String>,
    user: Option<Photographer>,
}

#[derive(Debug, Default, Deserialize)]
struct PhotoUrls {
    raw: Option<String>,
    full: Option<String>,
    regular: Option<String>,
    small: Option<String>,
    thumb: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Photographer {
    name: Option<String>,
    links: Option<PhotographerLinks>,
}

#[derive(Debug, Deserialize)]
struct PhotographerLinks {
    html: Option<String>,
}

impl Photo {
    /// Photos without any usable URL are skipped
    fn into_image(self) -> Option<DestinationImage> {
        let urls = self.urls;
        let url = urls.regular.or(urls.full).or(urls.raw)?;
        let user = self.user;

        Some(DestinationImage {
            url,
            thumb_url: urls.small.or(urls.thumb),
            description: self.description.or(self.alt_description),
            photographer: user.as_ref().and_then(|u| u.name.clone()),
            photographer_url: user.and_then(|u| u.links).and_then(|l| l.html),
        })
    }
}

/// Finds a cover image for a destination name
pub struct UnsplashImages {
    client: HttpClient,
    settings: UnsplashSettings,
}

impl UnsplashImages {
    pub fn new(client: HttpClient, settings: &UnsplashSettings) -> Self {
        Self {
            client,
            settings: settings.clone(),
        }
    }

    pub fn request(&self, query: &str) -> HttpRequest {
        let url = format!(
            "{}/search/photos",
            self.settings.base_url.trim_end_matches('/')
        );
        HttpRequest::get(url)
            .param("query", query)
            .param("per_page", "1")
            .param("orientation", self.settings.orientation.clone())
            .header(
                "Authorization",
                format!(
                    "Client-ID {}",
                    self.settings.access_key.as_deref().unwrap_or_default()
                ),
            )
            .header("Accept-Version", "v1")
    }
}

#[async_trait]
impl SourceFetcher for UnsplashImages {
    type Output = Option<DestinationImage>;

    fn name(&self) -> &str {
        "unsplash"
    }

    fn is_available(&self) -> bool {
        self.settings.is_configured()
    }

    async fn fetch(&self, query: &str, cancel: &CancellationToken) -> LookupResult<Option<DestinationImage>> {
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

        let search: SearchResponse = response.json()?;
        Ok(search.results.into_iter().find_map(Photo::into_image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn images(base_url: &str) -> UnsplashImages {
        let settings = UnsplashSettings {
            access_key: Some("unsplash-key".to_string()),
            base_url: base_url.to_string(),
            ..UnsplashSettings::default()
        };
        UnsplashImages::new(HttpClient::new().unwrap(), &settings)
    }

    #[tokio::test]
    async fn test_fetch_cover_image() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/photos"))
            .and(query_param("query", "kyoto"))
            .and(query_param("orientation", "landscape"))
            .and(header("Authorization", "Client-ID unsplash-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 1,
                "results": [{
                    "urls": {"regular": "https://img.test/kyoto.jpg", "small": "https://img.test/kyoto-s.jpg"},
                    "alt_description": "temple at dusk",
                    "user": {"name": "Aiko", "links": {"html": "https://unsplash.test/@aiko"}}
                }]
            })))
            .mount(&server)
            .await;

        let image = images(&server.uri())
            .fetch("kyoto", &CancellationToken::new())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(image.url, "https://img.test/kyoto.jpg");
        assert_eq!(image.thumb_url.as_deref(), Some("https://img.test/kyoto-s.jpg"));
        assert_eq!(image.description.as_deref(), Some("temple at dusk"));
        assert_eq!(image.photographer.as_deref(), Some("Aiko"));
        assert_eq!(
            image.photographer_url.as_deref(),
            Some("https://unsplash.test/@aiko")
        );
    }

    #[tokio::test]
    async fn test_photo_without_urls_is_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"urls": {}}]
            })))
            .mount(&server)
            .await;

        let image = images(&server.uri())
            .fetch("nowhere", &CancellationToken::new())
            .await
            .unwrap();
        assert!(image.is_none());
    }

    #[tokio::test]
    async fn test_rate_limited_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Rate Limit Exceeded"))
            .mount(&server)
            .await;

        let result = images(&server.uri())
            .fetch("kyoto", &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(LookupError::Status(403))));
    }
}
