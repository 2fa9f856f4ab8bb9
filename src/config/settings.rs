//! Settings structures for lookup configuration

use crate::query::DEFAULT_MIN_QUERY_LEN;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Credential values shipped in sample configs that must never be sent
const PLACEHOLDER_CREDENTIALS: &[&str] = &[
    "your_api_key",
    "your-api-key",
    "your_geoapify_api_key",
    "your_unsplash_access_key",
    "changeme",
    "placeholder",
];

/// True iff a credential is set and is not a known placeholder
pub fn credential_configured(credential: Option<&str>) -> bool {
    match credential.map(str::trim) {
        None | Some("") => false,
        Some(value) => !PLACEHOLDER_CREDENTIALS
            .iter()
            .any(|p| p.eq_ignore_ascii_case(value)),
    }
}

/// Main settings structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub providers: ProviderSettings,
    pub outgoing: OutgoingSettings,
    pub lookups: LookupsSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse settings from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    /// Merge with environment variables (LOOKUP_* prefix)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("LOOKUP_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if let Ok(val) = std::env::var("LOOKUP_GEOAPIFY_API_KEY") {
            self.providers.geoapify.api_key = Some(val);
        }
        if let Ok(val) = std::env::var("LOOKUP_UNSPLASH_ACCESS_KEY") {
            self.providers.unsplash.access_key = Some(val);
        }
        if let Ok(val) = std::env::var("LOOKUP_PRIORITY_COUNTRY") {
            self.providers.geoapify.priority_country = val.to_lowercase();
        }
        if let Ok(val) = std::env::var("LOOKUP_REQUEST_TIMEOUT") {
            if let Ok(timeout) = val.parse() {
                self.outgoing.request_timeout = timeout;
            }
        }
    }
}

/// General settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug logging
    pub debug: bool,
}

/// External provider credentials and endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub geoapify: GeoapifySettings,
    pub unsplash: UnsplashSettings,
}

/// Geoapify autocomplete and geocoding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoapifySettings {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Country the scoped autocomplete source is filtered to
    pub priority_country: String,
    /// Maximum results requested per call
    pub result_limit: u32,
    /// Countries whose labels include the state
    pub state_countries: Vec<String>,
}

impl Default for GeoapifySettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.geoapify.com/v1".to_string(),
            priority_country: "us".to_string(),
            result_limit: 5,
            state_countries: vec!["us".to_string(), "ca".to_string(), "au".to_string()],
        }
    }
}

impl GeoapifySettings {
    pub fn is_configured(&self) -> bool {
        credential_configured(self.api_key.as_deref())
    }
}

/// Unsplash image search
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UnsplashSettings {
    pub access_key: Option<String>,
    pub base_url: String,
    /// landscape, portrait or squarish
    pub orientation: String,
}

impl Default for UnsplashSettings {
    fn default() -> Self {
        Self {
            access_key: None,
            base_url: "https://api.unsplash.com".to_string(),
            orientation: "landscape".to_string(),
        }
    }
}

impl UnsplashSettings {
    pub fn is_configured(&self) -> bool {
        credential_configured(self.access_key.as_deref())
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Default request timeout in seconds
    pub request_timeout: f64,
    /// Pool max size
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
    /// Outbound request budget shared by all providers
    pub requests_per_second: Option<u32>,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 5.0,
            pool_maxsize: 20,
            verify_ssl: true,
            proxies: ProxySettings::default(),
            requests_per_second: None,
            user_agent: format!("lookup-coordinator/{}", crate::VERSION),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

/// Per-kind lookup tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupsSettings {
    pub place: LookupSettings,
    pub address: LookupSettings,
    pub geocode: LookupSettings,
    pub image: LookupSettings,
}

impl Default for LookupsSettings {
    fn default() -> Self {
        Self {
            place: LookupSettings::default(),
            address: LookupSettings::default(),
            geocode: LookupSettings {
                ttl_secs: 86_400,
                capacity: 500,
                ..LookupSettings::default()
            },
            image: LookupSettings {
                ttl_secs: 86_400,
                capacity: 50,
                ..LookupSettings::default()
            },
        }
    }
}

/// Cache and scheduling settings for one lookup kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupSettings {
    /// Seconds a cached result stays valid
    pub ttl_secs: u64,
    /// Maximum cached queries
    pub capacity: usize,
    /// Quiet window before a query is dispatched
    pub debounce_ms: u64,
    /// Shorter queries resolve empty without any lookup
    pub min_query_len: usize,
    /// Deliver cache hits provisionally and fetch anyway
    pub revalidate_on_hit: bool,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            capacity: 100,
            debounce_ms: crate::DEFAULT_DEBOUNCE_MS,
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            revalidate_on_hit: false,
        }
    }
}

impl LookupSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.lookups.place.debounce_ms, 50);
        assert_eq!(settings.lookups.place.min_query_len, 2);
        assert_eq!(settings.lookups.geocode.ttl_secs, 86_400);
        assert_eq!(settings.lookups.image.capacity, 50);
        assert_eq!(settings.providers.geoapify.priority_country, "us");
        assert!(!settings.providers.geoapify.is_configured());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
providers:
  geoapify:
    api_key: abc123
lookups:
  place:
    debounce_ms: 120
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        assert!(settings.providers.geoapify.is_configured());
        assert_eq!(settings.lookups.place.debounce_ms, 120);
        assert_eq!(settings.lookups.place.capacity, 100);
        assert_eq!(settings.providers.geoapify.result_limit, 5);
    }

    #[test]
    fn test_placeholder_credentials() {
        assert!(!credential_configured(None));
        assert!(!credential_configured(Some("  ")));
        assert!(!credential_configured(Some("YOUR_API_KEY")));
        assert!(!credential_configured(Some(" your_geoapify_api_key ")));
        assert!(credential_configured(Some("k-123")));
    }
}
