//! Lookup Coordinator demo
//!
//! Reads lines from stdin and feeds them to lookup sessions, printing every
//! delivered result as JSON.

use anyhow::Result;
use lookup_coordinator::{
    config::{self, Settings},
    network::HttpClient,
    store::{MemoryRecordStore, Record, RecordFilter, RecordOrder, RecordStore},
    LookupServices,
};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let (settings, source) = load_settings()?;

    // Initialize logging
    let default_level = if settings.general.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    info!("Starting Lookup Coordinator v{}", lookup_coordinator::VERSION);
    match source {
        Some(path) => info!("Loaded settings from: {}", path.display()),
        None => info!("No settings file found, using defaults"),
    }

    config::init(settings)?;
    let settings = config::get().ok_or_else(|| anyhow::anyhow!("Settings not initialized"))?;

    // Initialize HTTP client
    let client = HttpClient::with_settings(&settings.outgoing)?;
    let services = LookupServices::new(settings, client);
    let store = MemoryRecordStore::new().with_required("trips", &["destination"]);

    let places = services.places.session(|results| print_json("places", &results));
    let addresses = services
        .addresses
        .session(|results| print_json("addresses", &results));

    info!("Ready for input, type 'help' for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Place(text) => places.query(text),
            Command::Address(text) => addresses.query(text),
            Command::Geocode(text) => print_json("geocode", &services.geocoder.resolve(text).await),
            Command::Image(text) => print_json("image", &services.images.resolve(text).await),
            Command::Trip(text) => {
                if let Err(e) = create_trip(&services, &store, text).await {
                    warn!("Failed to create trip: {}", e);
                }
            }
            Command::Trips => {
                let trips = store
                    .read_records("trips", &RecordFilter::new(), Some(&RecordOrder::desc("created_at")))
                    .await?;
                print_json("trips", &trips);
            }
            Command::Help => print_usage(),
            Command::Quit => break,
        }
    }

    places.cancel();
    addresses.cancel();

    let caches = [
        ("place", services.places.cache().stats()),
        ("address", services.addresses.cache().stats()),
        ("geocode", services.geocoder.cache().stats()),
        ("image", services.images.cache().stats()),
    ];
    for (kind, stats) in caches {
        info!(
            "{} cache: {}/{} entries, {:.0}% hit rate",
            kind,
            stats.size,
            stats.capacity,
            stats.hit_rate() * 100.0
        );
    }
    info!("Shutting down");

    Ok(())
}

/// One line of input
enum Command<'a> {
    Place(&'a str),
    Address(&'a str),
    Geocode(&'a str),
    Image(&'a str),
    Trip(&'a str),
    Trips,
    Help,
    Quit,
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        let trimmed = line.trim_start();
        let (word, rest) = trimmed.split_once(' ').unwrap_or((trimmed, ""));
        match word {
            "address" => Self::Address(rest),
            "geocode" => Self::Geocode(rest),
            "image" => Self::Image(rest),
            "trip" => Self::Trip(rest),
            "trips" => Self::Trips,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => Self::Place(line),
        }
    }
}

/// Store a trip with coordinates and cover image for `destination`
async fn create_trip(services: &LookupServices, store: &MemoryRecordStore, destination: &str) -> Result<()> {
    let (coordinates, image) = tokio::join!(
        services.geocoder.resolve(destination),
        services.images.resolve(destination)
    );

    let mut trip = Record::new();
    trip.insert("destination".to_string(), Value::String(destination.trim().to_string()));
    trip.insert("coordinates".to_string(), serde_json::to_value(coordinates)?);
    trip.insert(
        "cover_image".to_string(),
        serde_json::to_value(image.map(|i| i.url))?,
    );

    let trip = store.create_record("trips", trip).await?;
    print_json("trip", &trip);
    Ok(())
}

fn print_json<T: Serialize>(label: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => println!("{}: {}", label, json),
        Err(e) => warn!("Failed to serialize {}: {}", label, e),
    }
}

/// Load settings from file or use defaults
fn load_settings() -> Result<(Settings, Option<PathBuf>)> {
    // Check environment variable first
    let env_path = std::env::var("LOOKUP_SETTINGS_PATH").ok().map(PathBuf::from);

    let mut paths = vec![
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("lookup-coordinator/settings.yml"));
    }

    for path in env_path.into_iter().chain(paths) {
        if path.exists() {
            let mut settings = Settings::from_file(&path)?;
            settings.merge_env();
            return Ok((settings, Some(path)));
        }
    }

    // Use defaults
    let mut settings = Settings::default();
    settings.merge_env();
    Ok((settings, None))
}

/// Print usage information
fn print_usage() {
    println!(
        r#"
Lookup Coordinator v{}

INPUT:
    <text>               Place autocomplete (debounced)
    address <text>       Address autocomplete (debounced)
    geocode <text>       Resolve coordinates
    image <text>         Find a destination cover image
    trip <destination>   Store a trip with coordinates and cover image
    trips                List stored trips
    quit                 Exit

ENVIRONMENT VARIABLES:
    LOOKUP_SETTINGS_PATH        Path to settings.yml
    LOOKUP_DEBUG                Enable debug logging (true/false)
    LOOKUP_GEOAPIFY_API_KEY     Geoapify API key
    LOOKUP_UNSPLASH_ACCESS_KEY  Unsplash access key
    LOOKUP_PRIORITY_COUNTRY     Country code ranked first in place suggestions
    LOOKUP_REQUEST_TIMEOUT      Request timeout in seconds
"#,
        lookup_coordinator::VERSION
    );
}
