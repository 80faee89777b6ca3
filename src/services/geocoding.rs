//! Geocoding abstraction
//!
//! Two backends behind one trait: a deterministic mock for tests and local
//! development, and the rate-limited Nominatim client for production. The
//! backend is chosen once at startup from the GEOCODER_BACKEND env
//! variable:
//! - "mock" → MockGeocoder (tests, development)
//! - "nominatim" → NominatimGeocoder (production)

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::services::nominatim::NominatimClient;
use crate::types::Coordinates;

/// Geocoder trait
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a free-text address to coordinates. Ok(None) means the
    /// backend does not know the address; Err means the lookup itself
    /// failed.
    async fn geocode(&self, address: &str) -> Result<Option<GeocodingHit>>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// A successful geocoding lookup
#[derive(Debug, Clone)]
pub struct GeocodingHit {
    pub coordinates: Coordinates,
    pub display_name: String,
}


// Brazil's settled band, roughly Porto Alegre to Fortaleza
const MOCK_LAT_MIN: f64 = -30.0;
const MOCK_LAT_MAX: f64 = -2.0;
const MOCK_LNG_MIN: f64 = -60.0;
const MOCK_LNG_MAX: f64 = -35.0;

/// Deterministic stand-in: hashes the address into coordinates inside
/// Brazil, so the same address always lands on the same spot. No network.
pub struct MockGeocoder;

impl MockGeocoder {
    pub fn new() -> Self {
        Self
    }

    fn hash_to_coordinates(address: &str) -> Coordinates {
        let mut hasher = DefaultHasher::new();
        address.hash(&mut hasher);
        let hash = hasher.finish();

        let lat_unit = (hash >> 32) as f64 / u32::MAX as f64;
        let lng_unit = (hash & 0xFFFF_FFFF) as f64 / u32::MAX as f64;

        Coordinates {
            lat: MOCK_LAT_MIN + lat_unit * (MOCK_LAT_MAX - MOCK_LAT_MIN),
            lng: MOCK_LNG_MIN + lng_unit * (MOCK_LNG_MAX - MOCK_LNG_MIN),
        }
    }
}

impl Default for MockGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Geocoder for MockGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<GeocodingHit>> {
        if address.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(GeocodingHit {
            coordinates: Self::hash_to_coordinates(address),
            display_name: format!("{} (simulado)", address),
        }))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Spaces calls at least `min_interval` apart. The lock is held across the
/// sleep, so concurrent callers queue instead of stampeding the API.
pub struct RateLimiter {
    last_call: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_call: Mutex::new(None),
            min_interval,
        }
    }

    pub async fn wait(&self) {
        let mut last = self.last_call.lock().await;
        if let Some(at) = *last {
            let wait_for = self.min_interval.saturating_sub(at.elapsed());
            if !wait_for.is_zero() {
                tokio::time::sleep(wait_for).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// Minimum spacing between Nominatim requests. The public instance allows
/// one request per second.
const NOMINATIM_MIN_INTERVAL: Duration = Duration::from_millis(1100);

/// Nominatim backend with request spacing applied before every lookup
pub struct NominatimGeocoder {
    client: NominatimClient,
    limiter: RateLimiter,
}

impl NominatimGeocoder {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: NominatimClient::new(base_url),
            limiter: RateLimiter::new(NOMINATIM_MIN_INTERVAL),
        }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<GeocodingHit>> {
        self.limiter.wait().await;
        let place = self.client.search(address).await?;
        Ok(place.map(|p| GeocodingHit {
            coordinates: p.coordinates,
            display_name: p.display_name,
        }))
    }

    fn name(&self) -> &'static str {
        "nominatim"
    }
}

/// Create the geocoder backend from GEOCODER_BACKEND ("mock" by default).
pub fn create_geocoder() -> Box<dyn Geocoder> {
    let backend = std::env::var("GEOCODER_BACKEND").unwrap_or_else(|_| "mock".to_string());

    match backend.as_str() {
        "nominatim" => {
            let base_url = std::env::var("NOMINATIM_URL")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string());
            info!("Using rate-limited Nominatim geocoder at {}", base_url);
            Box::new(NominatimGeocoder::new(&base_url))
        }
        "mock" => {
            info!("Using mock geocoder");
            Box::new(MockGeocoder::new())
        }
        other => {
            warn!("Unknown GEOCODER_BACKEND '{}', using mock geocoder", other);
            Box::new(MockGeocoder::new())
        }
    }
}
