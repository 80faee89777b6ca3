//! Nominatim search client
//!
//! Thin client over the Nominatim HTTP API. Forward geocoding only, first
//! match wins. Request spacing is the caller's responsibility.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::types::Coordinates;

/// A resolved place
#[derive(Debug, Clone)]
pub struct NominatimPlace {
    pub coordinates: Coordinates,
    pub display_name: String,
}

/// Nominatim API response row
#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
    display_name: String,
}

/// Nominatim API client
pub struct NominatimClient {
    base_url: String,
    client: reqwest::Client,
}

impl NominatimClient {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("GabineteApp/1.0 (https://gabinetefacil.com.br)")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn search_url(&self, address: &str) -> String {
        format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url,
            urlencoding::encode(address)
        )
    }

    /// Forward-geocode a free-text address. Ok(None) when Nominatim has no
    /// match; Err when the request itself fails, so callers can tell the
    /// two apart.
    pub async fn search(&self, address: &str) -> Result<Option<NominatimPlace>> {
        let url = self.search_url(address);
        debug!("Nominatim search for '{}'", address);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send geocoding request to Nominatim")?;

        if !response.status().is_success() {
            anyhow::bail!("Nominatim returned status {}", response.status());
        }

        let results: Vec<SearchResult> = response
            .json()
            .await
            .context("Failed to parse Nominatim response")?;

        match results.into_iter().next() {
            Some(result) => {
                let lat: f64 = result
                    .lat
                    .parse()
                    .context("Invalid latitude from Nominatim")?;
                let lng: f64 = result
                    .lon
                    .parse()
                    .context("Invalid longitude from Nominatim")?;

                Ok(Some(NominatimPlace {
                    coordinates: Coordinates { lat, lng },
                    display_name: result.display_name,
                }))
            }
            None => Ok(None),
        }
    }
}
