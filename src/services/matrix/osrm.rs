//! OSRM table service client
//!
//! A single `/table/v1/driving` request returns the full duration matrix in
//! seconds. Durations are converted to whole minutes rounding up, so the
//! schedule never under-estimates a leg.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::TravelMatrixProvider;
use crate::types::{Coordinates, MatrixSource};

/// OSRM client configuration
#[derive(Debug, Clone)]
pub struct OsrmConfig {
    /// Base URL of the OSRM server (e.g. "https://router.project-osrm.org")
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://router.project-osrm.org".to_string(),
            timeout_seconds: crate::defaults::DEFAULT_OSRM_TIMEOUT_SECONDS,
        }
    }
}

/// OSRM matrix provider
pub struct OsrmMatrixProvider {
    client: Client,
    config: OsrmConfig,
}

impl OsrmMatrixProvider {
    pub fn new(config: OsrmConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Table URL: coordinates as "lng,lat" pairs joined by ';'.
    fn table_url(&self, points: &[Coordinates]) -> String {
        let coordinates = points
            .iter()
            .map(|p| format!("{:.6},{:.6}", p.lng, p.lat))
            .collect::<Vec<_>>()
            .join(";");

        format!(
            "{}/table/v1/driving/{}?annotations=duration",
            self.config.base_url, coordinates
        )
    }
}

#[derive(Debug, Deserialize)]
struct TableResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    durations: Option<Vec<Vec<Option<f64>>>>,
}

/// Convert second-based durations to a complete minute matrix. A null cell
/// means OSRM could not route between the snapped points; the caller then
/// falls back to estimates for the whole request.
fn matrix_from_durations(durations: Vec<Vec<Option<f64>>>, n: usize) -> Result<Vec<Vec<i64>>> {
    if durations.len() != n || durations.iter().any(|row| row.len() != n) {
        anyhow::bail!("OSRM returned a malformed matrix for {} points", n);
    }

    let mut matrix = vec![vec![0i64; n]; n];
    for (i, row) in durations.into_iter().enumerate() {
        for (j, cell) in row.into_iter().enumerate() {
            let seconds = cell.ok_or_else(|| anyhow!("OSRM could not route leg {} -> {}", i, j))?;
            matrix[i][j] = (seconds / 60.0).ceil() as i64;
        }
    }
    Ok(matrix)
}

#[async_trait]
impl TravelMatrixProvider for OsrmMatrixProvider {
    async fn build_matrix(
        &self,
        points: &[Coordinates],
        consider_traffic: bool,
    ) -> Result<Vec<Vec<i64>>> {
        let n = points.len();
        if n == 0 {
            return Ok(vec![]);
        }
        if n == 1 {
            return Ok(vec![vec![0]]);
        }

        if !consider_traffic {
            debug!("considerTraffic=false requested; OSRM profile durations are used as-is");
        }

        let url = self.table_url(points);
        debug!("Requesting OSRM duration matrix for {} points", n);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send table request to OSRM")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("OSRM returned error status {}: {}", status, body);
        }

        let table: TableResponse = response
            .json()
            .await
            .context("Failed to parse OSRM table response")?;

        if table.code != "Ok" {
            anyhow::bail!("OSRM error: {}", table.message.unwrap_or(table.code));
        }

        let durations = table.durations.context("OSRM response missing durations")?;
        let matrix = matrix_from_durations(durations, n)?;

        debug!("Received OSRM duration matrix ({}x{})", n, n);
        Ok(matrix)
    }

    fn name(&self) -> &str {
        "OSRM"
    }

    fn source(&self) -> MatrixSource {
        MatrixSource::Routed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sao_paulo_points() -> Vec<Coordinates> {
        vec![
            // Praça da Sé
            Coordinates {
                lat: -23.5505,
                lng: -46.6333,
            },
            // Avenida Paulista
            Coordinates {
                lat: -23.5614,
                lng: -46.6559,
            },
        ]
    }

    fn local_config() -> OsrmConfig {
        OsrmConfig {
            base_url: "http://localhost:5000".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_config_default() {
        let config = OsrmConfig::default();
        assert_eq!(config.base_url, "https://router.project-osrm.org");
        assert_eq!(config.timeout_seconds, 10);
    }

    #[test]
    fn test_table_url_is_lng_lat_ordered() {
        let provider = OsrmMatrixProvider::new(local_config());
        let url = provider.table_url(&sao_paulo_points());

        assert_eq!(
            url,
            "http://localhost:5000/table/v1/driving/\
             -46.633300,-23.550500;-46.655900,-23.561400?annotations=duration"
        );
    }

    #[test]
    fn test_table_response_parses() {
        let json = r#"{
            "code": "Ok",
            "durations": [[0, 90.5], [110.2, 0]]
        }"#;
        let table: TableResponse = serde_json::from_str(json).unwrap();

        assert_eq!(table.code, "Ok");
        let durations = table.durations.unwrap();
        assert_eq!(durations[0][1], Some(90.5));
    }

    #[test]
    fn test_matrix_from_durations_rounds_up_to_minutes() {
        let durations = vec![vec![Some(0.0), Some(90.5)], vec![Some(110.2), Some(0.0)]];

        let matrix = matrix_from_durations(durations, 2).unwrap();

        // 90.5s -> 1.51 min -> 2; 110.2s -> 1.84 min -> 2
        assert_eq!(matrix, vec![vec![0, 2], vec![2, 0]]);
    }

    #[test]
    fn test_matrix_from_durations_rejects_null_cells() {
        let durations = vec![vec![Some(0.0), None], vec![Some(60.0), Some(0.0)]];

        let result = matrix_from_durations(durations, 2);

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("could not route"));
    }

    #[test]
    fn test_matrix_from_durations_rejects_wrong_dimensions() {
        let durations = vec![vec![Some(0.0)]];

        assert!(matrix_from_durations(durations, 2).is_err());
    }

    #[tokio::test]
    #[ignore = "Requires network access to the public OSRM server"]
    async fn test_build_matrix_against_public_server() {
        let provider = OsrmMatrixProvider::new(OsrmConfig::default());

        let matrix = provider
            .build_matrix(&sao_paulo_points(), true)
            .await
            .unwrap();

        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix[0][0], 0);
        // Sé to Paulista is a short drive, but never instantaneous
        assert!(matrix[0][1] > 0, "expected positive travel time");
        assert!(matrix[0][1] < 120, "got {} min", matrix[0][1]);
    }
}
