//! Travel matrix providers
//!
//! One batched call produces the full N×N duration matrix in whole minutes,
//! indexed with the origin at 0 and stops following in input order. OSRM is
//! the primary provider; a Euclidean estimator stands in whenever OSRM is
//! unconfigured or unreachable, so optimization itself never fails for lack
//! of routing.

mod osrm;

pub use osrm::{OsrmConfig, OsrmMatrixProvider};

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::defaults::ESTIMATED_MINUTES_PER_DEGREE;
use crate::types::{Coordinates, MatrixSource};

/// Travel matrix provider trait
#[async_trait]
pub trait TravelMatrixProvider: Send + Sync {
    /// Build the duration matrix in whole minutes for the given points.
    /// `points[0]` is the route origin; rows and columns follow input order.
    async fn build_matrix(
        &self,
        points: &[Coordinates],
        consider_traffic: bool,
    ) -> Result<Vec<Vec<i64>>>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// How matrices from this provider are labeled in responses
    fn source(&self) -> MatrixSource;
}

/// Coordinate-space estimator for when no routing server is reachable.
///
/// Straight-line degree distance scaled to minutes, rounded up so a leg is
/// never under-estimated. No network and no failure modes.
pub struct EuclideanMatrixProvider {
    minutes_per_degree: f64,
}

impl Default for EuclideanMatrixProvider {
    fn default() -> Self {
        Self {
            minutes_per_degree: ESTIMATED_MINUTES_PER_DEGREE,
        }
    }
}

impl EuclideanMatrixProvider {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_scale(minutes_per_degree: f64) -> Self {
        Self { minutes_per_degree }
    }
}

#[async_trait]
impl TravelMatrixProvider for EuclideanMatrixProvider {
    async fn build_matrix(
        &self,
        points: &[Coordinates],
        _consider_traffic: bool,
    ) -> Result<Vec<Vec<i64>>> {
        let n = points.len();
        let mut matrix = vec![vec![0i64; n]; n];
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let dlng = points[j].lng - points[i].lng;
                let dlat = points[j].lat - points[i].lat;
                let degrees = (dlng * dlng + dlat * dlat).sqrt();
                matrix[i][j] = (degrees * self.minutes_per_degree).ceil() as i64;
            }
        }
        Ok(matrix)
    }

    fn name(&self) -> &str {
        "Euclidean"
    }

    fn source(&self) -> MatrixSource {
        MatrixSource::Estimated
    }
}

/// Create the matrix provider from configuration.
pub fn create_matrix_provider(
    osrm_url: Option<String>,
    timeout_seconds: u64,
) -> Box<dyn TravelMatrixProvider> {
    match osrm_url {
        Some(base_url) => {
            info!("Using OSRM matrix provider at {}", base_url);
            Box::new(OsrmMatrixProvider::new(OsrmConfig {
                base_url,
                timeout_seconds,
            }))
        }
        None => {
            warn!("OSRM_URL not configured, travel times will be Euclidean estimates");
            Box::new(EuclideanMatrixProvider::new())
        }
    }
}

/// Fetch the matrix from the primary provider, falling back to Euclidean
/// estimates when it fails. Returns the matrix together with the label the
/// response should carry.
pub async fn build_matrix_with_fallback(
    provider: &dyn TravelMatrixProvider,
    points: &[Coordinates],
    consider_traffic: bool,
) -> Result<(Vec<Vec<i64>>, MatrixSource)> {
    match provider.build_matrix(points, consider_traffic).await {
        Ok(matrix) => Ok((matrix, provider.source())),
        Err(e) => {
            warn!(
                "Matrix provider '{}' failed: {}. Falling back to Euclidean estimates.",
                provider.name(),
                e
            );
            let fallback = EuclideanMatrixProvider::new();
            let matrix = fallback.build_matrix(points, consider_traffic).await?;
            Ok((matrix, MatrixSource::Estimated))
        }
    }
}
