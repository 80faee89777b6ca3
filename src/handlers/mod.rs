//! NATS message handlers

pub mod geocode;
pub mod ping;
pub mod route;

use std::sync::Arc;

use anyhow::Result;
use async_nats::Client;
use tokio::select;
use tracing::{error, info};

use crate::config::Config;
use crate::services::geocoding::{create_geocoder, Geocoder};
use crate::services::matrix::{create_matrix_provider, TravelMatrixProvider};

/// Start all message handlers
pub async fn start_handlers(client: Client, config: &Config) -> Result<()> {
    info!("Starting message handlers...");

    let jwt_secret = Arc::new(config.jwt_secret.clone());

    // Create shared matrix provider
    let matrix_provider: Arc<dyn TravelMatrixProvider> = Arc::from(create_matrix_provider(
        config.osrm_url.clone(),
        config.osrm_timeout_seconds,
    ));
    info!("Matrix provider initialized: {}", matrix_provider.name());

    // Create shared geocoder
    let geocoder: Arc<dyn Geocoder> = Arc::from(create_geocoder());
    info!("Geocoder initialized: {}", geocoder.name());

    // Subscribe to all subjects
    let ping_sub = client.subscribe("gabinete.ping").await?;
    let route_optimize_sub = client.subscribe("gabinete.route.optimize").await?;
    let geocode_forward_sub = client.subscribe("gabinete.geocode.forward").await?;

    info!("Subscribed to NATS subjects");

    // Clone for each handler
    let client_ping = client.clone();
    let client_route_optimize = client.clone();
    let client_geocode_forward = client.clone();

    let jwt_route_optimize = Arc::clone(&jwt_secret);
    let jwt_geocode_forward = Arc::clone(&jwt_secret);

    // Spawn handlers
    let ping_handle = tokio::spawn(async move { ping::handle_ping(client_ping, ping_sub).await });

    let route_optimize_handle = tokio::spawn(async move {
        route::handle_optimize(
            client_route_optimize,
            route_optimize_sub,
            jwt_route_optimize,
            matrix_provider,
        )
        .await
    });

    let geocode_forward_handle = tokio::spawn(async move {
        geocode::handle_forward(
            client_geocode_forward,
            geocode_forward_sub,
            jwt_geocode_forward,
            geocoder,
        )
        .await
    });

    info!("All handlers started, waiting for messages...");

    // Wait for any handler to finish (which means an error occurred)
    select! {
        result = ping_handle => {
            error!("Ping handler finished: {:?}", result);
        }
        result = route_optimize_handle => {
            error!("Route optimize handler finished: {:?}", result);
        }
        result = geocode_forward_handle => {
            error!("Geocode forward handler finished: {:?}", result);
        }
    }

    Ok(())
}
