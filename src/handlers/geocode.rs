//! Batch forward-geocoding handler
//!
//! Resolves voter addresses to coordinates. Entries resolve one at a time
//! through the shared geocoder (which applies its own rate limiting), and
//! a lookup failure marks the entry, never the whole request.

use std::sync::Arc;

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::auth;
use crate::services::geocoding::Geocoder;
use crate::types::{
    ErrorResponse, GeocodeEntryResult, GeocodeRequest, GeocodeResponse, Request, SuccessResponse,
};

/// Handle geocode.forward messages
pub async fn handle_forward(
    client: Client,
    mut subscriber: Subscriber,
    jwt_secret: Arc<String>,
    geocoder: Arc<dyn Geocoder>,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received geocode.forward message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        // Parse request
        let request: Request<GeocodeRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        // Check auth
        let user_id = match auth::extract_auth(&request, &jwt_secret) {
            Ok(info) => info.data_user_id(),
            Err(_) => {
                let error = ErrorResponse::new(request.id, "UNAUTHORIZED", "Authentication required");
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let entries = &request.payload.entries;
        debug!("Geocoding {} entries for office {}", entries.len(), user_id);

        let mut results = Vec::with_capacity(entries.len());
        for entry in entries {
            let outcome = if entry.address.trim().is_empty() {
                GeocodeEntryResult::miss(&entry.id, "sem_endereco")
            } else {
                match geocoder.geocode(&entry.address).await {
                    Ok(Some(hit)) => {
                        debug!("Entry {} resolved to '{}'", entry.id, hit.display_name);
                        GeocodeEntryResult::hit(&entry.id, hit.coordinates)
                    }
                    Ok(None) => GeocodeEntryResult::miss(&entry.id, "nao_encontrado"),
                    Err(e) => {
                        warn!("Geocoding failed for entry {}: {}", entry.id, e);
                        GeocodeEntryResult::miss(&entry.id, "api_error")
                    }
                }
            };
            results.push(outcome);
        }

        let success_count = results.iter().filter(|r| r.success).count();
        info!(
            "Geocoding complete: {}/{} resolved",
            success_count,
            results.len()
        );

        let response = SuccessResponse::new(
            request.id,
            GeocodeResponse {
                total_count: results.len(),
                success_count,
                results,
            },
        );
        let _ = client.publish(reply, serde_json::to_vec(&response)?.into()).await;
    }

    Ok(())
}
