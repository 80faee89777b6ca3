//! Route optimization message handler

use std::sync::Arc;

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::auth;
use crate::services::matrix::{build_matrix_with_fallback, TravelMatrixProvider};
use crate::services::optimizer;
use crate::types::{ErrorResponse, Request, RouteRequest, SuccessResponse};

/// Handle route.optimize messages
///
/// Runs the full pipeline for one request: travel matrix (with degraded
/// fallback), visit sequencing, schedule projection and the conflict
/// report.
pub async fn handle_optimize(
    client: Client,
    mut subscriber: Subscriber,
    jwt_secret: Arc<String>,
    matrix_provider: Arc<dyn TravelMatrixProvider>,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received route.optimize message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        // Parse request
        let request: Request<RouteRequest> = match serde_json::from_slice(&msg.payload) {
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

        let route_request = &request.payload;

        // Validate request
        if let Err(e) = route_request.validate() {
            let error = ErrorResponse::new(request.id, "VALIDATION", e.to_string());
            let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
            continue;
        }

        // Build the travel matrix, degrading to estimates when the routing
        // server is down
        let points = route_request.matrix_points();
        let (matrix, matrix_source) = match build_matrix_with_fallback(
            matrix_provider.as_ref(),
            &points,
            route_request.consider_traffic,
        )
        .await
        {
            Ok(built) => built,
            Err(e) => {
                error!("Failed to build travel matrix: {}", e);
                let error = ErrorResponse::new(request.id, "INTERNAL", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let result = optimizer::optimize(route_request, &matrix, matrix_source);

        info!(
            "Route optimized for office {}: {} stops, {} min, {} conflicts, matrix={}",
            user_id,
            result.summary.total_stops,
            result.total_time,
            result.conflicts.len(),
            matrix_source.as_str()
        );

        let response = SuccessResponse::new(request.id, result);
        let _ = client.publish(reply, serde_json::to_vec(&response)?.into()).await;
    }

    Ok(())
}
