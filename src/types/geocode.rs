//! Geocoding payloads
//!
//! Batch forward-geocoding for voter addresses. Each entry resolves
//! independently; the response always covers every submitted entry.

use serde::{Deserialize, Serialize};

use crate::types::Coordinates;

/// Batch forward-geocoding request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeRequest {
    pub entries: Vec<GeocodeEntry>,
}

/// One address to resolve
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeEntry {
    /// Caller-side record id, echoed back untouched
    pub id: String,
    pub address: String,
}

/// Per-entry outcome. `reason` is set on failure: "sem_endereco",
/// "nao_encontrado" or "api_error".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeEntryResult {
    pub id: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl GeocodeEntryResult {
    pub fn hit(id: &str, coordinates: Coordinates) -> Self {
        Self {
            id: id.to_string(),
            success: true,
            latitude: Some(coordinates.lat),
            longitude: Some(coordinates.lng),
            reason: None,
        }
    }

    pub fn miss(id: &str, reason: &str) -> Self {
        Self {
            id: id.to_string(),
            success: false,
            latitude: None,
            longitude: None,
            reason: Some(reason.to_string()),
        }
    }
}

/// Batch geocoding response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResponse {
    pub results: Vec<GeocodeEntryResult>,
    pub success_count: usize,
    pub total_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_carries_coordinates() {
        let result = GeocodeEntryResult::hit(
            "e-7",
            Coordinates {
                lat: -23.5505,
                lng: -46.6333,
            },
        );

        assert!(result.success);
        assert_eq!(result.latitude, Some(-23.5505));
        assert_eq!(result.longitude, Some(-46.6333));
        assert!(result.reason.is_none());
    }

    #[test]
    fn test_miss_omits_coordinates_on_wire() {
        let result = GeocodeEntryResult::miss("e-8", "nao_encontrado");
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["id"], "e-8");
        assert_eq!(json["success"], false);
        assert_eq!(json["reason"], "nao_encontrado");
        assert!(json.get("latitude").is_none());
        assert!(json.get("longitude").is_none());
    }

    #[test]
    fn test_response_counts_serialize_camel_case() {
        let response = GeocodeResponse {
            results: vec![GeocodeEntryResult::miss("e-9", "sem_endereco")],
            success_count: 0,
            total_count: 1,
        };
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["successCount"], 0);
        assert_eq!(json["totalCount"], 1);
        assert_eq!(json["results"].as_array().unwrap().len(), 1);
    }
}
