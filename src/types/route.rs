//! Route optimization types
//!
//! Wire contract for the `gabinete.route.optimize` subject. Field names
//! follow the frontend's camelCase JSON; the `eleitor_id`/`demanda_id`
//! entity references keep their snake_case wire names.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::defaults::{DEFAULT_BUFFER_STOP_MINUTES, DEFAULT_BUFFER_TRAVEL_MINUTES};

/// Coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// "HH:MM" clock times on the wire.
pub mod serde_hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::services::timeline;

    pub fn serialize<S>(value: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let minutes = timeline::parse_time(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid clock time '{}'", raw)))?;
        Ok(timeline::minutes_to_time(minutes))
    }
}

/// Optional "HH:MM" clock times on the wire.
pub mod serde_hhmm_opt {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::services::timeline;

    pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(time) => serializer.serialize_str(&time.format("%H:%M").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| {
            timeline::parse_time(&s)
                .map(timeline::minutes_to_time)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid clock time '{}'", s)))
        })
        .transpose()
    }
}

/// Allowed service interval for a stop, in clock time
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    #[serde(with = "serde_hhmm")]
    pub start: NaiveTime,
    #[serde(with = "serde_hhmm")]
    pub end: NaiveTime,
}

/// A visit stop as submitted by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    /// Service duration in minutes
    pub duration: i64,
    pub address: String,
    /// Voter record behind this visit (opaque, never interpreted)
    #[serde(rename = "eleitor_id", default, skip_serializing_if = "Option::is_none")]
    pub eleitor_id: Option<String>,
    /// Service-request record behind this visit (opaque, never interpreted)
    #[serde(rename = "demanda_id", default, skip_serializing_if = "Option::is_none")]
    pub demanda_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_window: Option<TimeWindow>,
    /// Pinned stop: keeps its input position in the final order
    #[serde(default)]
    pub fixed: bool,
}

impl Stop {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

/// Route starting point
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Origin {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
}

impl Origin {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

/// Request to optimize a field-visit route
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    pub origin: Origin,
    /// Departure clock time ("HH:MM")
    #[serde(with = "serde_hhmm")]
    pub start_time: NaiveTime,
    /// Departure calendar date ("YYYY-MM-DD")
    pub start_date: NaiveDate,
    pub stops: Vec<Stop>,
    /// Minutes added after every travel leg (parking, transitions)
    #[serde(default = "default_buffer_travel")]
    pub buffer_travel: i64,
    /// Minutes added after each stop's service before the next leg
    #[serde(default = "default_buffer_stop")]
    pub buffer_stop: i64,
    /// Clock time the whole route must finish by
    #[serde(default, with = "serde_hhmm_opt", skip_serializing_if = "Option::is_none")]
    pub return_limit: Option<NaiveTime>,
    #[serde(default = "default_consider_traffic")]
    pub consider_traffic: bool,
}

fn default_buffer_travel() -> i64 {
    DEFAULT_BUFFER_TRAVEL_MINUTES
}

fn default_buffer_stop() -> i64 {
    DEFAULT_BUFFER_STOP_MINUTES
}

fn default_consider_traffic() -> bool {
    true
}

/// Request shape violation (client error, computation not attempted)
#[derive(Debug, Error)]
pub enum RouteRequestError {
    #[error("route has no stops")]
    NoStops,
    #[error("origin coordinates are not finite")]
    InvalidOrigin,
    #[error("stop '{0}' has non-finite coordinates")]
    InvalidStopCoordinates(String),
    #[error("stop '{0}' has a negative service duration")]
    NegativeDuration(String),
    #[error("buffers must not be negative")]
    NegativeBuffer,
}

impl RouteRequest {
    /// Reject malformed inputs before any computation starts.
    pub fn validate(&self) -> Result<(), RouteRequestError> {
        if self.stops.is_empty() {
            return Err(RouteRequestError::NoStops);
        }
        if !self.origin.lat.is_finite() || !self.origin.lng.is_finite() {
            return Err(RouteRequestError::InvalidOrigin);
        }
        for stop in &self.stops {
            if !stop.lat.is_finite() || !stop.lng.is_finite() {
                return Err(RouteRequestError::InvalidStopCoordinates(stop.id.clone()));
            }
            if stop.duration < 0 {
                return Err(RouteRequestError::NegativeDuration(stop.id.clone()));
            }
        }
        if self.buffer_travel < 0 || self.buffer_stop < 0 {
            return Err(RouteRequestError::NegativeBuffer);
        }
        Ok(())
    }

    /// Point list for the travel matrix: origin first, then stops in
    /// input order.
    pub fn matrix_points(&self) -> Vec<Coordinates> {
        let mut points = Vec::with_capacity(self.stops.len() + 1);
        points.push(self.origin.coordinates());
        for stop in &self.stops {
            points.push(stop.coordinates());
        }
        points
    }
}

/// Which provider produced the travel matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatrixSource {
    /// Road-routed durations from the external matrix service
    Routed,
    /// Euclidean approximation (degraded mode, less reliable ETAs)
    Estimated,
}

impl MatrixSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            MatrixSource::Routed => "routed",
            MatrixSource::Estimated => "estimated",
        }
    }
}

/// A stop decorated with its computed place in the schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedStop {
    #[serde(flatten)]
    pub stop: Stop,
    /// 1-based position in the visitation sequence
    pub order: usize,
    /// Minutes of the leg that reached this stop, travel buffer included
    pub travel_time_minutes: i64,
    pub eta_arrival: NaiveDateTime,
    pub eta_start: NaiveDateTime,
    pub eta_end: NaiveDateTime,
    pub conflict_window: bool,
    /// Minutes past the window end when `conflict_window` is set, else 0
    pub delay_minutes: i64,
}

/// Response summary block
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub total_stops: usize,
    /// Route duration in hours, one decimal
    pub total_duration: f64,
    #[serde(with = "serde_hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "serde_hhmm")]
    pub end_time: NaiveTime,
}

/// Result of route optimization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub optimized_stops: Vec<OptimizedStop>,
    /// Travel + buffers + service over the chosen order, in minutes
    pub total_time: i64,
    /// Minutes-derived distance proxy, not road kilometers
    pub total_distance: i64,
    pub conflicts: Vec<String>,
    pub return_conflict: bool,
    pub matrix_source: MatrixSource,
    pub summary: RouteSummary,
}
