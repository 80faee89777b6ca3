//! Engine constants
//!
//! Shared by the wire defaults in `types::route` and the computation
//! services. Buffer values match what the frontend shows when the user
//! leaves the fields untouched.

/// Minutes added after every travel leg (parking, walking, transitions)
pub const DEFAULT_BUFFER_TRAVEL_MINUTES: i64 = 10;

/// Minutes added after each stop's service before the next leg starts
pub const DEFAULT_BUFFER_STOP_MINUTES: i64 = 5;

/// Multiplier turning summed travel minutes into the km-like distance proxy
pub const DISTANCE_PROXY_FACTOR: f64 = 1.2;

/// Minutes per coordinate degree for the Euclidean fallback estimator
pub const ESTIMATED_MINUTES_PER_DEGREE: f64 = 100.0;

/// Request timeout for the routing matrix service, in seconds
pub const DEFAULT_OSRM_TIMEOUT_SECONDS: u64 = 10;
