//! Conflict aggregation and route summary
//!
//! Merges window violations from the sequencing estimate and the projected
//! schedule, applies the return-by limit, and derives the distance proxy
//! and hour totals for the response.

use crate::defaults::DISTANCE_PROXY_FACTOR;
use crate::services::timeline::time_to_minutes;
use crate::types::{MatrixSource, OptimizationResult, OptimizedStop, RouteRequest, RouteSummary};

/// Assemble the final result from the sequencing and projection passes.
///
/// `conflicts` starts as the sequencing pass's relative-clock findings;
/// projected violations are appended in real clock time. The two can
/// disagree, so both are kept.
pub fn report(
    request: &RouteRequest,
    optimized_stops: Vec<OptimizedStop>,
    total_time: i64,
    mut conflicts: Vec<String>,
    matrix_source: MatrixSource,
) -> OptimizationResult {
    for stop in &optimized_stops {
        if stop.conflict_window {
            conflicts.push(format!(
                "Parada \"{}\" viola janela de tempo (chegada prevista: {})",
                stop.stop.address,
                stop.eta_arrival.time().format("%H:%M")
            ));
        }
    }

    let mut return_conflict = false;
    if let Some(limit) = request.return_limit {
        if let Some(last) = optimized_stops.last() {
            let end = last.eta_end.time();
            if time_to_minutes(end) > time_to_minutes(limit) {
                return_conflict = true;
                conflicts.push(format!(
                    "Horário de término ({}) ultrapassa limite de retorno ({})",
                    end.format("%H:%M"),
                    limit.format("%H:%M")
                ));
            }
        }
    }

    let travel_minutes: i64 = optimized_stops.iter().map(|s| s.travel_time_minutes).sum();
    let total_distance = (travel_minutes as f64 * DISTANCE_PROXY_FACTOR).round() as i64;

    let end_time = optimized_stops
        .last()
        .map(|s| s.eta_end.time())
        .unwrap_or(request.start_time);

    let summary = RouteSummary {
        total_stops: optimized_stops.len(),
        total_duration: (total_time as f64 / 60.0 * 10.0).round() / 10.0,
        start_time: request.start_time,
        end_time,
    };

    OptimizationResult {
        optimized_stops,
        total_time,
        total_distance,
        conflicts,
        return_conflict,
        matrix_source,
        summary,
    }
}
