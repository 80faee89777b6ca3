//! Visit-order sequencing
//!
//! Greedy nearest-neighbor over the travel matrix, with time-window-aware
//! costs and pinned stops. Single pass, no backtracking: good orders fast
//! rather than provably optimal ones. Feasibility is advisory; a stop whose
//! window cannot be met is flagged, never dropped.
//!
//! The pass runs on a relative clock (minutes from departure), so window
//! checks here are estimates. The projection pass re-checks them against
//! the real calendar.

use crate::services::timeline::{format_time, time_to_minutes};
use crate::types::Stop;

/// Result of the sequencing pass
#[derive(Debug, Clone)]
pub struct SequenceResult {
    /// Visitation order, as indices into the input stop list
    pub order: Vec<usize>,
    /// Travel + buffers + service summed over the final order, in minutes
    pub total_time: i64,
    /// Window violations seen while evaluating candidates
    pub conflicts: Vec<String>,
}

/// Sequence stops with the nearest-neighbor heuristic.
///
/// `matrix` is indexed with the origin at 0 and stop N at N+1. A fixed stop
/// claims the output position equal to its input position; movable stops
/// fill the remaining slots by lowest travel-plus-wait cost.
pub fn sequence(
    matrix: &[Vec<i64>],
    stops: &[Stop],
    buffer_travel: i64,
    buffer_stop: i64,
) -> SequenceResult {
    let n = stops.len();
    let mut conflicts: Vec<String> = Vec::new();

    // Nothing to reorder: the input order is the route.
    if stops.iter().all(|s| s.fixed) {
        return SequenceResult {
            order: (0..n).collect(),
            total_time: 0,
            conflicts,
        };
    }

    let mut order: Vec<usize> = Vec::with_capacity(n);
    let mut visited = vec![false; n];

    // Matrix index of the last visited point; 0 is the origin.
    let mut current: usize = 0;
    // Relative clock, minutes from departure
    let mut current_time: i64 = 0;

    while order.len() < n {
        let slot = order.len();

        let chosen = if stops[slot].fixed {
            slot
        } else {
            select_movable(
                matrix,
                stops,
                &visited,
                current,
                current_time,
                buffer_travel,
                &mut conflicts,
            )
        };

        let travel_time = matrix[current][chosen + 1] + buffer_travel;
        let arrival = current_time + travel_time;
        let mut service_start = arrival;
        if let Some(window) = &stops[chosen].time_window {
            let window_start = time_to_minutes(window.start);
            let window_end = time_to_minutes(window.end);
            if arrival < window_start {
                service_start = window_start;
            } else if arrival > window_end && stops[chosen].fixed {
                // Movable stops were already flagged during selection.
                conflicts.push(window_conflict(&stops[chosen].address, arrival));
            }
        }

        visited[chosen] = true;
        order.push(chosen);
        current = chosen + 1;
        current_time = service_start + stops[chosen].duration + buffer_stop;
    }

    let mut total_time = 0i64;
    for (position, &stop_index) in order.iter().enumerate() {
        let from = if position == 0 {
            0
        } else {
            order[position - 1] + 1
        };
        total_time += matrix[from][stop_index + 1]
            + buffer_travel
            + stops[stop_index].duration
            + buffer_stop;
    }

    SequenceResult {
        order,
        total_time,
        conflicts,
    }
}

/// Pick the lowest-cost feasible movable stop, or the nearest unvisited one
/// when every remaining window is already missed.
fn select_movable(
    matrix: &[Vec<i64>],
    stops: &[Stop],
    visited: &[bool],
    current: usize,
    current_time: i64,
    buffer_travel: i64,
    conflicts: &mut Vec<String>,
) -> usize {
    let mut best: Option<usize> = None;
    let mut best_cost = i64::MAX;

    for (i, stop) in stops.iter().enumerate() {
        if visited[i] || stop.fixed {
            continue;
        }

        let travel_time = matrix[current][i + 1] + buffer_travel;
        let arrival = current_time + travel_time;

        let mut wait = 0;
        let mut feasible = true;
        if let Some(window) = &stop.time_window {
            let window_start = time_to_minutes(window.start);
            let window_end = time_to_minutes(window.end);
            if arrival < window_start {
                wait = window_start - arrival;
            } else if arrival > window_end {
                feasible = false;
                conflicts.push(window_conflict(&stop.address, arrival));
            }
        }

        if feasible {
            let cost = travel_time + wait;
            if cost < best_cost {
                best_cost = cost;
                best = Some(i);
            }
        }
    }

    if let Some(best) = best {
        return best;
    }

    // Every candidate misses its window; visit the nearest one anyway.
    let mut nearest = 0;
    let mut nearest_travel = i64::MAX;
    for (i, stop) in stops.iter().enumerate() {
        if visited[i] || stop.fixed {
            continue;
        }
        let travel_time = matrix[current][i + 1] + buffer_travel;
        if travel_time < nearest_travel {
            nearest_travel = travel_time;
            nearest = i;
        }
    }
    nearest
}

fn window_conflict(address: &str, arrival: i64) -> String {
    format!(
        "Parada \"{}\" viola janela de tempo (chegada prevista: {})",
        address,
        format_time(arrival)
    )
}
