//! Schedule projection
//!
//! Replays a visitation order against the real departure date and time,
//! stamping arrival/start/end ETAs on every stop. Early arrivals wait for
//! the window to open; late arrivals are flagged and the schedule proceeds
//! at the actual clock. Legs crossing midnight roll into the next calendar
//! day.

use chrono::NaiveDateTime;

use crate::services::timeline::{advance, time_to_minutes};
use crate::types::{OptimizedStop, RouteRequest};

/// Walk `order` from the request's start date and time, stamping ETAs.
///
/// `matrix` uses the same indexing as the sequencing pass: origin at 0,
/// stop N at N+1. Window checks compare clock times only, so a stop pushed
/// into the next day is judged against that day's window.
pub fn project(request: &RouteRequest, matrix: &[Vec<i64>], order: &[usize]) -> Vec<OptimizedStop> {
    let mut current_date = request.start_date;
    let mut current_time = request.start_time;

    let mut projected = Vec::with_capacity(order.len());

    for (position, &stop_index) in order.iter().enumerate() {
        let stop = &request.stops[stop_index];
        let previous = if position == 0 {
            0
        } else {
            order[position - 1] + 1
        };
        let travel_time = matrix[previous][stop_index + 1] + request.buffer_travel;

        let (arrival_date, arrival_time) = advance(current_date, current_time, travel_time);

        let mut conflict_window = false;
        let mut delay_minutes = 0;
        let mut start_time = arrival_time;
        if let Some(window) = &stop.time_window {
            if arrival_time < window.start {
                // Wait on site until the window opens.
                start_time = window.start;
            } else if arrival_time > window.end {
                conflict_window = true;
                delay_minutes = time_to_minutes(arrival_time) - time_to_minutes(window.end);
            }
        }

        let (end_date, end_time) = advance(
            arrival_date,
            start_time,
            stop.duration + request.buffer_stop,
        );

        projected.push(OptimizedStop {
            stop: stop.clone(),
            order: position + 1,
            travel_time_minutes: travel_time,
            eta_arrival: NaiveDateTime::new(arrival_date, arrival_time),
            eta_start: NaiveDateTime::new(arrival_date, start_time),
            eta_end: NaiveDateTime::new(end_date, end_time),
            conflict_window,
            delay_minutes,
        });

        current_date = end_date;
        current_time = end_time;
    }

    projected
}
