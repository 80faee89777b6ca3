//! Route optimization pipeline
//!
//! Pure composition of the three passes: sequence the stops over the travel
//! matrix, project the order onto the calendar, then aggregate conflicts
//! and totals. No I/O here; the caller supplies the matrix.

use crate::services::{projector, reporter, sequencer};
use crate::types::{MatrixSource, OptimizationResult, RouteRequest};

/// Run the full optimization over an already-built travel matrix.
pub fn optimize(
    request: &RouteRequest,
    matrix: &[Vec<i64>],
    matrix_source: MatrixSource,
) -> OptimizationResult {
    let sequenced = sequencer::sequence(
        matrix,
        &request.stops,
        request.buffer_travel,
        request.buffer_stop,
    );
    let optimized_stops = projector::project(request, matrix, &sequenced.order);
    reporter::report(
        request,
        optimized_stops,
        sequenced.total_time,
        sequenced.conflicts,
        matrix_source,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::matrix::{
        build_matrix_with_fallback, EuclideanMatrixProvider, TravelMatrixProvider,
    };
    use crate::types::{Coordinates, Origin, Stop, TimeWindow};
    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveTime};
    use std::collections::HashSet;

    fn hm(hours: u32, minutes: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hours, minutes, 0).unwrap()
    }

    fn make_stop(id: &str, lat: f64, lng: f64, duration: i64) -> Stop {
        Stop {
            id: id.to_string(),
            lat,
            lng,
            duration,
            address: format!("Rua {}", id),
            eleitor_id: None,
            demanda_id: None,
            time_window: None,
            fixed: false,
        }
    }

    fn make_request(stops: Vec<Stop>) -> RouteRequest {
        RouteRequest {
            origin: Origin {
                lat: 0.0,
                lng: 0.0,
                address: "Gabinete".to_string(),
            },
            start_time: hm(8, 0),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            stops,
            buffer_travel: 10,
            buffer_stop: 5,
            return_limit: None,
            consider_traffic: true,
        }
    }

    fn uniform_matrix(points: usize, minutes: i64) -> Vec<Vec<i64>> {
        let mut matrix = vec![vec![minutes; points]; points];
        for (i, row) in matrix.iter_mut().enumerate() {
            row[i] = 0;
        }
        matrix
    }

    // ------------------------------------------------------------------
    // 1. End-to-end walkthroughs
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_two_stop_route_with_a_missed_window() {
        // B's window closes long before the route can reach it; the result
        // must say so against B's actual projected arrival.
        let mut stop_b = make_stop("b", 0.0, 2.0, 15);
        stop_b.time_window = Some(TimeWindow {
            start: hm(9, 0),
            end: hm(9, 30),
        });
        let request = make_request(vec![make_stop("a", 0.0, 1.0, 30), stop_b]);

        let provider = EuclideanMatrixProvider::new();
        let matrix = provider
            .build_matrix(&request.matrix_points(), request.consider_traffic)
            .await
            .unwrap();
        let result = optimize(&request, &matrix, provider.source());

        assert_eq!(result.optimized_stops.len(), 2);
        assert_eq!(result.optimized_stops[0].stop.id, "a");
        assert_eq!(result.optimized_stops[1].stop.id, "b");

        let b = &result.optimized_stops[1];
        assert!(b.conflict_window);
        assert_eq!(b.eta_arrival.time(), hm(12, 15));
        assert_eq!(b.delay_minutes, 165);

        assert_eq!(result.total_time, 275);
        assert_eq!(result.total_distance, 264);
        assert_eq!(result.conflicts.len(), 1);
        assert!(result.conflicts[0].contains("12:15"));
        assert_eq!(result.summary.total_duration, 4.6);
        assert_eq!(result.summary.end_time, hm(12, 35));
        assert_eq!(result.matrix_source, MatrixSource::Estimated);
    }

    #[test]
    fn test_fixed_middle_stop_stays_second() {
        let mut stops = vec![
            make_stop("a", 0.0, 0.0, 10),
            make_stop("b", 0.0, 0.0, 10),
            make_stop("c", 0.0, 0.0, 10),
        ];
        stops[1].fixed = true;
        let request = make_request(stops);
        // The pinned stop is by far the nearest; it must still wait its turn
        let matrix = vec![
            vec![0, 50, 1, 10],
            vec![50, 0, 7, 7],
            vec![1, 7, 0, 7],
            vec![10, 7, 7, 0],
        ];

        let result = optimize(&request, &matrix, MatrixSource::Routed);

        assert_eq!(result.optimized_stops[1].stop.id, "b");
        assert_eq!(result.optimized_stops[1].order, 2);
    }

    #[test]
    fn test_all_fixed_route_keeps_input_order() {
        let mut stops = vec![
            make_stop("a", 0.0, 0.0, 10),
            make_stop("b", 0.0, 0.0, 10),
            make_stop("c", 0.0, 0.0, 10),
        ];
        for stop in &mut stops {
            stop.fixed = true;
        }
        let request = make_request(stops);

        let result = optimize(&request, &uniform_matrix(4, 10), MatrixSource::Routed);

        let ids: Vec<_> = result
            .optimized_stops
            .iter()
            .map(|s| s.stop.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(result.total_time, 0);
        assert_eq!(result.summary.total_duration, 0.0);
    }

    // ------------------------------------------------------------------
    // 2. Structural properties
    // ------------------------------------------------------------------

    #[test]
    fn test_every_stop_appears_exactly_once() {
        let stops = vec![
            make_stop("a", 0.0, 0.0, 10),
            make_stop("b", 0.0, 0.0, 20),
            make_stop("c", 0.0, 0.0, 30),
            make_stop("d", 0.0, 0.0, 40),
        ];
        let request = make_request(stops);
        let matrix = vec![
            vec![0, 9, 3, 7, 5],
            vec![9, 0, 4, 8, 2],
            vec![3, 4, 0, 6, 1],
            vec![7, 8, 6, 0, 3],
            vec![5, 2, 1, 3, 0],
        ];

        let result = optimize(&request, &matrix, MatrixSource::Routed);

        let ids: HashSet<_> = result
            .optimized_stops
            .iter()
            .map(|s| s.stop.id.clone())
            .collect();
        assert_eq!(ids.len(), 4);
        assert_eq!(
            result
                .optimized_stops
                .iter()
                .map(|s| s.order)
                .collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn test_same_input_gives_identical_output() {
        let stops = vec![
            make_stop("a", 0.0, 0.0, 10),
            make_stop("b", 0.0, 0.0, 10),
            make_stop("c", 0.0, 0.0, 10),
        ];
        let request = make_request(stops);
        let matrix = uniform_matrix(4, 10);

        let first = optimize(&request, &matrix, MatrixSource::Routed);
        let second = optimize(&request, &matrix, MatrixSource::Routed);

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    // ------------------------------------------------------------------
    // 3. Degraded mode
    // ------------------------------------------------------------------

    struct UnreachableProvider;

    #[async_trait]
    impl TravelMatrixProvider for UnreachableProvider {
        async fn build_matrix(
            &self,
            _points: &[Coordinates],
            _consider_traffic: bool,
        ) -> Result<Vec<Vec<i64>>> {
            anyhow::bail!("connection refused")
        }

        fn name(&self) -> &str {
            "Unreachable"
        }

        fn source(&self) -> MatrixSource {
            MatrixSource::Routed
        }
    }

    #[tokio::test]
    async fn test_provider_outage_still_yields_a_complete_result() {
        let request = make_request(vec![
            make_stop("a", 0.0, 1.0, 30),
            make_stop("b", 0.0, 2.0, 15),
        ]);

        let (matrix, source) = build_matrix_with_fallback(
            &UnreachableProvider,
            &request.matrix_points(),
            request.consider_traffic,
        )
        .await
        .unwrap();
        let result = optimize(&request, &matrix, source);

        assert_eq!(result.matrix_source, MatrixSource::Estimated);
        assert_eq!(result.optimized_stops.len(), 2);
        assert!(result.total_time > 0);
        // Distance proxy built from the estimator's legs: (110 + 110) * 1.2
        assert_eq!(result.total_distance, 264);
    }
}
