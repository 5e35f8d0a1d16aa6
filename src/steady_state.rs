//! Time averaging of the capacitor voltage over the trailing sampling window.

use crate::series::{CAPACITOR_VOLTAGE, TIME};
use crate::TimeSeries;

/// Area under one trapezoid spanning a single time step.
#[inline]
pub fn trapezoid(last: f64, next: f64, delta_t: f64) -> f64 {
    0.5 * (next + last) * delta_t
}

/// Converts an accumulated integral into a time average over `[sampling_start, horizon]`.
///
/// The window is checked when the simulation is created, so an empty window here yields a
/// non-finite result rather than an error.
#[inline]
pub fn average(sum: f64, sampling_start: f64, horizon: f64) -> f64 {
    sum / (horizon - sampling_start)
}

/// Recomputes the steady state value from a stored series.
///
/// Integrates every step whose starting time is at or after `sampling_start`, the same way
/// a running simulation accumulates it.
pub fn average_series(series: &TimeSeries, sampling_start: f64, horizon: f64) -> f64 {
    let window = series.window(sampling_start);
    let sum = window
        .outer_iter()
        .zip(window.outer_iter().skip(1))
        .map(|(last, next)| {
            trapezoid(
                last[CAPACITOR_VOLTAGE],
                next[CAPACITOR_VOLTAGE],
                next[TIME] - last[TIME],
            )
        })
        .sum::<f64>();

    average(sum, sampling_start, horizon)
}
