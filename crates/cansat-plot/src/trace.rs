//! Plot-ready series extracted from a flight solution.

use cansat_core::FlightSolution;
use std::ops::Range;

/// A labelled 2D polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub label: &'static str,
    pub x_desc: &'static str,
    pub y_desc: &'static str,
    pub points: Vec<(f64, f64)>,
}

impl Trace {
    pub fn new(label: &'static str, x_desc: &'static str, y_desc: &'static str, xs: Vec<f64>, ys: Vec<f64>) -> Self {
        Self {
            label,
            x_desc,
            y_desc,
            points: xs.into_iter().zip(ys).collect(),
        }
    }

    /// Height above sea level against time.
    pub fn altitude(solution: &FlightSolution) -> Self {
        Self::new("Altitude", "Time (s)", "Altitude (m)", solution.time(), solution.z())
    }

    pub fn vertical_velocity(solution: &FlightSolution) -> Self {
        Self::new(
            "Vertical velocity",
            "Time (s)",
            "Vertical velocity (m/s)",
            solution.time(),
            solution.vz(),
        )
    }

    pub fn x_range(&self) -> Range<f64> {
        padded_range(self.points.iter().map(|p| p.0))
    }

    pub fn y_range(&self) -> Range<f64> {
        padded_range(self.points.iter().map(|p| p.1))
    }
}

/// A labelled 3D polyline in world coordinates (east, north, up).
#[derive(Debug, Clone, PartialEq)]
pub struct Trace3d {
    pub label: &'static str,
    pub points: Vec<(f64, f64, f64)>,
}

impl Trace3d {
    pub fn trajectory(solution: &FlightSolution) -> Self {
        let points = solution
            .x()
            .into_iter()
            .zip(solution.y())
            .zip(solution.z())
            .map(|((x, y), z)| (x, y, z))
            .collect();
        Self {
            label: "Trajectory",
            points,
        }
    }

    pub fn east_range(&self) -> Range<f64> {
        padded_range(self.points.iter().map(|p| p.0))
    }

    pub fn north_range(&self) -> Range<f64> {
        padded_range(self.points.iter().map(|p| p.1))
    }

    pub fn up_range(&self) -> Range<f64> {
        padded_range(self.points.iter().map(|p| p.2))
    }
}

/// Data bounds plus 5% either side. Flat or empty data gets a unit margin.
pub(crate) fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if min > max {
        return -1.0..1.0;
    }
    let span = max - min;
    if span < 1e-9 {
        return (min - 1.0)..(max + 1.0);
    }
    (min - 0.05 * span)..(max + 0.05 * span)
}
