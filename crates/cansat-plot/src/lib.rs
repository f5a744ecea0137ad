//! # CanSat Plot
//!
//! Renders a [`FlightSolution`](cansat_core::FlightSolution) to PNG:
//! altitude and vertical velocity against time, and the 3D trajectory.
//!
//! Every chart is drawn into a [`Figure`] taken from a [`FigureRegistry`].
//! A figure gives its slot back when dropped, so the registry's open count
//! returns to zero after each render whether it succeeded or not.

pub mod error;
pub mod figure;
pub mod render;
pub mod trace;

pub use error::PlotError;
pub use figure::{Figure, FigureRegistry};
pub use render::{
    render_inline, render_report_png, render_time_series_png, render_trajectory_png, to_base64, InlineFigures,
};
pub use trace::{Trace, Trace3d};
