//! Chart layout and PNG/base64 output.

use crate::error::PlotError;
use crate::figure::FigureRegistry;
use crate::trace::{Trace, Trace3d};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use cansat_core::FlightSolution;
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::debug;

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------
const FONT: &str = "sans-serif";
const WIDTH: u32 = 1000;
const TIME_SERIES_HEIGHT: u32 = 800;
const TRAJECTORY_HEIGHT: u32 = 800;

const ALTITUDE_COLOR: RGBColor = BLUE;
const VELOCITY_COLOR: RGBColor = RED;
const TRAJECTORY_COLOR: RGBColor = RGBColor(0, 128, 0);

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------
/// Altitude and vertical velocity panels, stacked.
pub fn render_time_series_png(registry: &FigureRegistry, solution: &FlightSolution) -> Result<Vec<u8>, PlotError> {
    let mut figure = registry.acquire(WIDTH, TIME_SERIES_HEIGHT);
    figure.draw(|root| draw_time_series(root, solution))?;
    figure.into_png()
}

pub fn render_trajectory_png(registry: &FigureRegistry, solution: &FlightSolution) -> Result<Vec<u8>, PlotError> {
    let mut figure = registry.acquire(WIDTH, TRAJECTORY_HEIGHT);
    figure.draw(|root| draw_trajectory(root, &Trace3d::trajectory(solution)))?;
    figure.into_png()
}

/// Time series above the 3D trajectory in a single image.
pub fn render_report_png(registry: &FigureRegistry, solution: &FlightSolution) -> Result<Vec<u8>, PlotError> {
    let mut figure = registry.acquire(WIDTH, TIME_SERIES_HEIGHT + TRAJECTORY_HEIGHT);
    figure.draw(|root| {
        let (top, bottom) = root.split_vertically(TIME_SERIES_HEIGHT);
        draw_time_series(&top, solution)?;
        draw_trajectory(&bottom, &Trace3d::trajectory(solution))
    })?;
    figure.into_png()
}

pub fn to_base64(png: &[u8]) -> String {
    STANDARD.encode(png)
}

/// Both charts as base64 PNG, ready for `data:` URIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineFigures {
    pub time_series: String,
    pub trajectory: String,
}

/// Render both charts one after the other. Each figure is closed as soon as
/// it has been encoded.
pub fn render_inline(registry: &FigureRegistry, solution: &FlightSolution) -> Result<InlineFigures, PlotError> {
    let time_series = to_base64(&render_time_series_png(registry, solution)?);
    let trajectory = to_base64(&render_trajectory_png(registry, solution)?);
    debug!(
        time_series_len = time_series.len(),
        trajectory_len = trajectory.len(),
        open_figures = registry.open_figures(),
        "figures encoded"
    );
    Ok(InlineFigures {
        time_series,
        trajectory,
    })
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------
fn draw_time_series(area: &Area<'_>, solution: &FlightSolution) -> Result<(), PlotError> {
    let (_, height) = area.dim_in_pixel();
    let (upper, lower) = area.split_vertically(height / 2);
    draw_panel(&upper, &Trace::altitude(solution), ALTITUDE_COLOR, "Altitude vs Time")?;
    draw_panel(&lower, &Trace::vertical_velocity(solution), VELOCITY_COLOR, "Vertical Velocity vs Time")
}

fn draw_panel(area: &Area<'_>, trace: &Trace, color: RGBColor, caption: &str) -> Result<(), PlotError> {
    if trace.points.is_empty() {
        return Err(PlotError::Empty(trace.label));
    }

    let mut chart = ChartBuilder::on(area)
        .caption(caption, (FONT, 24).into_font())
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(trace.x_range(), trace.y_range())?;

    chart
        .configure_mesh()
        .x_desc(trace.x_desc)
        .y_desc(trace.y_desc)
        .axis_desc_style((FONT, 16).into_font())
        .label_style((FONT, 13).into_font())
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            trace.points.iter().copied(),
            ShapeStyle::from(&color).stroke_width(2),
        ))?
        .label(trace.label)
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], ShapeStyle::from(&color).stroke_width(2)));

    chart
        .configure_series_labels()
        .label_font((FONT, 14).into_font())
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

// plotters' 3D Y axis is vertical, so world (east, north, up) is drawn as (east, up, north).
fn draw_trajectory(area: &Area<'_>, trace: &Trace3d) -> Result<(), PlotError> {
    if trace.points.is_empty() {
        return Err(PlotError::Empty(trace.label));
    }

    let (east, north, up) = (trace.east_range(), trace.north_range(), trace.up_range());
    let mut chart = ChartBuilder::on(area)
        .caption("3D Trajectory", (FONT, 24).into_font())
        .margin(20)
        .build_cartesian_3d(east.clone(), up.clone(), north.clone())?;

    chart.with_projection(|mut pb| {
        pb.yaw = 0.6;
        pb.pitch = 0.3;
        pb.scale = 0.85;
        pb.into_matrix()
    });

    chart
        .configure_axes()
        .light_grid_style(BLACK.mix(0.1))
        .max_light_lines(3)
        .label_style((FONT, 12).into_font())
        .draw()?;

    let axis_style = TextStyle::from((FONT, 16).into_font());
    chart.draw_series([
        Text::new("East (m)", (east.end, up.start, north.start), axis_style.clone()),
        Text::new("Altitude (m)", (east.start, up.end, north.start), axis_style.clone()),
        Text::new("North (m)", (east.start, up.start, north.end), axis_style),
    ])?;

    chart
        .draw_series(LineSeries::new(
            trace.points.iter().map(|&(x, y, z)| (x, z, y)),
            ShapeStyle::from(&TRAJECTORY_COLOR).stroke_width(2),
        ))?
        .label(trace.label)
        .legend(|(x, y)| {
            PathElement::new(
                vec![(x, y), (x + 20, y)],
                ShapeStyle::from(&TRAJECTORY_COLOR).stroke_width(2),
            )
        });

    chart
        .configure_series_labels()
        .label_font((FONT, 14).into_font())
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cansat_core::sim::SolutionMatrix;

    const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn solution(rows: usize) -> FlightSolution {
        let mut matrix = SolutionMatrix::new(14);
        for i in 0..rows {
            let t = i as f64 * 0.1;
            let mut row = [0.0; 14];
            row[0] = t;
            row[1] = 0.5 * t;
            row[2] = 0.25 * t;
            row[3] = 20.0 + 15.0 * t - 4.9 * t * t;
            row[6] = 15.0 - 9.8 * t;
            row[7] = 1.0;
            matrix.push_row(&row);
        }
        FlightSolution::new(matrix).unwrap()
    }

    #[test]
    fn test_render_both_charts_releases_figures() {
        let registry = FigureRegistry::new();
        let s = solution(40);

        let time_series = render_time_series_png(&registry, &s).unwrap();
        let trajectory = render_trajectory_png(&registry, &s).unwrap();

        assert!(time_series.starts_with(PNG_SIGNATURE));
        assert!(trajectory.starts_with(PNG_SIGNATURE));
        assert_eq!(registry.open_figures(), 0);
    }

    #[test]
    fn test_render_report_png() {
        let registry = FigureRegistry::new();
        let png = render_report_png(&registry, &solution(40)).unwrap();
        assert!(png.starts_with(PNG_SIGNATURE));
        assert_eq!(registry.open_figures(), 0);
    }

    #[test]
    fn test_flat_two_row_solution_renders() {
        let mut matrix = SolutionMatrix::new(14);
        let mut row = [0.0; 14];
        row[3] = 20.0;
        matrix.push_row(&row);
        row[0] = 0.01;
        matrix.push_row(&row);

        let registry = FigureRegistry::new();
        let figures = render_inline(&registry, &FlightSolution::new(matrix).unwrap()).unwrap();
        assert!(!figures.time_series.is_empty());
        assert!(!figures.trajectory.is_empty());
        assert_eq!(registry.open_figures(), 0);
    }

    #[test]
    fn test_to_base64() {
        assert_eq!(to_base64(PNG_SIGNATURE), "iVBORw0KGgo=");
    }
}
