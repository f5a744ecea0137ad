//! Interactive display of a finished terminal run.
//!
//! With the `viz` feature (on by default) the charts open in native windows:
//! altitude and vertical velocity in the main window, the 3D trajectory in a
//! second one that can be rotated. Both block until the operator closes them.

use anyhow::Result;
use cansat_core::SimulationReport;
use std::path::Path;

/// Shows the charts of a finished run.
pub trait Viewer {
    fn show(&self, report: &SimulationReport, png: &Path) -> Result<()>;
}

/// Native plot windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowViewer;

#[cfg(feature = "viz")]
impl Viewer for WindowViewer {
    fn show(&self, report: &SimulationReport, _png: &Path) -> Result<()> {
        window::run(report)
    }
}

#[cfg(not(feature = "viz"))]
impl Viewer for WindowViewer {
    fn show(&self, _report: &SimulationReport, png: &Path) -> Result<()> {
        tracing::warn!(path = %png.display(), "built without plot windows, open the PNG instead");
        Ok(())
    }
}

#[cfg(feature = "viz")]
mod window {
    use cansat_core::SimulationReport;
    use cansat_plot::{Trace, Trace3d};
    use eframe::egui;
    use egui_plot::{Legend, Line, Plot, PlotPoints};

    const TITLE: &str = "CanSat Flight Simulation";

    pub(super) fn run(report: &SimulationReport) -> anyhow::Result<()> {
        let app = FlightWindows::new(report);
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_title(TITLE)
                .with_inner_size([1000.0, 800.0]),
            ..Default::default()
        };
        eframe::run_native(TITLE, options, Box::new(|_| Ok(Box::new(app))))
            .map_err(|e| anyhow::anyhow!("plot window failed: {e}"))
    }

    struct FlightWindows {
        apogee: f64,
        altitude: Vec<[f64; 2]>,
        vertical_velocity: Vec<[f64; 2]>,
        trajectory: Vec<[f64; 3]>,
        yaw: f64,   // deg
        pitch: f64, // deg
        trajectory_open: bool,
    }

    impl FlightWindows {
        fn new(report: &SimulationReport) -> Self {
            let pairs = |trace: Trace| trace.points.into_iter().map(|(x, y)| [x, y]).collect();
            Self {
                apogee: report.apogee,
                altitude: pairs(Trace::altitude(&report.solution)),
                vertical_velocity: pairs(Trace::vertical_velocity(&report.solution)),
                trajectory: Trace3d::trajectory(&report.solution)
                    .points
                    .into_iter()
                    .map(|(e, n, u)| [e, n, u])
                    .collect(),
                yaw: 35.0,
                pitch: 20.0,
                trajectory_open: true,
            }
        }

        fn trajectory_ui(&mut self, ctx: &egui::Context) {
            egui::TopBottomPanel::top("view").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.add(egui::Slider::new(&mut self.yaw, -180.0..=180.0).text("Yaw (deg)"));
                    ui.add(egui::Slider::new(&mut self.pitch, -90.0..=90.0).text("Pitch (deg)"));
                });
            });

            let (yaw, pitch) = (self.yaw, self.pitch);
            let pad = self.trajectory.first().copied().unwrap_or_default();
            let reach = axis_length(&self.trajectory);
            let axes = [("East", [reach, 0.0, 0.0]), ("North", [0.0, reach, 0.0]), ("Up", [0.0, 0.0, reach])];

            egui::CentralPanel::default().show(ctx, |ui| {
                Plot::new("trajectory")
                    .data_aspect(1.0)
                    .legend(Legend::default())
                    .show(ui, |plot_ui| {
                        for (name, tip) in axes {
                            let end = [pad[0] + tip[0], pad[1] + tip[1], pad[2] + tip[2]];
                            let points: PlotPoints = vec![project(pad, yaw, pitch), project(end, yaw, pitch)].into();
                            plot_ui.line(Line::new(name, points).color(egui::Color32::GRAY));
                        }
                        let points: PlotPoints = self.trajectory.iter().map(|&p| project(p, yaw, pitch)).collect();
                        plot_ui.line(Line::new("Trajectory", points).color(egui::Color32::DARK_GREEN).width(2.0));
                    });
            });
        }
    }

    impl eframe::App for FlightWindows {
        fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
            egui::TopBottomPanel::top("header").show(ctx, |ui| {
                ui.heading(format!("Apogee: {:.2} m", self.apogee));
            });

            egui::CentralPanel::default().show(ctx, |ui| {
                let half_h = ui.available_height() / 2.0 - 8.0;

                let points: PlotPoints = self.altitude.iter().copied().collect();
                Plot::new("altitude")
                    .height(half_h)
                    .x_axis_label("Time (s)")
                    .y_axis_label("Altitude (m)")
                    .legend(Legend::default())
                    .show(ui, |plot_ui| {
                        plot_ui.line(Line::new("Altitude", points).color(egui::Color32::BLUE).width(2.0));
                    });

                let points: PlotPoints = self.vertical_velocity.iter().copied().collect();
                Plot::new("vertical_velocity")
                    .height(half_h)
                    .x_axis_label("Time (s)")
                    .y_axis_label("Vertical Velocity (m/s)")
                    .legend(Legend::default())
                    .show(ui, |plot_ui| {
                        plot_ui.line(Line::new("Vertical Velocity", points).color(egui::Color32::RED).width(2.0));
                    });
            });

            if self.trajectory_open {
                ctx.show_viewport_immediate(
                    egui::ViewportId::from_hash_of("trajectory"),
                    egui::ViewportBuilder::default()
                        .with_title("3D Trajectory")
                        .with_inner_size([900.0, 800.0]),
                    |ctx, _class| {
                        self.trajectory_ui(ctx);
                        if ctx.input(|i| i.viewport().close_requested()) {
                            self.trajectory_open = false;
                        }
                    },
                );
            }
        }
    }

    /// Project an (east, north, up) point onto the screen: rotate by `yaw`
    /// about the vertical, then tilt the horizontal plane by `pitch`.
    pub(super) fn project(point: [f64; 3], yaw: f64, pitch: f64) -> [f64; 2] {
        let (sy, cy) = yaw.to_radians().sin_cos();
        let (sp, cp) = pitch.to_radians().sin_cos();
        let [east, north, up] = point;
        let across = east * cy - north * sy;
        let depth = east * sy + north * cy;
        [across, up * cp + depth * sp]
    }

    /// Length of the reference axes: the largest excursion from the pad, at least 1 m.
    pub(super) fn axis_length(points: &[[f64; 3]]) -> f64 {
        let Some(pad) = points.first() else {
            return 1.0;
        };
        points
            .iter()
            .flat_map(|p| (0..3).map(move |i| (p[i] - pad[i]).abs()))
            .fold(1.0, f64::max)
    }
}

#[cfg(all(test, feature = "viz"))]
mod tests {
    use super::window::{axis_length, project};
    use approx::assert_relative_eq;

    #[test]
    fn test_front_view_keeps_altitude() {
        let [x, y] = project([3.0, 7.0, 100.0], 0.0, 0.0);
        assert_relative_eq!(x, 3.0);
        assert_relative_eq!(y, 100.0);
    }

    #[test]
    fn test_yaw_turns_north_into_screen_x() {
        let [x, y] = project([0.0, 5.0, 10.0], -90.0, 0.0);
        assert_relative_eq!(x, 5.0, epsilon = 1e-12);
        assert_relative_eq!(y, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_top_down_view_shows_depth() {
        let [_, y] = project([0.0, 4.0, 50.0], 0.0, 90.0);
        assert_relative_eq!(y, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_axis_length() {
        assert_eq!(axis_length(&[]), 1.0);
        assert_eq!(axis_length(&[[0.0, 0.0, 20.0], [0.1, 0.0, 20.3]]), 1.0);
        assert_eq!(axis_length(&[[0.0, 0.0, 20.0], [-4.0, 2.0, 80.0]]), 60.0);
    }
}
