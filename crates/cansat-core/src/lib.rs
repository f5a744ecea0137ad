//! # CanSat Core
//!
//! Everything between the operator and the flight engine:
//! - Parameter intake with compiled-in defaults
//! - Vehicle/environment assembly, including the cylinder inertia estimate
//! - Simulation invocation behind the [`FlightEngine`] seam
//! - A named-column view ([`FlightSolution`]) over the engine's raw output

pub mod assembly;
pub mod engine;
pub mod error;
pub mod inertia;
pub mod intake;
pub mod params;
pub mod solution;

// Re-export core types
pub use assembly::{assemble, Assembly, LaunchDate, LaunchDescriptor, MotorDescriptor, SiteConfig, VehicleDescriptor};
pub use engine::{run_simulation, EngineOutput, FlightEngine, SimulationReport, SixDofEngine};
pub use error::{IntakeError, PipelineError, SolutionError};
pub use inertia::InertiaEstimate;
pub use intake::{collect_parameters, parse_input, prompt_f64};
pub use params::{ParamSpec, SimulationParameters, PARAMETERS};
pub use solution::{Column, FlightSolution, REQUIRED_COLUMNS};

/// The engine crate, for callers that need its types directly.
pub use cansat_sim as sim;
