//! CanSat Flight Engine
//!
//! Integrates the flight of a small rail-launched vehicle with a solid motor.
//! Callers describe the launch site ([`Environment`]), the motor
//! ([`SolidMotor`]) and the airframe ([`Rocket`]), hand them to a [`Flight`],
//! and read back the apogee and a row-major [`SolutionMatrix`].
//!
//! The solver is lazy: nothing is integrated until the first call to
//! [`Flight::apogee`], [`Flight::summary`] or [`Flight::solution`].

pub mod environment;
pub mod error;
pub mod flight;
pub mod motor;
pub mod rocket;
pub mod solution;

// Re-export main types
pub use environment::{AtmosphereSample, AtmosphericModel, Environment};
pub use error::EngineError;
pub use flight::{Flight, FlightSummary, DEFAULT_MAX_TIME};
pub use motor::{Grain, SolidMotor, ThrustSource};
pub use rocket::{MotorMount, Rocket};
pub use solution::{SolutionMatrix, SOLUTION_COLUMNS};
