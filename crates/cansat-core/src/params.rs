//! Parameter definitions and compiled-in defaults.

use serde::{Deserialize, Serialize};

/// One operator-facing scalar input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    /// Stable identifier, used in logs and exports.
    pub key: &'static str,
    /// Prompt text.
    pub label: &'static str,
    pub unit: &'static str,
    pub default: f64,
}

impl ParamSpec {
    pub const fn new(key: &'static str, label: &'static str, unit: &'static str, default: f64) -> Self {
        Self {
            key,
            label,
            unit,
            default,
        }
    }

    /// Label with its unit, e.g. `Rail length (m)`.
    pub fn display_label(&self) -> String {
        if self.unit.is_empty() {
            self.label.to_string()
        } else {
            format!("{} ({})", self.label, self.unit)
        }
    }
}

pub const INCLINATION: ParamSpec = ParamSpec::new("inclination", "Rail inclination", "deg", 90.0);
pub const HEADING: ParamSpec = ParamSpec::new("heading", "Rail heading", "deg", 0.0);
pub const RAIL_LENGTH: ParamSpec = ParamSpec::new("rail_length", "Rail length", "m", 1.2);
pub const DRY_MASS: ParamSpec = ParamSpec::new("dry_mass", "Dry mass", "kg", 0.3);
pub const DRAG_COEFF: ParamSpec = ParamSpec::new("drag_coeff", "Drag coefficient", "", 0.6);
pub const BURN_TIME: ParamSpec = ParamSpec::new("burn_time", "Burn time", "s", 2.0);
pub const AVG_THRUST: ParamSpec = ParamSpec::new("avg_thrust", "Average thrust", "N", 10.0);
pub const ELEVATION: ParamSpec = ParamSpec::new("elevation", "Launch site elevation", "m", 20.0);

/// Prompt order for interactive intake.
pub const PARAMETERS: [ParamSpec; 8] = [
    INCLINATION,
    HEADING,
    RAIL_LENGTH,
    DRY_MASS,
    DRAG_COEFF,
    BURN_TIME,
    AVG_THRUST,
    ELEVATION,
];

/// The eight scalar inputs of a run. No range checks are applied here;
/// nonsensical values are left for the engine to reject.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub inclination: f64, // deg from horizontal
    pub heading: f64,     // deg, compass bearing
    pub rail_length: f64, // m
    pub dry_mass: f64,    // kg
    pub drag_coeff: f64,
    pub burn_time: f64,  // s
    pub avg_thrust: f64, // N
    pub elevation: f64,  // m above sea level
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            inclination: INCLINATION.default,
            heading: HEADING.default,
            rail_length: RAIL_LENGTH.default,
            dry_mass: DRY_MASS.default,
            drag_coeff: DRAG_COEFF.default,
            burn_time: BURN_TIME.default,
            avg_thrust: AVG_THRUST.default,
            elevation: ELEVATION.default,
        }
    }
}

impl SimulationParameters {
    /// Build from values given in [`PARAMETERS`] order.
    pub fn from_values(values: [f64; 8]) -> Self {
        let [inclination, heading, rail_length, dry_mass, drag_coeff, burn_time, avg_thrust, elevation] =
            values;
        Self {
            inclination,
            heading,
            rail_length,
            dry_mass,
            drag_coeff,
            burn_time,
            avg_thrust,
            elevation,
        }
    }

    /// (spec, value) pairs in [`PARAMETERS`] order.
    pub fn entries(&self) -> [(ParamSpec, f64); 8] {
        [
            (INCLINATION, self.inclination),
            (HEADING, self.heading),
            (RAIL_LENGTH, self.rail_length),
            (DRY_MASS, self.dry_mass),
            (DRAG_COEFF, self.drag_coeff),
            (BURN_TIME, self.burn_time),
            (AVG_THRUST, self.avg_thrust),
            (ELEVATION, self.elevation),
        ]
    }
}
