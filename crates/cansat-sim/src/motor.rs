//! Solid rocket motor: thrust source, grain geometry and propellant use.

use crate::error::{check, EngineError};
use nalgebra::Vector3;
use std::f64::consts::PI;

const IMPULSE_SAMPLES: usize = 2000;

#[derive(Debug, Clone, PartialEq)]
pub enum ThrustSource {
    /// Fixed thrust (N) for the whole burn.
    Constant(f64),
    /// (time s, thrust N) points, linearly interpolated.
    Curve(Vec<(f64, f64)>),
}

impl ThrustSource {
    fn validate(&self) -> Result<(), EngineError> {
        match self {
            Self::Constant(force) => check("thrust", *force, *force >= 0.0),
            Self::Curve(points) => {
                if points.is_empty() {
                    return Err(EngineError::InvalidParameter {
                        name: "thrust curve length",
                        value: 0.0,
                    });
                }
                for pair in points.windows(2) {
                    check("thrust curve time", pair[1].0, pair[1].0 >= pair[0].0)?;
                }
                for &(t, force) in points {
                    check("thrust curve time", t, true)?;
                    check("thrust", force, force >= 0.0)?;
                }
                Ok(())
            }
        }
    }
}

// Helper: Linear interpolation for thrust curve
fn interpolate_thrust(curve: &[(f64, f64)], t: f64) -> f64 {
    let (Some(first), Some(last)) = (curve.first(), curve.last()) else {
        return 0.0;
    };
    if t < first.0 || t > last.0 {
        return 0.0;
    }
    for pair in curve.windows(2) {
        let ((t0, f0), (t1, f1)) = (pair[0], pair[1]);
        if t >= t0 && t <= t1 {
            let dt = t1 - t0;
            if dt <= 0.0 {
                return f0;
            }
            return f0 + (t - t0) / dt * (f1 - f0);
        }
    }
    first.1
}

/// Propellant grain geometry. All grains are identical hollow cylinders.
#[derive(Debug, Clone, PartialEq)]
pub struct Grain {
    pub number: u32,
    pub separation: f64,           // m
    pub density: f64,              // kg/m³
    pub outer_radius: f64,         // m
    pub initial_inner_radius: f64, // m
    pub initial_height: f64,       // m
}

impl Grain {
    pub fn volume(&self) -> f64 {
        PI * (self.outer_radius.powi(2) - self.initial_inner_radius.powi(2)) * self.initial_height
    }

    /// Initial propellant mass of all grains.
    pub fn propellant_mass(&self) -> f64 {
        f64::from(self.number) * self.density * self.volume()
    }

    fn validate(&self) -> Result<(), EngineError> {
        check("grain number", f64::from(self.number), self.number > 0)?;
        check("grain separation", self.separation, self.separation >= 0.0)?;
        check("grain density", self.density, self.density > 0.0)?;
        check(
            "grain inner radius",
            self.initial_inner_radius,
            self.initial_inner_radius >= 0.0,
        )?;
        check(
            "grain outer radius",
            self.outer_radius,
            self.outer_radius > self.initial_inner_radius,
        )?;
        check("grain height", self.initial_height, self.initial_height > 0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolidMotor {
    pub thrust_source: ThrustSource,
    pub burn_time: f64,                     // s
    pub dry_mass: f64,                      // kg
    pub dry_inertia: Vector3<f64>,          // [Ix, Iy, Iz] about dry CoM (kg*m^2)
    pub center_of_dry_mass_position: f64,   // m from nozzle
    pub grains_center_of_mass_position: f64, // m from nozzle
    pub grain: Grain,
    pub nozzle_radius: f64, // m
    pub throat_radius: f64, // m
    pub nozzle_position: f64,
}

impl SolidMotor {
    pub fn validate(&self) -> Result<(), EngineError> {
        self.thrust_source.validate()?;
        check("burn time", self.burn_time, self.burn_time > 0.0)?;
        check("motor dry mass", self.dry_mass, self.dry_mass >= 0.0)?;
        for value in self.dry_inertia.iter() {
            check("motor dry inertia", *value, *value >= 0.0)?;
        }
        self.grain.validate()?;
        check("nozzle radius", self.nozzle_radius, self.nozzle_radius > 0.0)?;
        check(
            "throat radius",
            self.throat_radius,
            self.throat_radius > 0.0 && self.throat_radius <= self.nozzle_radius,
        )
    }

    /// Thrust (N) at time `t` after ignition; zero outside the burn.
    pub fn thrust(&self, t: f64) -> f64 {
        if t < 0.0 || t > self.burn_time {
            return 0.0;
        }
        match &self.thrust_source {
            ThrustSource::Constant(force) => *force,
            ThrustSource::Curve(points) => interpolate_thrust(points, t),
        }
    }

    pub fn is_burning(&self, t: f64) -> bool {
        t >= 0.0 && t <= self.burn_time
    }

    /// Total impulse (N*s), trapezoidal over the burn.
    pub fn total_impulse(&self) -> f64 {
        if let ThrustSource::Constant(force) = self.thrust_source {
            return force * self.burn_time;
        }
        let dt = self.burn_time / IMPULSE_SAMPLES as f64;
        (0..IMPULSE_SAMPLES)
            .map(|i| {
                let t0 = i as f64 * dt;
                let t1 = ((i + 1) as f64 * dt).min(self.burn_time);
                0.5 * (self.thrust(t0) + self.thrust(t1)) * (t1 - t0)
            })
            .sum()
    }

    pub fn average_thrust(&self) -> f64 {
        self.total_impulse() / self.burn_time
    }

    pub fn propellant_initial_mass(&self) -> f64 {
        self.grain.propellant_mass()
    }

    /// Effective exhaust velocity (m/s), or `None` for a motor that delivers no impulse.
    pub fn exhaust_velocity(&self) -> Option<f64> {
        let impulse = self.total_impulse();
        let propellant = self.propellant_initial_mass();
        (impulse > 0.0 && propellant > 0.0).then(|| impulse / propellant)
    }

    /// Nozzle expansion ratio (exit area over throat area).
    pub fn expansion_ratio(&self) -> f64 {
        (self.nozzle_radius / self.throat_radius).powi(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn motor(source: ThrustSource) -> SolidMotor {
        SolidMotor {
            thrust_source: source,
            burn_time: 2.0,
            dry_mass: 0.5,
            dry_inertia: Vector3::new(0.02, 0.02, 0.001),
            center_of_dry_mass_position: 0.15,
            grains_center_of_mass_position: 0.2,
            grain: Grain {
                number: 1,
                separation: 0.005,
                density: 1700.0,
                outer_radius: 0.02,
                initial_inner_radius: 0.005,
                initial_height: 0.08,
            },
            nozzle_radius: 0.01,
            throat_radius: 0.005,
            nozzle_position: 0.0,
        }
    }

    #[test]
    fn test_constant_and_curve_agree() {
        let constant = motor(ThrustSource::Constant(10.0));
        let curve = motor(ThrustSource::Curve(vec![(0.0, 10.0), (2.0, 10.0)]));

        for t in [0.0, 0.5, 1.0, 1.999, 2.0] {
            assert_relative_eq!(constant.thrust(t), curve.thrust(t));
        }
        assert_relative_eq!(constant.total_impulse(), 20.0);
        assert_relative_eq!(curve.total_impulse(), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_thrust_zero_outside_burn() {
        let m = motor(ThrustSource::Constant(10.0));
        assert_eq!(m.thrust(-0.1), 0.0);
        assert_eq!(m.thrust(2.01), 0.0);
        assert!(!m.is_burning(2.5));
    }

    #[test]
    fn test_curve_interpolation() {
        let m = motor(ThrustSource::Curve(vec![(0.0, 0.0), (1.0, 20.0), (2.0, 0.0)]));
        assert_relative_eq!(m.thrust(0.5), 10.0);
        assert_relative_eq!(m.thrust(1.5), 10.0);
        assert_relative_eq!(m.total_impulse(), 20.0, epsilon = 1e-6);
    }

    #[test]
    fn test_propellant_mass() {
        let m = motor(ThrustSource::Constant(10.0));
        let expected = 1700.0 * PI * (0.02_f64.powi(2) - 0.005_f64.powi(2)) * 0.08;
        assert_relative_eq!(m.propellant_initial_mass(), expected);
        assert_relative_eq!(m.exhaust_velocity().unwrap(), 20.0 / expected);
        assert_relative_eq!(m.expansion_ratio(), 4.0);
    }

    #[test]
    fn test_validation() {
        assert!(motor(ThrustSource::Constant(10.0)).validate().is_ok());

        let mut zero_burn = motor(ThrustSource::Constant(10.0));
        zero_burn.burn_time = 0.0;
        assert_eq!(
            zero_burn.validate(),
            Err(EngineError::InvalidParameter {
                name: "burn time",
                value: 0.0
            })
        );

        let backwards = motor(ThrustSource::Curve(vec![(1.0, 5.0), (0.5, 5.0)]));
        assert!(backwards.validate().is_err());

        let mut hollow = motor(ThrustSource::Constant(10.0));
        hollow.grain.initial_inner_radius = 0.03;
        assert!(hollow.validate().is_err());
    }
}
