use crate::error::{check, EngineError};
use crate::motor::SolidMotor;
use nalgebra::{Matrix3, Vector3};
use std::f64::consts::PI;

/// A motor and its axial position in the airframe.
#[derive(Debug, Clone, PartialEq)]
pub struct MotorMount {
    pub motor: SolidMotor,
    pub position: f64, // m from the airframe origin
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rocket {
    pub radius: f64,                       // m
    pub mass: f64,                         // kg, without motor
    pub inertia: Vector3<f64>,             // [Ix, Iy, Iz] without motor (kg*m^2)
    pub center_of_mass_without_motor: f64, // m from the airframe origin
    pub power_off_drag: f64,
    pub power_on_drag: f64,
    motor: Option<MotorMount>,
    rail_buttons: Option<[f64; 2]>,
}

impl Rocket {
    pub fn new(
        radius: f64,
        mass: f64,
        inertia: Vector3<f64>,
        center_of_mass_without_motor: f64,
        power_off_drag: f64,
        power_on_drag: f64,
    ) -> Self {
        Self {
            radius,
            mass,
            inertia,
            center_of_mass_without_motor,
            power_off_drag,
            power_on_drag,
            motor: None,
            rail_buttons: None,
        }
    }

    pub fn add_motor(&mut self, motor: SolidMotor, position: f64) {
        self.motor = Some(MotorMount { motor, position });
    }

    /// Rail button positions relative to the centre of mass (upper, lower).
    pub fn set_rail_buttons(&mut self, upper: f64, lower: f64) {
        self.rail_buttons = Some([upper, lower]);
    }

    pub fn motor(&self) -> Option<&MotorMount> {
        self.motor.as_ref()
    }

    pub fn rail_buttons(&self) -> Option<[f64; 2]> {
        self.rail_buttons
    }

    pub fn reference_area(&self) -> f64 {
        PI * self.radius.powi(2)
    }

    /// Drag coefficient, switching to the power-off value at burn-out.
    pub fn drag_coefficient(&self, t: f64) -> f64 {
        match &self.motor {
            Some(mount) if mount.motor.is_burning(t) => self.power_on_drag,
            _ => self.power_off_drag,
        }
    }

    /// Diagonal inertia of airframe plus motor dry structure.
    pub fn inertia_tensor(&self) -> Matrix3<f64> {
        let motor = self
            .motor
            .as_ref()
            .map_or_else(Vector3::zeros, |m| m.motor.dry_inertia);
        Matrix3::from_diagonal(&(self.inertia + motor))
    }

    /// Mass at ignition: airframe, motor structure and propellant.
    pub fn lift_off_mass(&self) -> f64 {
        self.mass
            + self.motor.as_ref().map_or(0.0, |m| {
                m.motor.dry_mass + m.motor.propellant_initial_mass()
            })
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        check("radius", self.radius, self.radius > 0.0)?;
        check("mass", self.mass, self.mass > 0.0)?;
        for value in self.inertia.iter() {
            check("inertia", *value, *value >= 0.0)?;
        }
        check("power-off drag", self.power_off_drag, self.power_off_drag >= 0.0)?;
        check("power-on drag", self.power_on_drag, self.power_on_drag >= 0.0)?;

        let mount = self.motor.as_ref().ok_or(EngineError::MissingMotor)?;
        check("motor position", mount.position, true)?;
        mount.motor.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motor::{Grain, ThrustSource};
    use approx::assert_relative_eq;

    fn small_motor() -> SolidMotor {
        SolidMotor {
            thrust_source: ThrustSource::Constant(10.0),
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
    fn test_motorless_rocket_is_rejected() {
        let rocket = Rocket::new(0.033, 0.3, Vector3::new(1e-4, 1e-4, 2e-4), 0.15, 0.6, 0.6);
        assert_eq!(rocket.validate(), Err(EngineError::MissingMotor));
    }

    #[test]
    fn test_negative_mass_is_rejected() {
        let mut rocket = Rocket::new(0.033, -0.3, Vector3::new(1e-4, 1e-4, 2e-4), 0.15, 0.6, 0.6);
        rocket.add_motor(small_motor(), 0.3);
        assert_eq!(
            rocket.validate(),
            Err(EngineError::InvalidParameter {
                name: "mass",
                value: -0.3
            })
        );
    }

    #[test]
    fn test_drag_switches_at_burnout() {
        let mut rocket = Rocket::new(0.033, 0.3, Vector3::new(1e-4, 1e-4, 2e-4), 0.15, 0.4, 0.7);
        rocket.add_motor(small_motor(), 0.3);
        assert_eq!(rocket.drag_coefficient(1.0), 0.7);
        assert_eq!(rocket.drag_coefficient(3.0), 0.4);
    }

    #[test]
    fn test_mass_and_inertia_include_motor() {
        let mut rocket = Rocket::new(0.033, 0.3, Vector3::new(1e-4, 1e-4, 2e-4), 0.15, 0.6, 0.6);
        let motor = small_motor();
        let propellant = motor.propellant_initial_mass();
        rocket.add_motor(motor, 0.3);
        rocket.set_rail_buttons(0.0575, -0.0575);

        assert_relative_eq!(rocket.lift_off_mass(), 0.8 + propellant, epsilon = 1e-12);
        let inertia = rocket.inertia_tensor();
        assert_relative_eq!(inertia[(0, 0)], 0.0201, epsilon = 1e-12);
        assert_relative_eq!(inertia[(2, 2)], 0.0012, epsilon = 1e-12);
        assert_eq!(inertia[(0, 1)], 0.0);
        assert_eq!(rocket.rail_buttons(), Some([0.0575, -0.0575]));
        assert!(rocket.validate().is_ok());
    }
}
