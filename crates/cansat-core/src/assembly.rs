//! Builds the engine's environment, motor and airframe from the eight run
//! parameters plus the fixed launch-site configuration.

use crate::inertia::InertiaEstimate;
use crate::params::SimulationParameters;
use cansat_sim::{EngineError, Environment, Flight, Grain, Rocket, SolidMotor, ThrustSource};
use chrono::{NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use nalgebra::Vector3;
use tracing::debug;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------
const SITE_LATITUDE: f64 = 31.8664; // deg
const SITE_LONGITUDE: f64 = -116.5959; // deg
const SITE_TIMEZONE: Tz = chrono_tz::America::Tijuana;
const SITE_ATMOSPHERE: &str = "standard_atmosphere";

const VEHICLE_RADIUS: f64 = 0.033; // m
const VEHICLE_HEIGHT: f64 = 0.115; // m
const VEHICLE_COM: f64 = 0.15; // m
const RAIL_BUTTON_OFFSET: f64 = 0.0575; // m, either side of the CoM

const MOTOR_MOUNT_POSITION: f64 = 0.3; // m

// ---------------------------------------------------------------------------
// Site
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchDate {
    /// Wall-clock time in the site timezone.
    Fixed(NaiveDateTime),
    /// The moment the vehicle is assembled.
    Now,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiteConfig {
    pub latitude: f64,  // deg
    pub longitude: f64, // deg
    pub timezone: Tz,
    pub atmospheric_model: String,
    pub launch_date: LaunchDate,
}

impl SiteConfig {
    /// Site used by interactive runs: a fixed launch on 2025-05-03 22:52 local.
    pub fn terminal() -> Self {
        let date = NaiveDate::from_ymd_opt(2025, 5, 3)
            .and_then(|day| day.and_hms_opt(22, 52, 0))
            .map_or(LaunchDate::Now, LaunchDate::Fixed);
        Self::with_launch_date(date)
    }

    /// Site used by the web server: launch at request time.
    pub fn server() -> Self {
        Self::with_launch_date(LaunchDate::Now)
    }

    pub fn with_launch_date(launch_date: LaunchDate) -> Self {
        Self {
            latitude: SITE_LATITUDE,
            longitude: SITE_LONGITUDE,
            timezone: SITE_TIMEZONE,
            atmospheric_model: SITE_ATMOSPHERE.to_string(),
            launch_date,
        }
    }

    /// Engine environment at `elevation` metres above sea level.
    pub fn environment(&self, elevation: f64) -> Result<Environment, EngineError> {
        let mut env = Environment::new(self.latitude, self.longitude, elevation);
        match self.launch_date {
            LaunchDate::Fixed(local) => env.set_date(local, self.timezone)?,
            LaunchDate::Now => env.set_date_now(self.timezone),
        }
        env.set_atmospheric_model(&self.atmospheric_model)?;
        Ok(env)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::terminal()
    }
}

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------
/// Constant-thrust hobby motor sized from the average thrust and burn time.
#[derive(Debug, Clone, PartialEq)]
pub struct MotorDescriptor {
    pub thrust_curve: Vec<(f64, f64)>, // (s, N)
    pub burn_time: f64,                // s
    pub dry_mass: f64,                 // kg
    pub dry_inertia: [f64; 3],         // kg*m^2
    pub center_of_dry_mass_position: f64,
    pub grains_center_of_mass_position: f64,
    pub grain: Grain,
    pub nozzle_radius: f64,
    pub throat_radius: f64,
    pub nozzle_position: f64,
    pub mount_position: f64, // m from the airframe origin
}

impl MotorDescriptor {
    pub fn constant_thrust(avg_thrust: f64, burn_time: f64) -> Self {
        Self {
            thrust_curve: vec![(0.0, avg_thrust), (burn_time, avg_thrust)],
            burn_time,
            dry_mass: 0.5,
            dry_inertia: [0.02, 0.02, 0.001],
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
            mount_position: MOTOR_MOUNT_POSITION,
        }
    }

    pub fn to_motor(&self) -> SolidMotor {
        SolidMotor {
            thrust_source: ThrustSource::Curve(self.thrust_curve.clone()),
            burn_time: self.burn_time,
            dry_mass: self.dry_mass,
            dry_inertia: Vector3::from(self.dry_inertia),
            center_of_dry_mass_position: self.center_of_dry_mass_position,
            grains_center_of_mass_position: self.grains_center_of_mass_position,
            grain: self.grain.clone(),
            nozzle_radius: self.nozzle_radius,
            throat_radius: self.throat_radius,
            nozzle_position: self.nozzle_position,
        }
    }
}

/// The CanSat airframe without its motor.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleDescriptor {
    pub radius: f64,   // m
    pub dry_mass: f64, // kg
    pub inertia: InertiaEstimate,
    pub center_of_mass_without_motor: f64, // m
    pub power_off_drag: f64,
    pub power_on_drag: f64,
    pub rail_buttons: [f64; 2], // m relative to the CoM
}

impl VehicleDescriptor {
    pub fn cansat(dry_mass: f64, drag_coeff: f64) -> Self {
        Self {
            radius: VEHICLE_RADIUS,
            dry_mass,
            inertia: InertiaEstimate::cylinder(dry_mass, VEHICLE_RADIUS, VEHICLE_HEIGHT),
            center_of_mass_without_motor: VEHICLE_COM,
            power_off_drag: drag_coeff,
            power_on_drag: drag_coeff,
            rail_buttons: [RAIL_BUTTON_OFFSET, -RAIL_BUTTON_OFFSET],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchDescriptor {
    pub rail_length: f64, // m
    pub inclination: f64, // deg from horizontal
    pub heading: f64,     // deg from north
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------
/// Everything the engine needs for one flight.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub environment: Environment,
    pub motor: MotorDescriptor,
    pub vehicle: VehicleDescriptor,
    pub launch: LaunchDescriptor,
}

impl Assembly {
    /// Airframe with the motor installed.
    pub fn rocket(&self) -> Rocket {
        let v = &self.vehicle;
        let mut rocket = Rocket::new(
            v.radius,
            v.dry_mass,
            v.inertia.as_vector(),
            v.center_of_mass_without_motor,
            v.power_off_drag,
            v.power_on_drag,
        );
        rocket.add_motor(self.motor.to_motor(), self.motor.mount_position);
        rocket.set_rail_buttons(v.rail_buttons[0], v.rail_buttons[1]);
        rocket
    }

    /// An unsolved flight; integration starts on first access.
    pub fn flight(&self) -> Flight {
        Flight::new(
            self.rocket(),
            self.environment.clone(),
            self.launch.rail_length,
            self.launch.inclination,
            self.launch.heading,
        )
    }
}

/// Assemble a flight from run parameters. Only the site can fail here;
/// parameter values are checked by the engine when it integrates.
pub fn assemble(params: &SimulationParameters, site: &SiteConfig) -> Result<Assembly, EngineError> {
    let environment = site.environment(params.elevation)?;
    debug!(
        date = ?environment.date(),
        model = %environment.atmospheric_model(),
        elevation = params.elevation,
        "environment ready"
    );

    Ok(Assembly {
        environment,
        motor: MotorDescriptor::constant_thrust(params.avg_thrust, params.burn_time),
        vehicle: VehicleDescriptor::cansat(params.dry_mass, params.drag_coeff),
        launch: LaunchDescriptor {
            rail_length: params.rail_length,
            inclination: params.inclination,
            heading: params.heading,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_default_scenario_descriptors() {
        let assembly = assemble(&SimulationParameters::default(), &SiteConfig::terminal()).unwrap();

        assert_eq!(assembly.motor.burn_time, 2.0);
        assert_eq!(assembly.vehicle.dry_mass, 0.3);
        assert_eq!(assembly.motor.thrust_curve, vec![(0.0, 10.0), (2.0, 10.0)]);
        assert_eq!(assembly.vehicle.power_on_drag, 0.6);
        assert_eq!(assembly.vehicle.power_off_drag, 0.6);
        assert_eq!(assembly.vehicle.rail_buttons, [0.0575, -0.0575]);
        assert_eq!(
            assembly.launch,
            LaunchDescriptor {
                rail_length: 1.2,
                inclination: 90.0,
                heading: 0.0
            }
        );

        let rocket = assembly.rocket();
        assert_eq!(rocket.mass, 0.3);
        assert_eq!(rocket.motor().unwrap().motor.burn_time, 2.0);
        assert_eq!(rocket.motor().unwrap().position, 0.3);
        assert!(rocket.validate().is_ok());
    }

    #[test]
    fn test_terminal_site_uses_fixed_date() {
        let site = SiteConfig::terminal();
        assert!(matches!(site.launch_date, LaunchDate::Fixed(_)));

        let env = site.environment(20.0).unwrap();
        let utc = env.date().unwrap().with_timezone(&Utc);
        assert_eq!(utc.to_rfc3339(), "2025-05-04T05:52:00+00:00");
        assert_eq!(env.elevation, 20.0);
        assert_eq!(env.atmospheric_model().name(), "standard_atmosphere");
    }

    #[test]
    fn test_server_site_uses_now() {
        let before = Utc::now();
        let env = SiteConfig::server().environment(20.0).unwrap();
        let date = env.date().unwrap().with_timezone(&Utc);
        assert!(date >= before);
    }

    #[test]
    fn test_unknown_atmosphere_fails_assembly() {
        let site = SiteConfig {
            atmospheric_model: "forecast".into(),
            ..SiteConfig::terminal()
        };
        let err = assemble(&SimulationParameters::default(), &site).unwrap_err();
        assert_eq!(err, EngineError::UnknownAtmosphere("forecast".into()));
    }

    #[test]
    fn test_nonsense_values_pass_through() {
        let params = SimulationParameters {
            dry_mass: -2.0,
            burn_time: 0.0,
            ..SimulationParameters::default()
        };
        let assembly = assemble(&params, &SiteConfig::terminal()).unwrap();
        assert_eq!(assembly.vehicle.dry_mass, -2.0);
        assert_eq!(assembly.motor.burn_time, 0.0);
    }
}
