//! Launch site, atmosphere and gravity.

use crate::error::EngineError;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------
const G0: f64 = 9.80665; // Standard gravity (m/s²)
const R_AIR: f64 = 287.052_87; // Specific gas constant for dry air (J/(kg*K))
const R_EARTH: f64 = 6_371_000.0; // Mean Earth radius (m)
const R_GEOPOTENTIAL: f64 = 6_356_766.0; // Effective radius for geopotential altitude (m)

const RHO_SEA_LEVEL: f64 = 1.225; // kg/m³
const T_SEA_LEVEL: f64 = 288.15; // K
const H_SCALE: f64 = 7400.0; // m

/// ISA layers: (base geopotential altitude m, base temperature K, lapse K/m, base pressure Pa)
const ISA_LAYERS: [(f64, f64, f64, f64); 4] = [
    (0.0, 288.15, -0.0065, 101_325.0),
    (11_000.0, 216.65, 0.0, 22_632.06),
    (20_000.0, 216.65, 0.001, 5_474.889),
    (32_000.0, 228.65, 0.0028, 868.0187),
];
const ISA_CEILING: f64 = 47_000.0;

// ---------------------------------------------------------------------------
// Atmospheric models
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AtmosphericModel {
    /// Layered International Standard Atmosphere.
    #[default]
    StandardAtmosphere,
    /// Isothermal exponential density decay.
    Exponential,
}

impl AtmosphericModel {
    pub fn name(self) -> &'static str {
        match self {
            Self::StandardAtmosphere => "standard_atmosphere",
            Self::Exponential => "exponential",
        }
    }

    /// Air state at a height above sea level.
    pub fn sample(self, height_asl: f64) -> AtmosphereSample {
        match self {
            Self::StandardAtmosphere => isa(height_asl),
            Self::Exponential => {
                let density = RHO_SEA_LEVEL * (-height_asl / H_SCALE).exp();
                AtmosphereSample {
                    temperature: T_SEA_LEVEL,
                    pressure: density * R_AIR * T_SEA_LEVEL,
                    density,
                }
            }
        }
    }
}

impl FromStr for AtmosphericModel {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard_atmosphere" => Ok(Self::StandardAtmosphere),
            "exponential" => Ok(Self::Exponential),
            other => Err(EngineError::UnknownAtmosphere(other.to_string())),
        }
    }
}

impl fmt::Display for AtmosphericModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtmosphereSample {
    pub temperature: f64, // K
    pub pressure: f64,    // Pa
    pub density: f64,     // kg/m³
}

fn isa(height_asl: f64) -> AtmosphereSample {
    let h = (R_GEOPOTENTIAL * height_asl / (R_GEOPOTENTIAL + height_asl)).min(ISA_CEILING);

    let (base_h, base_t, lapse, base_p) = ISA_LAYERS
        .iter()
        .rev()
        .find(|layer| h >= layer.0)
        .copied()
        .unwrap_or(ISA_LAYERS[0]); // below sea level: extend the troposphere

    let dh = h - base_h;
    let (temperature, pressure) = if lapse == 0.0 {
        (base_t, base_p * (-G0 * dh / (R_AIR * base_t)).exp())
    } else {
        let t = base_t + lapse * dh;
        (t, base_p * (t / base_t).powf(-G0 / (lapse * R_AIR)))
    };

    AtmosphereSample {
        temperature,
        pressure,
        density: pressure / (R_AIR * temperature),
    }
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    pub latitude: f64,  // deg
    pub longitude: f64, // deg
    pub elevation: f64, // m above sea level
    date: Option<DateTime<Tz>>,
    model: AtmosphericModel,
}

impl Environment {
    pub fn new(latitude: f64, longitude: f64, elevation: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation,
            date: None,
            model: AtmosphericModel::default(),
        }
    }

    /// Set the launch date from a wall-clock time in `timezone`.
    ///
    /// Fails for local times skipped or repeated by a daylight-saving change.
    pub fn set_date(&mut self, local: NaiveDateTime, timezone: Tz) -> Result<(), EngineError> {
        let date = timezone
            .from_local_datetime(&local)
            .single()
            .ok_or_else(|| EngineError::InvalidLaunchTime(format!("{local} {timezone}")))?;
        self.date = Some(date);
        Ok(())
    }

    /// Set the launch date to the current instant in `timezone`.
    pub fn set_date_now(&mut self, timezone: Tz) {
        self.date = Some(Utc::now().with_timezone(&timezone));
    }

    pub fn date(&self) -> Option<&DateTime<Tz>> {
        self.date.as_ref()
    }

    pub fn set_atmospheric_model(&mut self, name: &str) -> Result<(), EngineError> {
        self.model = name.parse()?;
        Ok(())
    }

    pub fn atmospheric_model(&self) -> AtmosphericModel {
        self.model
    }

    pub fn atmosphere(&self, height_asl: f64) -> AtmosphereSample {
        self.model.sample(height_asl)
    }

    /// Normal gravity at the site latitude (Somigliana), scaled with height.
    pub fn gravity(&self, height_asl: f64) -> f64 {
        let sin2 = self.latitude.to_radians().sin().powi(2);
        let surface = 9.780_325_335_9 * (1.0 + 0.001_931_852_652_41 * sin2)
            / (1.0 - 0.006_694_379_990_13 * sin2).sqrt();
        surface * (R_EARTH / (R_EARTH + height_asl)).powi(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    #[test]
    fn test_isa_sea_level() {
        let air = AtmosphericModel::StandardAtmosphere.sample(0.0);
        assert_relative_eq!(air.temperature, 288.15, epsilon = 1e-9);
        assert_relative_eq!(air.pressure, 101_325.0, epsilon = 1e-6);
        assert_relative_eq!(air.density, 1.225, epsilon = 1e-3);
    }

    #[test]
    fn test_isa_tropopause_is_isothermal() {
        let low = AtmosphericModel::StandardAtmosphere.sample(12_000.0);
        let high = AtmosphericModel::StandardAtmosphere.sample(18_000.0);
        assert_relative_eq!(low.temperature, 216.65, epsilon = 1e-9);
        assert_relative_eq!(high.temperature, 216.65, epsilon = 1e-9);
        assert!(high.pressure < low.pressure);
    }

    #[test]
    fn test_density_decreases_with_height() {
        for model in [AtmosphericModel::StandardAtmosphere, AtmosphericModel::Exponential] {
            let mut last = f64::INFINITY;
            for h in (0..30).map(|i| i as f64 * 1000.0) {
                let rho = model.sample(h).density;
                assert!(rho < last, "{model} density not decreasing at {h} m");
                last = rho;
            }
        }
    }

    #[test]
    fn test_model_names() {
        assert_eq!(
            "standard_atmosphere".parse::<AtmosphericModel>().unwrap(),
            AtmosphericModel::StandardAtmosphere
        );
        assert_eq!(AtmosphericModel::Exponential.to_string(), "exponential");
        assert_eq!(
            "forecast".parse::<AtmosphericModel>(),
            Err(EngineError::UnknownAtmosphere("forecast".into()))
        );
    }

    #[test]
    fn test_gravity_by_latitude() {
        let equator = Environment::new(0.0, 0.0, 0.0);
        let pole = Environment::new(90.0, 0.0, 0.0);
        assert_relative_eq!(equator.gravity(0.0), 9.7803, epsilon = 1e-4);
        assert_relative_eq!(pole.gravity(0.0), 9.8322, epsilon = 1e-4);
        assert!(equator.gravity(10_000.0) < equator.gravity(0.0));
    }

    #[test]
    fn test_set_date_in_timezone() {
        let mut env = Environment::new(31.8664, -116.5959, 20.0);
        let local = NaiveDate::from_ymd_opt(2025, 5, 3)
            .unwrap()
            .and_hms_opt(22, 52, 0)
            .unwrap();
        env.set_date(local, chrono_tz::America::Tijuana).unwrap();

        let utc = env.date().unwrap().with_timezone(&Utc);
        assert_eq!(utc.to_rfc3339(), "2025-05-04T05:52:00+00:00");
    }

    #[test]
    fn test_set_date_rejects_skipped_local_time() {
        let mut env = Environment::new(31.8664, -116.5959, 20.0);
        let skipped = NaiveDate::from_ymd_opt(2025, 3, 9)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        assert!(matches!(
            env.set_date(skipped, chrono_tz::America::Tijuana),
            Err(EngineError::InvalidLaunchTime(_))
        ));
        assert!(env.date().is_none());
    }
}
