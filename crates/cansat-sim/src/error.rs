use thiserror::Error;

/// Failures raised while configuring or integrating a flight.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("rocket has no motor attached")]
    MissingMotor,

    #[error("unknown atmospheric model `{0}`")]
    UnknownAtmosphere(String),

    #[error("launch time {0} does not exist or is ambiguous in the selected timezone")]
    InvalidLaunchTime(String),

    #[error("inertia tensor {0:?} is singular")]
    SingularInertia([f64; 3]),

    #[error("integration diverged at t = {time:.3} s")]
    Diverged { time: f64 },
}

/// Reject non-finite values and values that fail `ok`.
pub(crate) fn check(name: &'static str, value: f64, ok: bool) -> Result<(), EngineError> {
    if value.is_finite() && ok {
        Ok(())
    } else {
        Err(EngineError::InvalidParameter { name, value })
    }
}
