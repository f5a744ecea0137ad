//! Simulation invocation: hand an [`Assembly`] to a flight engine and turn
//! its raw output into something the renderers can use.

use crate::assembly::{assemble, Assembly, SiteConfig};
use crate::error::PipelineError;
use crate::params::SimulationParameters;
use crate::solution::FlightSolution;
use cansat_sim::{EngineError, FlightSummary, SolutionMatrix};
use tracing::{info, warn};

/// Raw result of one engine run.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutput {
    pub apogee: f64, // m above sea level
    pub solution: SolutionMatrix,
    pub summary: FlightSummary,
}

/// Anything that can fly an [`Assembly`].
pub trait FlightEngine {
    fn run(&self, assembly: &Assembly) -> Result<EngineOutput, EngineError>;
}

/// The built-in 6-DoF solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct SixDofEngine {
    max_time: Option<f64>,
}

impl SixDofEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop integrating after `max_time` seconds of flight.
    pub fn with_max_time(max_time: f64) -> Self {
        Self {
            max_time: Some(max_time),
        }
    }
}

impl FlightEngine for SixDofEngine {
    fn run(&self, assembly: &Assembly) -> Result<EngineOutput, EngineError> {
        let mut flight = assembly.flight();
        if let Some(max_time) = self.max_time {
            flight = flight.with_max_time(max_time);
        }

        // The solver is lazy; apogee drives it to completion.
        let apogee = flight.apogee()?;
        let summary = flight.summary()?;
        let solution = flight.solution()?.clone();

        Ok(EngineOutput {
            apogee,
            solution,
            summary,
        })
    }
}

/// Everything a front-end needs to report one run.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub params: SimulationParameters,
    pub apogee: f64,
    pub summary: FlightSummary,
    pub solution: FlightSolution,
}

/// Assemble, fly and validate one run.
pub fn run_simulation<E>(
    engine: &E,
    params: &SimulationParameters,
    site: &SiteConfig,
) -> Result<SimulationReport, PipelineError>
where
    E: FlightEngine + ?Sized,
{
    info!(?params, "running simulation");
    let assembly = assemble(params, site)?;
    let output = engine.run(&assembly)?;

    let apogee = output.apogee;
    let solution = FlightSolution::new(output.solution).map_err(|source| {
        warn!(apogee, %source, "simulation produced no usable solution");
        PipelineError::Solution { apogee, source }
    })?;

    info!(
        apogee,
        rows = solution.len(),
        flight_time = output.summary.flight_time,
        "simulation complete"
    );

    Ok(SimulationReport {
        params: *params,
        apogee,
        summary: output.summary,
        solution,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolutionError;

    /// Returns a fixed solution, ignoring the assembly.
    struct CannedEngine {
        columns: usize,
        rows: usize,
    }

    impl FlightEngine for CannedEngine {
        fn run(&self, _: &Assembly) -> Result<EngineOutput, EngineError> {
            let data = vec![0.0; self.columns * self.rows];
            Ok(EngineOutput {
                apogee: 20.0,
                solution: SolutionMatrix::from_row_major(self.columns, data).unwrap_or_default(),
                summary: FlightSummary::default(),
            })
        }
    }

    struct FailingEngine;

    impl FlightEngine for FailingEngine {
        fn run(&self, _: &Assembly) -> Result<EngineOutput, EngineError> {
            Err(EngineError::Diverged { time: 0.5 })
        }
    }

    #[test]
    fn test_default_run_flies() {
        let params = SimulationParameters::default();
        let report = run_simulation(&SixDofEngine::new(), &params, &SiteConfig::terminal()).unwrap();

        assert!(report.apogee > params.elevation, "apogee {}", report.apogee);
        assert!(report.apogee < params.elevation + 50.0, "apogee {}", report.apogee);
        assert_eq!(report.summary.apogee, report.apogee);
        assert!(report.solution.len() > 2);
        assert_eq!(report.solution.time()[0], 0.0);
        assert_eq!(report.solution.z()[0], params.elevation);
    }

    #[test]
    fn test_degenerate_solution_is_reported() {
        for rows in [0, 1] {
            let err = run_simulation(
                &CannedEngine { columns: 14, rows },
                &SimulationParameters::default(),
                &SiteConfig::terminal(),
            )
            .unwrap_err();

            assert!(err.is_degenerate());
            assert_eq!(
                err,
                PipelineError::Solution {
                    apogee: 20.0,
                    source: SolutionError::Degenerate { rows }
                }
            );
        }
    }

    #[test]
    fn test_narrow_solution_is_reported() {
        let err = run_simulation(
            &CannedEngine { columns: 3, rows: 5 },
            &SimulationParameters::default(),
            &SiteConfig::terminal(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Solution {
                source: SolutionError::Layout { columns: 3, .. },
                ..
            }
        ));
    }

    #[test]
    fn test_engine_errors_propagate() {
        let err = run_simulation(&FailingEngine, &SimulationParameters::default(), &SiteConfig::server()).unwrap_err();
        assert_eq!(err, PipelineError::Engine(EngineError::Diverged { time: 0.5 }));
        assert!(!err.is_degenerate());
    }

    #[test]
    fn test_invalid_parameters_fail_in_engine() {
        let params = SimulationParameters {
            burn_time: 0.0,
            ..SimulationParameters::default()
        };
        let err = run_simulation(&SixDofEngine::new(), &params, &SiteConfig::terminal()).unwrap_err();
        assert!(matches!(err, PipelineError::Engine(EngineError::InvalidParameter { .. })));
    }

    #[test]
    fn test_max_time_is_forwarded() {
        let report = run_simulation(
            &SixDofEngine::with_max_time(0.5),
            &SimulationParameters::default(),
            &SiteConfig::terminal(),
        )
        .unwrap();
        assert!((report.summary.flight_time - 0.5).abs() < 1e-9);
    }
}
