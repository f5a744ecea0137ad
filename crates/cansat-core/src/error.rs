use cansat_sim::EngineError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntakeError {
    #[error("`{0}` is not a number")]
    InvalidNumber(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolutionError {
    #[error("solution has {rows} row(s); at least 2 are needed to plot")]
    Degenerate { rows: usize },

    #[error("solution has {columns} column(s); at least {required} are required")]
    Layout { columns: usize, required: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("flight engine failed: {0}")]
    Engine(#[from] EngineError),

    #[error("simulation produced no plottable results (apogee {apogee:.2} m): {source}")]
    Solution {
        apogee: f64,
        #[source]
        source: SolutionError,
    },
}

impl PipelineError {
    /// True when the engine ran but its output cannot be plotted.
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::Solution { .. })
    }
}
