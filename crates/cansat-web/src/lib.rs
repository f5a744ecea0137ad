//! CanSat Web - single-route web view of a CanSat flight.
//!
//! `GET /` flies the default CanSat from the configured site, launching at
//! request time, and answers with an HTML page holding the apogee and both
//! charts as inline base64 PNGs. Failures are rendered into the same page.

pub mod page;

use axum::{extract::State, response::Html, routing::get, Router};
use cansat_core::{run_simulation, FlightEngine, PipelineError, SimulationParameters, SiteConfig, SixDofEngine};
use cansat_plot::{render_inline, FigureRegistry, PlotError};
use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Shared by every request. Each request still runs its own simulation.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn FlightEngine + Send + Sync>,
    pub params: SimulationParameters,
    pub site: SiteConfig,
    pub figures: FigureRegistry,
}

impl AppState {
    pub fn new(engine: Arc<dyn FlightEngine + Send + Sync>) -> Self {
        Self {
            engine,
            params: SimulationParameters::default(),
            site: SiteConfig::server(),
            figures: FigureRegistry::new(),
        }
    }
}

/// Creates the Axum router with the built-in engine
pub fn create_router() -> Router {
    router_with_state(AppState::new(Arc::new(SixDofEngine::new())))
}

pub fn router_with_state(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Error)]
enum PageError {
    #[error("simulation failed")]
    Simulation(#[from] PipelineError),

    #[error("rendering failed")]
    Render(#[from] PlotError),

    #[error("simulation worker stopped unexpectedly")]
    Worker(#[from] tokio::task::JoinError),
}

/// Handle the results page
async fn handle_index(State(state): State<AppState>) -> Html<String> {
    let job = state.clone();
    let outcome = tokio::task::spawn_blocking(move || build_results(&job))
        .await
        .map_err(PageError::from)
        .and_then(|result| result);

    let body = match outcome {
        Ok(body) => body,
        Err(PageError::Simulation(PipelineError::Solution { apogee, source })) => {
            warn!(apogee, %source, "simulation produced no plottable results");
            page::no_results(apogee, &source.to_string())
        }
        Err(e) => {
            let chain = error_chain(&e);
            error!(error = %chain, "request failed");
            page::failure(&e.to_string(), &chain)
        }
    };

    info!(open_figures = state.figures.open_figures(), "page rendered");
    Html(page::document(&body))
}

// Runs on the blocking pool: integration and rasterising are CPU bound.
fn build_results(state: &AppState) -> Result<String, PageError> {
    let report = run_simulation(state.engine.as_ref(), &state.params, &state.site)?;
    let figures = render_inline(&state.figures, &report.solution)?;
    Ok(page::results(report.apogee, report.params.elevation, &figures))
}

/// `err` followed by each of its sources, one per line.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str("\ncaused by: ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
