//! CanSat CLI - interactive terminal front-end.
//!
//! Prompts for the eight launch parameters, flies them, prints the apogee,
//! writes both charts to a timestamped PNG in the output directory and then
//! shows them in plot windows.

pub mod viewer;

use anyhow::{Context, Result};
use cansat_core::{
    collect_parameters, run_simulation, FlightEngine, PipelineError, SimulationParameters, SimulationReport,
    SiteConfig, SixDofEngine,
};
use cansat_plot::{render_report_png, FigureRegistry};
use chrono::{Local, NaiveDateTime};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use viewer::{Viewer, WindowViewer};

/// Default log level for terminal runs; keeps the prompts readable.
pub const TERMINAL_LOG_LEVEL: &str = "warn";

/// `RUST_LOG` when it is set, otherwise `default_level`.
pub fn log_filter(default_level: &str) -> EnvFilter {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    filter_or_default(directives.as_deref(), default_level)
}

fn filter_or_default(directives: Option<&str>, default_level: &str) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level))
}

/// Public function that can be called from the main binary
pub fn run_cli_main(args: &[&str]) -> Result<()> {
    let args = Args::parse_from(args);
    main_inner(args)
}

#[derive(Parser, Debug)]
#[command(name = "cansat-cli")]
#[command(about = "Interactive CanSat flight simulator")]
#[command(version)]
pub struct Args {
    /// Directory the plot (and any export) is written to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Skip the prompts and fly the compiled-in defaults
    #[arg(long)]
    pub defaults: bool,

    /// Also write the solution table in this format
    #[arg(short, long, value_enum)]
    pub export: Option<ExportFormat>,

    /// Write the plots without opening the plot windows
    #[arg(long)]
    pub no_show: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// What a terminal run left behind.
#[derive(Debug)]
pub enum TerminalOutcome {
    Written {
        report: Box<SimulationReport>,
        png: PathBuf,
        export: Option<PathBuf>,
    },
    /// The engine ran but returned nothing plottable.
    NoSolution { apogee: f64, reason: String },
}

pub fn main_inner(args: Args) -> Result<()> {
    println!("CanSat Flight Simulator");
    println!("=======================\n");

    let params = if args.defaults {
        SimulationParameters::default()
    } else {
        println!("Press Enter to accept the value in brackets.\n");
        let stdin = io::stdin();
        collect_parameters(&mut stdin.lock(), &mut io::stdout()).context("failed to read parameters")?
    };

    let stamp = Local::now().naive_local();
    match run_terminal(&SixDofEngine::new(), &params, &args, &stamp, &WindowViewer)? {
        TerminalOutcome::Written { .. } => Ok(()),
        TerminalOutcome::NoSolution { apogee, reason } => {
            eprintln!("Warning: the simulation did not produce results to plot ({reason}).");
            eprintln!("Apogee reported by the engine: {apogee:.2} m");
            std::process::exit(1);
        }
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------
/// Fly `params`, write the results under `args.output_dir` and hand the
/// written plot to `viewer` unless `args.no_show` is set.
///
/// Engine and I/O failures are errors; an unplottable solution is reported
/// as [`TerminalOutcome::NoSolution`] and writes nothing.
pub fn run_terminal<E>(
    engine: &E,
    params: &SimulationParameters,
    args: &Args,
    now: &NaiveDateTime,
    viewer: &dyn Viewer,
) -> Result<TerminalOutcome>
where
    E: FlightEngine + ?Sized,
{
    let report = match run_simulation(engine, params, &SiteConfig::terminal()) {
        Ok(report) => report,
        Err(PipelineError::Solution { apogee, source }) => {
            warn!(apogee, %source, "nothing to plot");
            return Ok(TerminalOutcome::NoSolution {
                apogee,
                reason: source.to_string(),
            });
        }
        Err(e) => return Err(e).context("simulation failed"),
    };

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("failed to create {}", args.output_dir.display()))?;

    let registry = FigureRegistry::new();
    let png = render_report_png(&registry, &report.solution).context("failed to render plots")?;
    let png_path = args.output_dir.join(timestamp_file_name(now, "png"));
    std::fs::write(&png_path, png).with_context(|| format!("failed to write {}", png_path.display()))?;
    info!(path = %png_path.display(), "plot written");

    let export = match args.export {
        Some(format) => {
            let path = args.output_dir.join(timestamp_file_name(now, format.extension()));
            write_export(&path, format, &report)?;
            Some(path)
        }
        None => None,
    };

    print_flight_stats(&report);
    println!("Plot written to {}", png_path.display());
    if let Some(path) = &export {
        println!("Solution written to {}", path.display());
    }

    if args.no_show {
        debug!("plot windows skipped");
    } else {
        viewer.show(&report, &png_path).context("failed to display plots")?;
    }

    Ok(TerminalOutcome::Written {
        report: Box::new(report),
        png: png_path,
        export,
    })
}

/// `YYYYMMDD_HHMMSS.<extension>`
pub fn timestamp_file_name(now: &NaiveDateTime, extension: &str) -> String {
    format!("{}.{extension}", now.format("%Y%m%d_%H%M%S"))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------
fn print_flight_stats(report: &SimulationReport) {
    let s = &report.summary;
    let elevation = report.params.elevation;

    println!("\nSimulation Stats:");
    println!("  Apogee:        {:.2} m", report.apogee);
    println!("  Apogee (AGL):  {:.2} m", report.apogee - elevation);
    println!("  Apogee Time:   {:.2} s", s.apogee_time);
    match (s.out_of_rail_time, s.out_of_rail_velocity) {
        (Some(t), Some(v)) => println!("  Off Rail:      {t:.2} s at {v:.2} m/s"),
        _ => println!("  Off Rail:      never"),
    }
    println!("  Max Speed:     {:.2} m/s", s.max_speed);
    println!("  Flight Time:   {:.2} s", s.flight_time);
    println!("  Rows:          {}", report.solution.len());
    println!("-----------------------------");
}

#[derive(Debug, Serialize)]
struct SolutionRecord {
    t: f64,
    x: f64,
    y: f64,
    z: f64,
    vx: f64,
    vy: f64,
    vz: f64,
    e0: Option<f64>,
    e1: Option<f64>,
    e2: Option<f64>,
    e3: Option<f64>,
    wx: Option<f64>,
    wy: Option<f64>,
    wz: Option<f64>,
}

impl SolutionRecord {
    // Rows are at least seven wide; attitude and rates are optional.
    fn from_row(row: &[f64]) -> Self {
        let opt = |i: usize| row.get(i).copied();
        Self {
            t: row[0],
            x: row[1],
            y: row[2],
            z: row[3],
            vx: row[4],
            vy: row[5],
            vz: row[6],
            e0: opt(7),
            e1: opt(8),
            e2: opt(9),
            e3: opt(10),
            wx: opt(11),
            wy: opt(12),
            wz: opt(13),
        }
    }
}

#[derive(Debug, Serialize)]
struct SummaryRecord {
    apogee: f64,
    apogee_time: f64,
    out_of_rail_time: Option<f64>,
    out_of_rail_velocity: Option<f64>,
    max_speed: f64,
    flight_time: f64,
}

#[derive(Debug, Serialize)]
struct JsonExport<'a> {
    parameters: &'a SimulationParameters,
    summary: SummaryRecord,
    solution: Vec<SolutionRecord>,
}

fn records(report: &SimulationReport) -> impl Iterator<Item = SolutionRecord> + '_ {
    report.solution.matrix().iter_rows().map(SolutionRecord::from_row)
}

fn write_export(path: &Path, format: ExportFormat, report: &SimulationReport) -> Result<()> {
    match format {
        ExportFormat::Csv => {
            let mut wtr = csv::Writer::from_path(path).with_context(|| format!("failed to create {}", path.display()))?;
            for record in records(report) {
                wtr.serialize(record)?;
            }
            wtr.flush()?;
        }
        ExportFormat::Json => {
            let s = &report.summary;
            let export = JsonExport {
                parameters: &report.params,
                summary: SummaryRecord {
                    apogee: report.apogee,
                    apogee_time: s.apogee_time,
                    out_of_rail_time: s.out_of_rail_time,
                    out_of_rail_velocity: s.out_of_rail_velocity,
                    max_speed: s.max_speed,
                    flight_time: s.flight_time,
                },
                solution: records(report).collect(),
            };
            let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
            serde_json::to_writer_pretty(BufWriter::new(file), &export)?;
        }
    }
    info!(path = %path.display(), ?format, "solution exported");
    Ok(())
}
