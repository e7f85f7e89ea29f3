//! `gridkey` binary.

mod args;

use std::env;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use gridkey_address::P2pkhDeriver;
use gridkey_error::GridKeyError;
use gridkey_search::{JsonlSink, SearchPlan, run};
use gridkey_types::MeasurementGrid;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::args::{Command, CommandKind, Invocation, USAGE, parse_args};

/// How a failed invocation is reported.
#[derive(Debug)]
enum Failure {
    /// Bad input or configuration; nothing was searched.
    Config(GridKeyError),
    Runtime(GridKeyError),
}

impl From<GridKeyError> for Failure {
    fn from(err: GridKeyError) -> Self {
        if err.is_configuration() {
            Self::Config(err)
        } else {
            Self::Runtime(err)
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);
    // Fails only when a subscriber is already installed.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Every load failure is an input problem, including an unreadable file.
fn load_grid(path: &Path) -> Result<MeasurementGrid, Failure> {
    let bytes = fs::read(path).map_err(|err| {
        Failure::Config(GridKeyError::InvalidOption(format!(
            "cannot read measurements {}: {err}",
            path.display()
        )))
    })?;
    MeasurementGrid::from_json_slice(&bytes).map_err(Failure::Config)
}

fn execute(invocation: &Invocation) -> Result<(), Failure> {
    let grid = load_grid(&invocation.measurements)?;
    let plan = SearchPlan::resolve(&invocation.config, &grid)?;

    match invocation.kind {
        CommandKind::List => {
            print!("{}", render_listing(&plan));
            Ok(())
        }
        CommandKind::Run => {
            info!(
                measurements = %invocation.measurements.display(),
                output = ?invocation.output,
                matches_output = ?invocation.matches_output,
                "loaded measurements"
            );
            let sink = JsonlSink::open(
                invocation.output.as_deref(),
                invocation.matches_output.as_deref(),
            )
            .map_err(Failure::Runtime)?;
            let outcome = run(&plan, &P2pkhDeriver, &sink).map_err(Failure::Runtime)?;
            let totals = serde_json::to_string_pretty(&outcome.totals)
                .map_err(|err| Failure::Runtime(GridKeyError::Serialization(err.to_string())))?;
            println!("{totals}");
            Ok(())
        }
    }
}

fn render_listing(plan: &SearchPlan) -> String {
    let areas: Vec<&str> = plan.sources().names().collect();
    let pairings: Vec<&str> = plan.schemes().keys().map(String::as_str).collect();
    let range = plan.range();
    format!(
        "areas ({}): {}\npairings ({}): {}\ncombinations: {} (selected {}..{})\n",
        areas.len(),
        areas.join(", "),
        pairings.len(),
        pairings.join(", "),
        plan.combinations().len(),
        range.start,
        range.end,
    )
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let invocation = match parse_args(&args) {
        Ok(Command::Help) => {
            print!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Ok(Command::Execute(invocation)) => invocation,
        Err(message) => {
            eprintln!("error: {message}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    init_tracing(invocation.log_json);
    match execute(&invocation) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Failure::Config(err)) => {
            error!(error = %err, "invalid configuration");
            ExitCode::from(2)
        }
        Err(Failure::Runtime(err)) => {
            error!(error = %err, "search failed");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridkey_search::SearchConfig;
    use gridkey_types::Selection;

    fn grid_json() -> String {
        let cells: Vec<String> = (0..64)
            .map(|i| format!(r#"{{"index": {i}, "outer_area": {}, "inner_area": 1.0}}"#, 10 + i))
            .collect();
        format!("[{}]", cells.join(","))
    }

    #[test]
    fn test_load_grid_reads_documents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("grid.json");
        fs::write(&path, grid_json()).expect("write");
        let grid = load_grid(&path).expect("grid");
        assert_eq!(grid.cells().len(), 64);
        assert_eq!(grid.cells()[3].shell_area, 12.0);
    }

    #[test]
    fn test_load_failures_are_configuration_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing.json");
        assert!(matches!(load_grid(&missing), Err(Failure::Config(_))));

        let short = dir.path().join("short.json");
        fs::write(&short, r#"[{"index": 0, "outer_area": 1.0, "inner_area": 0.5}]"#)
            .expect("write");
        assert!(matches!(
            load_grid(&short),
            Err(Failure::Config(GridKeyError::MeasurementCount { actual: 1, .. }))
        ));
    }

    #[test]
    fn test_listing_names_catalogs() {
        let grid = MeasurementGrid::from_json_slice(grid_json().as_bytes()).expect("grid");
        let config = SearchConfig {
            pairings: Selection::parse("row_major,spiral"),
            end_index: Some(5),
            ..SearchConfig::default()
        };
        let plan = SearchPlan::resolve(&config, &grid).expect("plan");
        let listing = render_listing(&plan);
        assert!(listing.contains("areas (15): aspect_ratio, bbox_area"));
        assert!(listing.contains("pairings (2): row_major, spiral"));
        assert!(listing.contains("combinations: 480 (selected 0..5)"));
    }

    #[test]
    fn test_failure_classification() {
        assert!(matches!(
            Failure::from(GridKeyError::EmptyCombinationSet),
            Failure::Config(_)
        ));
        assert!(matches!(
            Failure::from(GridKeyError::internal("boom")),
            Failure::Runtime(_)
        ));
    }
}
