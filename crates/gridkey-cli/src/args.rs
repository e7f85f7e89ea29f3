//! Command-line parsing.

use std::path::PathBuf;

use gridkey_search::SearchConfig;
use gridkey_types::{AdjustmentMode, Selection};

pub const USAGE: &str = "\
gridkey - search grid-measurement encodings for a target address

USAGE:
    gridkey run --measurements <FILE> [OPTIONS]
    gridkey list --measurements <FILE> [OPTIONS]

COMMANDS:
    run     Evaluate the selected combinations
    list    Print area sources, pairing schemes and the combination count

OPTIONS:
    --measurements <FILE>       JSON document with the 64 cell measurements (required)
    --target <ADDR>             Target P2PKH address (default: 1cryptoGeCRiTzVgxBQcKFFjSVydN1GW7)
    --areas <a,b|all>           Area sources to include (default: all)
    --pairs <p,q|all>           Pairing schemes to include (default: all)
    --pre-modes <m,n|all>       Pre-pairing tick modes: none|add|subtract|multiply (default: all)
    --post-modes <m,n|all>      Post-pairing tick modes (default: all)
    --start-index <N>           First combination to evaluate (default: 0)
    --end-index <N>             Exclusive end of the combination slice
    --transform-limit <N>       Maximum transforms per combination
    --output <FILE>             Append per-combination summaries here (JSONL)
    --matches-output <FILE>     Append matches here (JSONL)
    --no-dedupe                 Derive keys even when already seen
    --workers <N>               Worker threads (default: 1)
    --stop-on-match             Stop once any combination matches
    --log-json                  Emit logs as JSON on stderr
    -h, --help                  Show this help
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Run,
    List,
}

/// A fully parsed invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Execute(Invocation),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub kind: CommandKind,
    pub measurements: PathBuf,
    pub config: SearchConfig,
    pub output: Option<PathBuf>,
    pub matches_output: Option<PathBuf>,
    pub log_json: bool,
}

pub fn parse_args(args: &[String]) -> Result<Command, String> {
    let Some(first) = args.first() else {
        return Err("missing command (expected `run` or `list`)".to_owned());
    };
    let kind = match first.as_str() {
        "run" => CommandKind::Run,
        "list" => CommandKind::List,
        "-h" | "--help" | "help" => return Ok(Command::Help),
        other => return Err(format!("unknown command: {other}")),
    };

    let mut measurements = None;
    let mut config = SearchConfig::default();
    let mut output = None;
    let mut matches_output = None;
    let mut log_json = false;

    let mut index = 1;
    while index < args.len() {
        let flag = args[index].as_str();
        let mut value = || {
            index += 1;
            args.get(index)
                .map(String::as_str)
                .ok_or_else(|| format!("{flag} requires a value"))
        };
        match flag {
            "--measurements" => measurements = Some(PathBuf::from(value()?)),
            "--target" => config.target = value()?.trim().to_owned(),
            "--areas" => config.areas = Selection::parse(value()?),
            "--pairs" => config.pairings = Selection::parse(value()?),
            "--pre-modes" => config.pre_modes = parse_modes(flag, value()?)?,
            "--post-modes" => config.post_modes = parse_modes(flag, value()?)?,
            "--start-index" => config.start_index = parse_count(flag, value()?)?,
            "--end-index" => config.end_index = Some(parse_count(flag, value()?)?),
            "--transform-limit" => config.transform_limit = Some(parse_count(flag, value()?)?),
            "--output" => output = Some(PathBuf::from(value()?)),
            "--matches-output" => matches_output = Some(PathBuf::from(value()?)),
            "--workers" => config.workers = parse_count(flag, value()?)?,
            "--no-dedupe" => config.dedupe = false,
            "--stop-on-match" => config.stop_on_match = true,
            "--log-json" => log_json = true,
            "-h" | "--help" => return Ok(Command::Help),
            unknown => return Err(format!("unknown option: {unknown}")),
        }
        index += 1;
    }

    let measurements = measurements.ok_or_else(|| "--measurements is required".to_owned())?;
    Ok(Command::Execute(Invocation {
        kind,
        measurements,
        config,
        output,
        matches_output,
        log_json,
    }))
}

/// Comma-separated modes; blank or `all` selects every mode.
fn parse_modes(flag: &str, raw: &str) -> Result<Vec<AdjustmentMode>, String> {
    match Selection::parse(raw) {
        Selection::All => Ok(AdjustmentMode::ALL.to_vec()),
        Selection::Named(names) => names
            .iter()
            .map(|name| {
                name.parse::<AdjustmentMode>()
                    .map_err(|err| format!("invalid {flag} value: {err}"))
            })
            .collect(),
    }
}

fn parse_count(flag: &str, raw: &str) -> Result<usize, String> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| format!("invalid {flag} value: {raw}"))
}
