use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::Env;
use tracing::{info, instrument};

use timetable_core::config::Config;
use timetable_core::normalizer::RawRow;
use timetable_core::request::SolveRequest;
use timetable_core::{cli::Args, logging};
use timetable_core::{Catalog, solve};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config: Config = Figment::new()
        .merge(Env::prefixed("TIMETABLE_"))
        .extract()
        .unwrap_or_default();

    logging::setup_logging(&config, args.tracing.clone());

    let catalog = load_catalog(&args.catalog)?;
    let request = load_request(&args.request)?;

    let response = solve_and_report(&catalog, &request)?;

    let output = serde_json::to_string_pretty(&response).context("serializing solve response")?;
    println!("{output}");

    Ok(())
}

#[instrument(skip_all, fields(path = %path.display()))]
fn load_catalog(path: &std::path::Path) -> Result<Catalog> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading catalog file {}", path.display()))?;
    let rows: Vec<RawRow> = serde_json::from_str(&raw).context("parsing catalog rows")?;
    let (catalog, warnings) = Catalog::from_rows(rows);

    for warning in &warnings {
        tracing::warn!(%warning, "normalization warning");
    }
    info!(
        sections = catalog.section_count(),
        courses = catalog.course_count(),
        warnings = warnings.len(),
        "catalog normalized"
    );

    Ok(catalog)
}

#[instrument(skip_all, fields(path = %path.display()))]
fn load_request(path: &std::path::Path) -> Result<SolveRequest> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading request file {}", path.display()))?;
    let request: SolveRequest = serde_json::from_str(&raw).context("parsing solve request")?;
    Ok(request)
}

#[instrument(skip_all, fields(required = request.required_course_keys.len(), max_results = request.max_results))]
fn solve_and_report(catalog: &Catalog, request: &SolveRequest) -> Result<timetable_core::SolveResponse> {
    let response = solve(catalog, request).context("solving schedule request")?;
    info!(schedules_found = response.count, "solve complete");
    Ok(response)
}
