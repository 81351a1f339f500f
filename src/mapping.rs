use log::{debug, info, warn};

use activity_map::builder::Builder;
use activity_map::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::mapping::config_reader::*;

pub mod config_reader;
mod geocoders;
mod io_common;
mod io_csv;
mod io_xlsx;
mod summary;

#[derive(Debug, Snafu)]
pub enum MapCliError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook {path} has no worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("Worksheet {name} not found in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error reading file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("The file {path} has no parent directory"))]
    MissingParentDir { path: String },
    #[snafu(display("Line {lineno} of the geocoder table {path} is not query,lat,lng"))]
    GeocodeTableLine { path: String, lineno: usize },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("{source}"))]
    Library { source: MapError },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type MapResult<T> = Result<T, MapCliError>;

/// The inputs of a run, once the configuration file and the command line are merged.
#[derive(PartialEq, Debug, Clone)]
struct RunInputs {
    individuals_path: String,
    individuals_worksheet: Option<String>,
    activities_path: Option<String>,
    activities_worksheet: Option<String>,
    geocoder: GeocoderConfig,
    out: Option<String>,
    settings: MapSettings,
}

fn merge_inputs(args: &Args, config: RunConfig) -> MapResult<RunInputs> {
    let settings = config.settings()?;
    let individuals_path = match args.individuals.clone().or(config.individuals_file) {
        Some(p) => p,
        None => whatever!("No individuals file: pass --individuals or set individualsFile"),
    };
    let geocoder = match (&args.geocoder_table, config.geocoder) {
        (Some(table), _) => GeocoderConfig {
            provider: "table".to_string(),
            table_path: Some(table.clone()),
            endpoint: None,
            api_key_env: None,
        },
        (None, Some(g)) => g,
        (None, None) => whatever!("No geocoder: pass --geocoder-table or set geocoder"),
    };
    // A worksheet given on the command line applies to both files.
    let worksheet = args.excel_worksheet_name.clone();
    Ok(RunInputs {
        individuals_path,
        individuals_worksheet: worksheet.clone().or(config.individuals_worksheet),
        activities_path: args.activities.clone().or(config.activities_file),
        activities_worksheet: worksheet.or(config.activities_worksheet),
        geocoder,
        out: args.out.clone().or(config.output_file),
        settings,
    })
}

pub fn run(args: &Args) -> MapResult<()> {
    let config = match &args.config {
        Some(p) => read_config(p)?,
        None => RunConfig::default(),
    };
    let inputs = merge_inputs(args, config)?;
    info!("run: inputs: {:?}", inputs);

    let mut geocoder = geocoders::make_geocoder(&inputs.geocoder)?;
    let mut session = Builder::new(&inputs.settings)
        .context(LibrarySnafu {})?
        .build()
        .context(LibrarySnafu {})?;

    let individual_rows = io_common::read_rows(
        &inputs.individuals_path,
        inputs.individuals_worksheet.as_deref(),
    )?;
    let upload = session
        .load_individuals(&individual_rows, geocoder.as_mut())
        .context(LibrarySnafu {})?;
    info!(
        "run: individuals: header at row {} ({} matches), {} rows",
        upload.header.index, upload.header.matches, upload.rows
    );
    if let Some(msg) = session.failure_message() {
        warn!("{}", msg);
        for address in session.failed_addresses() {
            debug!("run: failed address: {:?}", address);
        }
    }

    if let Some(activities_path) = &inputs.activities_path {
        let activity_rows =
            io_common::read_rows(activities_path, inputs.activities_worksheet.as_deref())?;
        let upload = session
            .load_activities(&activity_rows)
            .context(LibrarySnafu {})?;
        info!(
            "run: activities: header at row {} ({} matches), {} rows",
            upload.header.index, upload.header.matches, upload.rows
        );
    }

    let result_js = summary::build_summary_js(&session);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    match inputs.out.as_deref() {
        None | Some("") | Some("stdout") => println!("{}", pretty_js_stats),
        Some(path) => {
            info!("run: writing summary to {:?}", path);
            fs::write(path, &pretty_js_stats).context(WritingOutputSnafu { path })?;
        }
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = &args.reference {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between computed summary and reference summary")
        }
    }

    Ok(())
}
