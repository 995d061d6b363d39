pub mod cli;
pub mod data;
pub mod dataset;
pub mod error;
pub mod fields;
pub mod io_utils;
pub mod query;
pub mod render;
pub mod schema;
pub mod shell;
pub mod sort;
pub mod table;

use std::{
    env,
    io::{self, Write},
    sync::OnceLock,
};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{LevelFilter, info};
use serde::Serialize;

use crate::{
    cli::{Cli, Commands, InputArgs, OutputFormat},
    dataset::{Dataset, LoadOptions},
    shell::Shell,
    sort::SortDirection,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("climate_query", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Country(args) => {
            let dataset = load_dataset(&args.input)?;
            let result = query::search_country(&dataset, args.name.trim());
            emit(args.format, &result, || render::country_search(&result))
        }
        Commands::Years(args) => {
            let dataset = load_dataset(&args.input)?;
            let result = query::search_year_range(&dataset, args.start, args.end);
            info!(
                "{} record(s) between {} and {}",
                result.count(),
                result.start,
                result.end
            );
            emit(args.format, &result, || render::year_range(&result))
        }
        Commands::Extremes(args) => {
            let dataset = load_dataset(&args.input)?;
            let result = query::extreme_events_extremes(&dataset);
            emit(args.format, &result, || render::extremes(&result))
        }
        Commands::TopCo2(args) => {
            let dataset = load_dataset(&args.input)?;
            let result = query::top_n_co2(&dataset, args.year, args.top);
            let shown = usize::try_from(args.top)
                .ok()
                .filter(|&n| n > 0)
                .unwrap_or(query::DEFAULT_TOP_N);
            emit(args.format, &result, || render::top_co2(&result, shown))
        }
        Commands::Rank(args) => {
            let dataset = load_dataset(&args.input)?;
            let direction = SortDirection::from_ascending(!args.desc);
            let result = query::sort_metric_for_year(&dataset, args.year, args.metric, direction);
            emit(args.format, &result, || {
                render::metric_ranking(&result, args.metric, direction)
            })
        }
        Commands::Averages(args) => {
            let dataset = load_dataset(&args.input)?;
            let name = args.name.trim();
            let result = query::averages_for_country(&dataset, name);
            emit(args.format, &result, || {
                render::averages(name, result.as_ref())
            })
        }
        Commands::Shell(args) => {
            if io_utils::is_dash(&args.input.input) {
                bail!("The interactive shell reads commands from stdin; pass a file path with --input");
            }
            let dataset = load_dataset(&args.input)?;
            let mut output = io::stdout().lock();
            output
                .write_all(render::load_summary(dataset.report()).as_bytes())
                .context("Writing load summary")?;
            Shell::new(&dataset, io::stdin().lock(), output)
                .run()
                .context("Running interactive shell")
        }
    }
}

fn load_dataset(args: &InputArgs) -> Result<Dataset> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    info!(
        "Loading '{}' with delimiter '{}'",
        args.input.display(),
        printable_delimiter(delimiter)
    );
    Dataset::load(&args.input, &LoadOptions { delimiter, encoding })
        .with_context(|| format!("Loading climate data from {:?}", args.input))
}

fn emit<T, F>(format: OutputFormat, value: &T, text: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce() -> String,
{
    match format {
        OutputFormat::Table => print!("{}", text()),
        OutputFormat::Json => println!("{}", render::to_json(value)?),
    }
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}
