use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::data::RankMetric;

#[derive(Debug, Parser)]
#[command(author, version, about = "Explore country/year climate datasets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List every record for a country (suggests close names when not found)
    Country(CountryArgs),
    /// List records whose year falls within an inclusive range
    Years(YearsArgs),
    /// Show the countries with the lowest and highest total extreme events
    Extremes(ExtremesArgs),
    /// Rank the top CO2 emitters in a year
    TopCo2(TopCo2Args),
    /// Sort countries by temperature anomaly or GDP for a year
    Rank(RankArgs),
    /// Per-metric averages for a country
    Averages(AveragesArgs),
    /// Load the dataset once and answer queries from an interactive menu
    Shell(ShellArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Climate CSV file to load ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Args)]
pub struct CountryArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Country name (exact, case-sensitive)
    pub name: String,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct YearsArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// First year of the range
    #[arg(allow_negative_numbers = true)]
    pub start: i32,
    /// Last year of the range (bounds may be given in either order)
    #[arg(allow_negative_numbers = true)]
    pub end: i32,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct ExtremesArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct TopCo2Args {
    #[command(flatten)]
    pub input: InputArgs,
    /// Year to rank
    #[arg(long, allow_negative_numbers = true)]
    pub year: i32,
    /// Number of emitters to show (values <= 0 fall back to 10)
    #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
    pub top: i64,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct RankArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Year to rank
    #[arg(long, allow_negative_numbers = true)]
    pub year: i32,
    /// Metric to sort by
    #[arg(long, value_enum)]
    pub metric: RankMetric,
    /// Sort descending instead of ascending
    #[arg(long)]
    pub desc: bool,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct AveragesArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Country name (exact, case-sensitive)
    pub name: String,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct ShellArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
