//! Text and JSON rendering of query results.
//!
//! The query layer never formats anything; this module turns its structured
//! results into the messages and tables shown by the command-line front ends.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use itertools::Itertools;
use serde::Serialize;

use crate::{
    data::{self, RankMetric, Record},
    dataset::LoadReport,
    query::{
        CountryAverages, CountrySearch, CountryTotal, ExtremeEventsRanking, MetricAverage,
        YearRange, YearRanking,
    },
    sort::SortDirection,
    table::{Align, Table},
};

const RECORD_COLUMNS: &[(&str, Align)] = &[
    ("country", Align::Left),
    ("year", Align::Right),
    ("temp_anomaly", Align::Right),
    ("co2", Align::Right),
    ("gdp", Align::Right),
    ("extreme_events", Align::Right),
];

pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Serializing result as JSON")
}

pub fn records_table<'a>(records: impl IntoIterator<Item = &'a Record>) -> String {
    let mut table = Table::new(RECORD_COLUMNS);
    for record in records {
        table.push_row(record.display_cells());
    }
    table.render()
}

pub fn load_summary(report: &LoadReport) -> String {
    let mut output = format!(
        "Loaded {} rows.\nCountries detected: {}\n",
        report.retained_records, report.countries
    );
    let missing = report.columns.missing_fields();
    if !missing.is_empty() {
        let _ = writeln!(
            output,
            "Columns not found (treated as missing): {}",
            missing.iter().map(|field| field.label()).join(", ")
        );
    }
    output
}

pub fn country_search(search: &CountrySearch<'_>) -> String {
    match search {
        CountrySearch::Found { country, records } => format!(
            "Found {} records for {country}:\n{}",
            records.len(),
            records_table(records.iter().copied())
        ),
        CountrySearch::Suggestions { names, .. } => {
            let mut output = String::from("No exact match. Did you mean:\n");
            for name in names {
                let _ = writeln!(output, "  - {name}");
            }
            output
        }
        CountrySearch::NoMatch { query } => format!("No records for {query}\n"),
    }
}

pub fn year_range(range: &YearRange<'_>) -> String {
    let mut output = String::new();
    if !range.records.is_empty() {
        output.push_str(&records_table(range.records.iter().copied()));
    }
    let _ = writeln!(
        output,
        "Total {} records in [{},{}]",
        range.count(),
        range.start,
        range.end
    );
    output
}

pub fn extremes(ranking: &ExtremeEventsRanking<'_>) -> String {
    if ranking.is_empty() {
        return "No extreme events data.\n".to_string();
    }
    format!(
        "Lowest extreme-events countries ({}):\n{}Highest extreme-events countries ({}):\n{}",
        ranking.lowest.len(),
        totals_table(&ranking.lowest),
        ranking.highest.len(),
        totals_table(&ranking.highest)
    )
}

fn totals_table(totals: &[CountryTotal<'_>]) -> String {
    let mut table = Table::new(&[
        ("country", Align::Left),
        ("extreme_events", Align::Right),
        ("records", Align::Right),
    ]);
    for total in totals {
        table.push_row(vec![
            total.country.to_string(),
            total.total.to_string(),
            total.records.to_string(),
        ]);
    }
    table.render()
}

pub fn top_co2(ranking: &YearRanking<'_>, requested: usize) -> String {
    ranking_text(
        ranking,
        "co2",
        "CO2",
        false,
        |year| format!("Top {requested} CO2 emitters in {year}:"),
    )
}

pub fn metric_ranking(
    ranking: &YearRanking<'_>,
    metric: RankMetric,
    direction: SortDirection,
) -> String {
    let column = match metric {
        RankMetric::TemperatureAnomaly => "temp_anomaly",
        RankMetric::Gdp => "gdp",
    };
    let heading = match metric {
        RankMetric::TemperatureAnomaly => "Temperature Anomaly",
        RankMetric::Gdp => "GDP",
    };
    ranking_text(ranking, column, &metric.to_string(), true, |year| {
        format!("Countries sorted by {heading} ({direction}) for {year}:")
    })
}

fn ranking_text<F>(
    ranking: &YearRanking<'_>,
    column: &str,
    label: &str,
    announce_truncation: bool,
    heading: F,
) -> String
where
    F: FnOnce(i32) -> String,
{
    match ranking {
        YearRanking::UnknownYear { year } => format!("No data for year {year}\n"),
        YearRanking::NoValues { year } => format!("No {label} values for {year}\n"),
        YearRanking::Ranked {
            year,
            entries,
            total,
            truncated,
        } => {
            let mut table = Table::new(&[
                ("rank", Align::Right),
                ("country", Align::Left),
                (column, Align::Right),
            ]);
            for entry in entries {
                table.push_row(vec![
                    entry.rank.to_string(),
                    entry.record.country.clone(),
                    data::format_number(entry.value),
                ]);
            }
            let mut output = format!("{}\n{}", heading(*year), table.render());
            if announce_truncation && *truncated {
                let _ = writeln!(output, "(showing first {} of {total})", entries.len());
            }
            output
        }
    }
}

pub fn averages(name: &str, averages: Option<&CountryAverages<'_>>) -> String {
    let Some(averages) = averages else {
        return format!("No records for {name}\n");
    };
    let mut output = format!(
        "Averages for {} over {} rows:\n",
        averages.country, averages.rows
    );
    for (label, metric) in [
        ("Avg Temp Anomaly", &averages.temperature_anomaly),
        ("Avg CO2", &averages.co2),
        ("Avg GDP", &averages.gdp),
        ("Avg Extreme Events", &averages.extreme_events),
    ] {
        let _ = writeln!(output, "  {label}: {}", average_cell(metric));
    }
    output
}

fn average_cell(metric: &MetricAverage) -> String {
    format!(
        "{} ({} values)",
        data::display_real(metric.value()),
        metric.count
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dataset::Dataset, query};

    fn dataset() -> Dataset {
        let mut usa = Record::new("USA");
        usa.year = Some(2020);
        usa.co2 = Some(5000.0);
        let mut peru = Record::new("Peru");
        peru.year = Some(2020);
        Dataset::from_records([usa, peru])
    }

    #[test]
    fn country_search_lists_suggestions() {
        let dataset = dataset();
        let text = country_search(&query::search_country(&dataset, "us"));
        assert_eq!(text, "No exact match. Did you mean:\n  - USA\n");
    }

    #[test]
    fn year_range_prints_total_line() {
        let dataset = dataset();
        let text = year_range(&query::search_year_range(&dataset, 2021, 2030));
        assert_eq!(text, "Total 0 records in [2021,2030]\n");
    }

    #[test]
    fn top_co2_reports_missing_year() {
        let dataset = dataset();
        let text = top_co2(&query::top_n_co2(&dataset, 1950, 5), 5);
        assert_eq!(text, "No data for year 1950\n");
    }

    #[test]
    fn metric_ranking_names_metric_when_values_missing() {
        let dataset = dataset();
        let ranking =
            query::sort_metric_for_year(&dataset, 2020, RankMetric::Gdp, SortDirection::Asc);
        assert_eq!(
            metric_ranking(&ranking, RankMetric::Gdp, SortDirection::Asc),
            "No GDP values for 2020\n"
        );
    }

    #[test]
    fn averages_show_na_for_empty_metrics() {
        let dataset = dataset();
        let averages_result = query::averages_for_country(&dataset, "USA");
        let text = averages("USA", averages_result.as_ref());
        assert!(text.starts_with("Averages for USA over 1 rows:\n"));
        assert!(text.contains("  Avg CO2: 5000 (1 values)\n"));
        assert!(text.contains("  Avg GDP: NA (0 values)\n"));
    }

    #[test]
    fn json_output_uses_null_for_missing_values() {
        let dataset = dataset();
        let json = to_json(&query::search_country(&dataset, "Peru")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["outcome"], "found");
        assert!(value["records"][0]["co2"].is_null());
    }
}
