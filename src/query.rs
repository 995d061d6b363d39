//! Read-only queries over an indexed [`Dataset`].
//!
//! Every query returns structured data that borrows records from the dataset.
//! "Nothing found" outcomes are ordinary variants, not errors, so a front end
//! can render them as informational messages.
//!
//! Rankings sort record positions through [`sort::sort_indices_by`], which is
//! not stable, so each ranking predicate carries its own tie-break:
//! country name then record position for the CO2 and extreme-event rankings,
//! record position (input order) for the per-year metric ranking.

use std::{cmp::Ordering, collections::HashSet};

use serde::Serialize;

use crate::{
    data::{RankMetric, Record},
    dataset::Dataset,
    sort::{self, SortDirection},
};

pub const DEFAULT_TOP_N: usize = 10;
pub const RANKING_DISPLAY_LIMIT: usize = 50;
pub const EXTREMES_COUNT: usize = 5;

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CountrySearch<'a> {
    Found {
        country: &'a str,
        records: Vec<&'a Record>,
    },
    Suggestions {
        query: String,
        names: Vec<&'a str>,
    },
    NoMatch {
        query: String,
    },
}

#[derive(Debug, Serialize)]
pub struct YearRange<'a> {
    pub start: i32,
    pub end: i32,
    pub records: Vec<&'a Record>,
}

impl YearRange<'_> {
    pub fn count(&self) -> usize {
        self.records.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryTotal<'a> {
    pub country: &'a str,
    pub total: i64,
    pub records: usize,
}

#[derive(Debug, Default, Serialize)]
pub struct ExtremeEventsRanking<'a> {
    pub lowest: Vec<CountryTotal<'a>>,
    pub highest: Vec<CountryTotal<'a>>,
}

impl ExtremeEventsRanking<'_> {
    pub fn is_empty(&self) -> bool {
        self.lowest.is_empty() && self.highest.is_empty()
    }
}

#[derive(Debug, Serialize)]
pub struct RankedRecord<'a> {
    pub rank: usize,
    pub value: f64,
    pub record: &'a Record,
}

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum YearRanking<'a> {
    UnknownYear {
        year: i32,
    },
    NoValues {
        year: i32,
    },
    Ranked {
        year: i32,
        entries: Vec<RankedRecord<'a>>,
        total: usize,
        truncated: bool,
    },
}

impl<'a> YearRanking<'a> {
    pub fn entries(&self) -> &[RankedRecord<'a>] {
        match self {
            YearRanking::Ranked { entries, .. } => entries,
            _ => &[],
        }
    }
}

/// Mean of the present values of one metric, with the number of values that
/// contributed. `mean` is NaN when `count` is zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricAverage {
    pub mean: f64,
    pub count: usize,
}

impl MetricAverage {
    fn from_values(values: impl Iterator<Item = Option<f64>>) -> Self {
        let (sum, count) = values
            .flatten()
            .filter(|value| !value.is_nan())
            .fold((0.0f64, 0usize), |(sum, count), value| (sum + value, count + 1));
        let mean = if count == 0 { f64::NAN } else { sum / count as f64 };
        MetricAverage { mean, count }
    }

    pub fn value(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }
}

#[derive(Debug, Serialize)]
pub struct CountryAverages<'a> {
    pub country: &'a str,
    pub rows: usize,
    pub temperature_anomaly: MetricAverage,
    pub co2: MetricAverage,
    pub gdp: MetricAverage,
    pub extreme_events: MetricAverage,
}

/// Exact lookup, falling back to case-insensitive name suggestions.
pub fn search_country<'a>(dataset: &'a Dataset, name: &str) -> CountrySearch<'a> {
    if let Some(bucket) = dataset.country_bucket(name) {
        let records = bucket
            .iter()
            .map(|&position| dataset.record(position))
            .collect::<Vec<_>>();
        let country = records
            .first()
            .map(|record| record.country.as_str())
            .unwrap_or_default();
        return CountrySearch::Found { country, records };
    }

    let needle = name.to_lowercase();
    let names = dataset
        .country_names()
        .iter()
        .filter(|candidate| candidate.to_lowercase().contains(&needle))
        .map(String::as_str)
        .collect::<Vec<_>>();
    if names.is_empty() {
        CountrySearch::NoMatch {
            query: name.to_string(),
        }
    } else {
        CountrySearch::Suggestions {
            query: name.to_string(),
            names,
        }
    }
}

/// Records whose year lies in the inclusive range, in input order. The bounds
/// may be given in either order.
pub fn search_year_range(dataset: &Dataset, y1: i32, y2: i32) -> YearRange<'_> {
    let (start, end) = if y1 > y2 { (y2, y1) } else { (y1, y2) };
    let records = dataset
        .records()
        .iter()
        .filter(|record| record.year.is_some_and(|year| (start..=end).contains(&year)))
        .collect();
    YearRange {
        start,
        end,
        records,
    }
}

/// Countries with the lowest and highest total extreme events. Missing
/// counts contribute zero.
pub fn extreme_events_extremes(dataset: &Dataset) -> ExtremeEventsRanking<'_> {
    let totals = dataset
        .countries()
        .map(|(country, bucket)| CountryTotal {
            country,
            total: bucket
                .iter()
                .filter_map(|&position| dataset.record(position).extreme_events)
                .fold(0i64, i64::saturating_add),
            records: bucket.len(),
        })
        .collect::<Vec<_>>();
    if totals.is_empty() {
        return ExtremeEventsRanking::default();
    }

    let by_total = |direction: SortDirection| {
        let mut order = (0..totals.len()).collect::<Vec<_>>();
        sort::sort_indices_by(&mut order, |a, b| {
            let (left, right) = (&totals[a], &totals[b]);
            let primary = match direction {
                SortDirection::Asc => left.total.cmp(&right.total),
                SortDirection::Desc => right.total.cmp(&left.total),
            };
            primary.then_with(|| left.country.cmp(right.country)) == Ordering::Less
        });
        order
            .into_iter()
            .take(EXTREMES_COUNT)
            .map(|idx| totals[idx].clone())
            .collect::<Vec<_>>()
    };

    ExtremeEventsRanking {
        lowest: by_total(SortDirection::Asc),
        highest: by_total(SortDirection::Desc),
    }
}

/// The `n` largest CO2 values recorded in `year`; `n <= 0` means
/// [`DEFAULT_TOP_N`]. Records without CO2 are not candidates.
pub fn top_n_co2(dataset: &Dataset, year: i32, n: i64) -> YearRanking<'_> {
    let limit = usize::try_from(n)
        .ok()
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_TOP_N);
    let Some(bucket) = dataset.year_bucket(year) else {
        return YearRanking::UnknownYear { year };
    };
    let co2 = |position: usize| dataset.record(position).co2.filter(|v| !v.is_nan());

    let mut candidates = bucket
        .iter()
        .copied()
        .filter(|&position| co2(position).is_some())
        .collect::<Vec<_>>();
    if candidates.is_empty() {
        return YearRanking::NoValues { year };
    }

    sort::sort_indices_by(&mut candidates, |a, b| {
        sort::missing_last(co2(a), co2(b), SortDirection::Desc)
            .then_with(|| dataset.record(a).country.cmp(&dataset.record(b).country))
            .then(a.cmp(&b))
            == Ordering::Less
    });
    ranked(dataset, year, candidates, limit, co2)
}

/// One entry per country for `year` (its first record there with a value
/// for `metric`), ranked by that value. Output is capped at
/// [`RANKING_DISPLAY_LIMIT`] entries.
pub fn sort_metric_for_year(
    dataset: &Dataset,
    year: i32,
    metric: RankMetric,
    direction: SortDirection,
) -> YearRanking<'_> {
    let Some(bucket) = dataset.year_bucket(year) else {
        return YearRanking::UnknownYear { year };
    };
    let value = |position: usize| dataset.record(position).metric(metric).filter(|v| !v.is_nan());

    let mut seen = HashSet::new();
    let mut candidates = bucket
        .iter()
        .copied()
        .filter(|&position| {
            value(position).is_some() && seen.insert(dataset.record(position).country.as_str())
        })
        .collect::<Vec<_>>();
    if candidates.is_empty() {
        return YearRanking::NoValues { year };
    }

    sort::sort_indices_by(&mut candidates, |a, b| {
        sort::missing_last(value(a), value(b), direction).then(a.cmp(&b)) == Ordering::Less
    });
    ranked(dataset, year, candidates, RANKING_DISPLAY_LIMIT, value)
}

/// Per-metric means for a country, each over its own present values.
/// Returns `None` for an unknown country.
pub fn averages_for_country<'a>(dataset: &'a Dataset, name: &str) -> Option<CountryAverages<'a>> {
    let bucket = dataset.country_bucket(name)?;
    let records = move || bucket.iter().map(move |&position| dataset.record(position));
    Some(CountryAverages {
        country: records().next()?.country.as_str(),
        rows: bucket.len(),
        temperature_anomaly: MetricAverage::from_values(records().map(|r| r.temperature_anomaly)),
        co2: MetricAverage::from_values(records().map(|r| r.co2)),
        gdp: MetricAverage::from_values(records().map(|r| r.gdp)),
        extreme_events: MetricAverage::from_values(
            records().map(|r| r.extreme_events.map(|count| count as f64)),
        ),
    })
}

fn ranked<'a, F>(
    dataset: &'a Dataset,
    year: i32,
    order: Vec<usize>,
    limit: usize,
    value: F,
) -> YearRanking<'a>
where
    F: Fn(usize) -> Option<f64>,
{
    let total = order.len();
    let entries = order
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(idx, position)| RankedRecord {
            rank: idx + 1,
            value: value(position).unwrap_or(f64::NAN),
            record: dataset.record(position),
        })
        .collect();
    YearRanking::Ranked {
        year,
        entries,
        total,
        truncated: total > limit,
    }
}
