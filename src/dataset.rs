//! The memory-resident record store and its secondary indexes.
//!
//! Records live in one append-only `Vec`; a record's position is its identity.
//! The indexes hold positions only:
//!
//! - `by_country`: positions per country, ordered by year ascending with
//!   missing years last (stable for ties).
//! - `by_year`: positions per present year, in input order.
//! - `country_names`: distinct countries in first-seen order.

use std::{
    collections::{BTreeMap, HashMap},
    io::BufRead,
    path::Path,
};

use encoding_rs::{Encoding, UTF_8};
use log::{debug, info};
use serde::Serialize;

use crate::{
    data::Record,
    error::{CoerceError, LoadError},
    fields::{self, FieldParser},
    io_utils,
    schema::{self, ColumnMap, Field},
    sort,
};

#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub delimiter: u8,
    pub encoding: &'static Encoding,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            delimiter: io_utils::DEFAULT_CSV_DELIMITER,
            encoding: UTF_8,
        }
    }
}

/// Counters collected while loading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub columns: ColumnMap,
    pub lines_read: usize,
    pub blank_lines: usize,
    pub retained_records: usize,
    pub dropped_records: usize,
    pub degraded_cells: usize,
    pub degraded_lines: usize,
    pub countries: usize,
}

#[derive(Debug, Default)]
pub struct Dataset {
    records: Vec<Record>,
    by_country: HashMap<String, Vec<usize>>,
    by_year: BTreeMap<i32, Vec<usize>>,
    country_names: Vec<String>,
    report: LoadReport,
}

impl Dataset {
    pub fn load(path: &Path, options: &LoadOptions) -> Result<Self, LoadError> {
        let reader = io_utils::open_input(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(reader, options)
    }

    pub fn from_reader<R: BufRead>(mut reader: R, options: &LoadOptions) -> Result<Self, LoadError> {
        let parser = FieldParser::new(options.delimiter);
        let mut buffer = Vec::new();

        if reader.read_until(b'\n', &mut buffer)? == 0 {
            return Err(LoadError::Empty);
        }
        let (header, had_errors) = decode_line(&buffer, options.encoding, true);
        if had_errors {
            debug!("Header: invalid {} bytes replaced", options.encoding.name());
        }
        let columns = schema::detect(&parser.parse_line(&header));
        if !columns.is_complete() {
            return Err(LoadError::MissingColumns { columns });
        }
        debug!("Detected columns: {columns}");

        let mut report = LoadReport {
            columns,
            ..LoadReport::default()
        };
        let mut records = Vec::new();
        let mut line_number = 1usize;

        loop {
            buffer.clear();
            if reader.read_until(b'\n', &mut buffer)? == 0 {
                break;
            }
            line_number += 1;
            report.lines_read += 1;
            let (line, had_errors) = decode_line(&buffer, options.encoding, false);
            if had_errors {
                debug!(
                    "Line {line_number}: invalid {} bytes replaced",
                    options.encoding.name()
                );
                report.degraded_lines += 1;
            }
            if line.trim().is_empty() {
                report.blank_lines += 1;
                continue;
            }
            let cells = parser.parse_line(&line);
            match build_record(&cells, &columns, line_number, &mut report) {
                Some(record) => records.push(record),
                None => {
                    debug!("Line {line_number}: empty country, record dropped");
                    report.dropped_records += 1;
                }
            }
        }

        let mut dataset = Dataset {
            records,
            report,
            ..Dataset::default()
        };
        dataset.index();
        dataset.report.retained_records = dataset.records.len();
        dataset.report.countries = dataset.country_names.len();
        info!("Loaded {} rows.", dataset.records.len());
        info!("Countries detected: {}", dataset.country_names.len());
        if dataset.report.degraded_lines > 0 {
            info!(
                "{} line(s) with invalid {} bytes kept with replacement characters",
                dataset.report.degraded_lines,
                options.encoding.name()
            );
        }
        if dataset.report.degraded_cells > 0 {
            info!(
                "{} malformed numeric cell(s) treated as missing",
                dataset.report.degraded_cells
            );
        }
        Ok(dataset)
    }

    /// Builds an indexed dataset from already-typed records, dropping any
    /// whose country is blank.
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let mut report = LoadReport::default();
        let records = records
            .into_iter()
            .filter_map(|mut record| {
                let trimmed = record.country.trim();
                if trimmed.is_empty() {
                    report.dropped_records += 1;
                    return None;
                }
                if trimmed.len() != record.country.len() {
                    record.country = trimmed.to_string();
                }
                Some(record)
            })
            .collect::<Vec<_>>();
        let mut dataset = Dataset {
            records,
            report,
            ..Dataset::default()
        };
        dataset.index();
        dataset.report.retained_records = dataset.records.len();
        dataset.report.countries = dataset.country_names.len();
        dataset
    }

    /// Rebuilds every index from the record store.
    pub fn index(&mut self) {
        self.by_country.clear();
        self.by_year.clear();
        self.country_names.clear();

        for (position, record) in self.records.iter().enumerate() {
            match self.by_country.get_mut(&record.country) {
                Some(bucket) => bucket.push(position),
                None => {
                    self.country_names.push(record.country.clone());
                    self.by_country
                        .insert(record.country.clone(), vec![position]);
                }
            }
            if let Some(year) = record.year {
                self.by_year.entry(year).or_default().push(position);
            }
        }

        let records = &self.records;
        for bucket in self.by_country.values_mut() {
            bucket.sort_by(|&a, &b| sort::year_missing_last(records[a].year, records[b].year));
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, position: usize) -> &Record {
        &self.records[position]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn country_bucket(&self, country: &str) -> Option<&[usize]> {
        self.by_country.get(country).map(Vec::as_slice)
    }

    pub fn year_bucket(&self, year: i32) -> Option<&[usize]> {
        self.by_year.get(&year).map(Vec::as_slice)
    }

    /// Country buckets in first-seen country order.
    pub fn countries(&self) -> impl Iterator<Item = (&str, &[usize])> + '_ {
        self.country_names.iter().map(|name| {
            let bucket = self
                .by_country
                .get(name)
                .map(Vec::as_slice)
                .unwrap_or_default();
            (name.as_str(), bucket)
        })
    }

    pub fn country_names(&self) -> &[String] {
        &self.country_names
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.by_year.keys().copied()
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }
}

fn decode_line(raw: &[u8], encoding: &'static Encoding, sniff_bom: bool) -> (String, bool) {
    io_utils::decode_lossy(io_utils::trim_line_terminator(raw), encoding, sniff_bom)
}

fn build_record(
    cells: &[String],
    columns: &ColumnMap,
    line: usize,
    report: &mut LoadReport,
) -> Option<Record> {
    let cell = |field: Field| {
        columns
            .get(field)
            .and_then(|position| cells.get(position))
            .map(String::as_str)
            .unwrap_or("")
    };

    let country = cell(Field::Country).trim();
    if country.is_empty() {
        return None;
    }

    let mut absorb = |field: Field, error: CoerceError| {
        debug!("Line {line}: {} treated as missing ({error})", field.label());
        report.degraded_cells += 1;
    };

    let mut record = Record::new(country);
    record.year = fields::coerce_year(cell(Field::Year)).unwrap_or_else(|err| {
        absorb(Field::Year, err);
        None
    });
    for field in [Field::TemperatureAnomaly, Field::Co2, Field::Gdp] {
        if columns.get(field).is_none() {
            continue;
        }
        let value = fields::coerce_real(cell(field)).unwrap_or_else(|err| {
            absorb(field, err);
            None
        });
        match field {
            Field::TemperatureAnomaly => record.temperature_anomaly = value,
            Field::Co2 => record.co2 = value,
            _ => record.gdp = value,
        }
    }
    if columns.extreme_events.is_some() {
        record.extreme_events = fields::coerce_int(cell(Field::ExtremeEvents)).unwrap_or_else(|err| {
            absorb(Field::ExtremeEvents, err);
            None
        });
    }
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(text: &str) -> Result<Dataset, LoadError> {
        Dataset::from_reader(text.as_bytes(), &LoadOptions::default())
    }

    #[test]
    fn load_reads_rows_in_any_column_order() {
        let dataset = load("GDP,Year,Entity\n10,2001,Chad\n20,2002,Chad\n").unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.record(0).country, "Chad");
        assert_eq!(dataset.record(1).gdp, Some(20.0));
        assert_eq!(dataset.record(1).co2, None);
        assert_eq!(dataset.report().countries, 1);
    }

    #[test]
    fn load_fails_without_identity_columns() {
        let err = load("Region,Year,CO2\nx,2001,1\n").unwrap_err();
        match err {
            LoadError::MissingColumns { columns } => {
                assert_eq!(columns.country, None);
                assert_eq!(columns.year, Some(1));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn load_fails_on_empty_input() {
        assert!(matches!(load(""), Err(LoadError::Empty)));
    }

    #[test]
    fn load_skips_blank_lines_and_blank_countries() {
        let dataset = load("country,year\r\nPeru,2000\r\n\r\n  ,2001\r\n   \n\"\",2002\nPeru,2003\n").unwrap();
        assert_eq!(dataset.len(), 2);
        let report = dataset.report();
        assert_eq!(report.blank_lines, 2);
        assert_eq!(report.dropped_records, 2);
        assert_eq!(report.retained_records, 2);
    }

    #[test]
    fn malformed_cells_degrade_to_missing() {
        let dataset = load("country,year,co2,disasters\nPeru,abc,x1,3\nPeru,2001,4.5,lots\n").unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.record(0).year, None);
        assert_eq!(dataset.record(0).co2, None);
        assert_eq!(dataset.record(0).extreme_events, Some(3));
        assert_eq!(dataset.record(1).extreme_events, None);
        assert_eq!(dataset.report().degraded_cells, 3);
    }

    #[test]
    fn short_rows_read_missing_cells() {
        let dataset = load("country,year,gdp\nPeru\n").unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.record(0).year, None);
        assert_eq!(dataset.record(0).gdp, None);
        assert_eq!(dataset.report().degraded_cells, 0);
    }

    #[test]
    fn country_buckets_sort_by_year_with_missing_last() {
        let dataset = load("country,year\nA,2003\nA,\nA,2001\nB,1990\nA,2001\nA,NA\n").unwrap();
        assert_eq!(dataset.country_bucket("A"), Some(&[2, 4, 0, 1, 5][..]));
        assert_eq!(dataset.country_bucket("B"), Some(&[3][..]));
        assert_eq!(dataset.country_names(), &["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn year_buckets_exclude_missing_years() {
        let dataset = load("country,year\nA,2001\nB,\nC,2001\nD,1999\n").unwrap();
        assert_eq!(dataset.year_bucket(2001), Some(&[0, 2][..]));
        assert_eq!(dataset.years().collect::<Vec<_>>(), vec![1999, 2001]);
        assert_eq!(dataset.year_bucket(2050), None);
    }

    #[test]
    fn index_is_idempotent() {
        let mut dataset = load("country,year\nA,2\nA,1\n").unwrap();
        dataset.index();
        assert_eq!(dataset.country_bucket("A"), Some(&[1, 0][..]));
        assert_eq!(dataset.country_names().len(), 1);
    }

    #[test]
    fn from_records_trims_and_drops_blank_countries() {
        let dataset = Dataset::from_records([Record::new(" Fiji "), Record::new("   ")]);
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.record(0).country, "Fiji");
        assert_eq!(dataset.report().dropped_records, 1);
    }

    #[test]
    fn load_honours_delimiter_and_encoding() {
        let options = LoadOptions {
            delimiter: b'\t',
            encoding: encoding_rs::WINDOWS_1252,
        };
        let bytes = b"country\tyear\nCura\xe7ao\t2010\n";
        let dataset = Dataset::from_reader(&bytes[..], &options).unwrap();
        assert_eq!(dataset.record(0).country, "Cura\u{e7}ao");
    }

    #[test]
    fn invalid_utf8_lines_are_kept_with_replacement() {
        let bytes = b"Country,Year,CO2\nUSA,2020,5000\nC\xf4te d'Ivoire,2020,10\nPeru,2020,7\n";
        let dataset = Dataset::from_reader(&bytes[..], &LoadOptions::default()).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.record(1).country, "C\u{fffd}te d'Ivoire");
        assert_eq!(dataset.record(1).co2, Some(10.0));
        assert_eq!(dataset.record(2).country, "Peru");
        assert_eq!(dataset.report().degraded_lines, 1);
        assert_eq!(dataset.report().degraded_cells, 0);
    }

    #[test]
    fn undecodable_header_still_detects_columns() {
        let bytes = b"\xefcountry,year\nA,2000\n";
        let dataset = Dataset::from_reader(&bytes[..], &LoadOptions::default()).unwrap();
        assert_eq!(dataset.record(0).year, Some(2000));
    }

    #[test]
    fn space_before_quoted_fields_keeps_columns_aligned() {
        let dataset = load(
            "Country, Year, CO2\nChile, \"2020\", 80\nKorea, \"Republic, of\",2020,600\nX \"a,b\" Y,2020,1\n",
        )
        .unwrap();
        assert_eq!(dataset.record(0).year, Some(2020));
        assert_eq!(dataset.record(0).co2, Some(80.0));
        assert_eq!(dataset.record(1).country, "Korea");
        assert_eq!(dataset.record(2).country, "X a,b Y");
        assert_eq!(dataset.record(2).year, Some(2020));
        assert_eq!(dataset.record(2).co2, Some(1.0));
    }
}
