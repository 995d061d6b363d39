//! Header detection for the six logical climate fields.
//!
//! Column order in the input is not fixed. Each logical field is located by a
//! case-insensitive exact match against a list of accepted names first, and
//! only if no header cell matches exactly, by substring containment against a
//! shorter keyword list.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Country,
    Year,
    TemperatureAnomaly,
    Co2,
    Gdp,
    ExtremeEvents,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Country,
        Field::Year,
        Field::TemperatureAnomaly,
        Field::Co2,
        Field::Gdp,
        Field::ExtremeEvents,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Country => "country",
            Field::Year => "year",
            Field::TemperatureAnomaly => "temp",
            Field::Co2 => "co2",
            Field::Gdp => "gdp",
            Field::ExtremeEvents => "extreme",
        }
    }

    pub fn is_mandatory(self) -> bool {
        matches!(self, Field::Country | Field::Year)
    }

    fn exact_names(self) -> &'static [&'static str] {
        match self {
            Field::Country => &["country", "country_name", "entity", "nation"],
            Field::Year => &["year"],
            Field::TemperatureAnomaly => {
                &["temperature_anomaly", "temp_anomaly", "temperature anomaly"]
            }
            Field::Co2 => &["co2", "co2_emissions", "co2 emissions", "total co2 emissions"],
            Field::Gdp => &["gdp", "gdp (current us$)", "gdp_current_usd"],
            Field::ExtremeEvents => &[
                "extreme_weather_events",
                "extreme events",
                "extreme weather events",
                "natural_disasters",
                "disaster_count",
            ],
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Field::Country => &["country"],
            Field::Year => &["year"],
            Field::TemperatureAnomaly => &["anomaly", "temp"],
            Field::Co2 => &["co2"],
            Field::Gdp => &["gdp"],
            Field::ExtremeEvents => &["extreme", "disaster"],
        }
    }
}

/// Zero-based column positions of the logical fields; `None` when a field
/// could not be located.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ColumnMap {
    pub country: Option<usize>,
    pub year: Option<usize>,
    pub temperature_anomaly: Option<usize>,
    pub co2: Option<usize>,
    pub gdp: Option<usize>,
    pub extreme_events: Option<usize>,
}

impl ColumnMap {
    pub fn get(&self, field: Field) -> Option<usize> {
        match field {
            Field::Country => self.country,
            Field::Year => self.year,
            Field::TemperatureAnomaly => self.temperature_anomaly,
            Field::Co2 => self.co2,
            Field::Gdp => self.gdp,
            Field::ExtremeEvents => self.extreme_events,
        }
    }

    fn set(&mut self, field: Field, position: Option<usize>) {
        let slot = match field {
            Field::Country => &mut self.country,
            Field::Year => &mut self.year,
            Field::TemperatureAnomaly => &mut self.temperature_anomaly,
            Field::Co2 => &mut self.co2,
            Field::Gdp => &mut self.gdp,
            Field::ExtremeEvents => &mut self.extreme_events,
        };
        *slot = position;
    }

    /// True when every mandatory field (country, year) was found.
    pub fn is_complete(&self) -> bool {
        Field::ALL
            .iter()
            .filter(|field| field.is_mandatory())
            .all(|field| self.get(*field).is_some())
    }

    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| self.get(*field).is_none())
            .collect()
    }
}

impl fmt::Display for ColumnMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, field) in Field::ALL.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            match self.get(*field) {
                Some(position) => write!(f, "{}={position}", field.label())?,
                None => write!(f, "{}=not found", field.label())?,
            }
        }
        Ok(())
    }
}

pub fn detect(headers: &[String]) -> ColumnMap {
    let normalized = headers
        .iter()
        .map(|header| header.trim().to_lowercase())
        .collect::<Vec<_>>();
    let mut map = ColumnMap::default();
    for field in Field::ALL {
        map.set(field, find_column(&normalized, field));
    }
    map
}

fn find_column(normalized: &[String], field: Field) -> Option<usize> {
    normalized
        .iter()
        .position(|header| field.exact_names().contains(&header.as_str()))
        .or_else(|| {
            normalized.iter().position(|header| {
                field
                    .keywords()
                    .iter()
                    .any(|keyword| header.contains(keyword))
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn detect_prefers_exact_names() {
        let map = detect(&headers(&[
            "Country",
            "Year",
            "TempAnomaly",
            "CO2",
            "GDP",
            "Disasters",
        ]));
        assert_eq!(map.country, Some(0));
        assert_eq!(map.year, Some(1));
        assert_eq!(map.temperature_anomaly, Some(2));
        assert_eq!(map.co2, Some(3));
        assert_eq!(map.gdp, Some(4));
        assert_eq!(map.extreme_events, Some(5));
        assert!(map.is_complete());
    }

    #[test]
    fn exact_match_beats_earlier_substring_match() {
        let map = detect(&headers(&["Country Code", " Entity ", "Year"]));
        assert_eq!(map.country, Some(1));
    }

    #[test]
    fn substring_pass_takes_first_matching_column() {
        let map = detect(&headers(&[
            "Reporting Country",
            "Fiscal Year",
            "Mean Temp",
            "Surface Anomaly",
            "CO2 (Mt)",
            "GDP per capita",
            "Extreme heat days",
        ]));
        assert_eq!(map.country, Some(0));
        assert_eq!(map.year, Some(1));
        assert_eq!(map.temperature_anomaly, Some(2));
        assert_eq!(map.co2, Some(4));
        assert_eq!(map.gdp, Some(5));
        assert_eq!(map.extreme_events, Some(6));
    }

    #[test]
    fn missing_optional_fields_are_reported_but_not_fatal() {
        let map = detect(&headers(&["nation", "year"]));
        assert!(map.is_complete());
        assert_eq!(
            map.missing_fields(),
            vec![Field::TemperatureAnomaly, Field::Co2, Field::Gdp, Field::ExtremeEvents]
        );
    }

    #[test]
    fn display_lists_every_field() {
        let map = detect(&headers(&["region", "year", "co2"]));
        assert!(!map.is_complete());
        assert_eq!(
            map.to_string(),
            "country=not found year=1 temp=not found co2=2 gdp=not found extreme=not found"
        );
    }
}
