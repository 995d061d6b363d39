//! Interactive menu over a loaded dataset.
//!
//! The shell only reads choices and arguments, calls into [`crate::query`],
//! and writes the rendered result. It is generic over its input and output
//! so it can be driven from in-memory buffers.

use std::{
    io::{self, BufRead, Write},
    str::FromStr,
};

use log::debug;

use crate::{
    data::RankMetric,
    dataset::Dataset,
    query::{self, DEFAULT_TOP_N},
    render,
    sort::SortDirection,
};

const MENU: &str = "\n=== Climate Query Menu ===
1) Search by Country
2) Search by Year Range
3) Highest/Lowest Extreme Events (overall)
4) Top-N CO2 Emitters in a Year
5) Sort by Temperature Anomaly for a Year (asc/desc)
6) Sort by GDP for a Year (asc/desc)
7) Averages for a Country
0) Quit
Choice: ";

pub struct Shell<'d, R, W> {
    dataset: &'d Dataset,
    input: R,
    output: W,
}

impl<'d, R: BufRead, W: Write> Shell<'d, R, W> {
    pub fn new(dataset: &'d Dataset, input: R, output: W) -> Self {
        Shell {
            dataset,
            input,
            output,
        }
    }

    /// Runs until the user picks `0` or input ends.
    pub fn run(&mut self) -> io::Result<()> {
        while let Some(choice) = self.prompt_line(MENU)? {
            debug!("Menu choice '{choice}'");
            let keep_going = match choice.parse::<u8>() {
                Ok(0) => break,
                Ok(1) => self.search_country()?,
                Ok(2) => self.search_year_range()?,
                Ok(3) => {
                    let text = render::extremes(&query::extreme_events_extremes(self.dataset));
                    self.write(&text)?
                }
                Ok(4) => self.top_co2()?,
                Ok(5) => self.rank(RankMetric::TemperatureAnomaly)?,
                Ok(6) => self.rank(RankMetric::Gdp)?,
                Ok(7) => self.averages()?,
                _ => self.write("Invalid choice.\n")?,
            };
            if !keep_going {
                break;
            }
        }
        writeln!(self.output, "Bye.")?;
        self.output.flush()
    }

    fn search_country(&mut self) -> io::Result<bool> {
        let Some(name) = self.prompt_line("Enter Country: ")? else {
            return Ok(false);
        };
        let text = render::country_search(&query::search_country(self.dataset, &name));
        self.write(&text)
    }

    fn search_year_range(&mut self) -> io::Result<bool> {
        let Some(start) = self.prompt_number::<i32>("Start year: ")? else {
            return Ok(false);
        };
        let Some(end) = self.prompt_number::<i32>("End year: ")? else {
            return Ok(false);
        };
        let text = render::year_range(&query::search_year_range(self.dataset, start, end));
        self.write(&text)
    }

    fn top_co2(&mut self) -> io::Result<bool> {
        let Some(year) = self.prompt_number::<i32>("Year: ")? else {
            return Ok(false);
        };
        let Some(n) = self.prompt_number::<i64>("Top N: ")? else {
            return Ok(false);
        };
        let shown = usize::try_from(n)
            .ok()
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_TOP_N);
        let text = render::top_co2(&query::top_n_co2(self.dataset, year, n), shown);
        self.write(&text)
    }

    fn rank(&mut self, metric: RankMetric) -> io::Result<bool> {
        let Some(year) = self.prompt_number::<i32>("Year: ")? else {
            return Ok(false);
        };
        let Some(ascending) = self.prompt_number::<i32>("Ascending? (1=yes,0=no): ")? else {
            return Ok(false);
        };
        let direction = SortDirection::from_ascending(ascending == 1);
        let ranking = query::sort_metric_for_year(self.dataset, year, metric, direction);
        let text = render::metric_ranking(&ranking, metric, direction);
        self.write(&text)
    }

    fn averages(&mut self) -> io::Result<bool> {
        let Some(name) = self.prompt_line("Country: ")? else {
            return Ok(false);
        };
        let averages = query::averages_for_country(self.dataset, &name);
        let text = render::averages(&name, averages.as_ref());
        self.write(&text)
    }

    fn write(&mut self, text: &str) -> io::Result<bool> {
        self.output.write_all(text.as_bytes())?;
        Ok(true)
    }

    /// Writes `prompt` and reads one trimmed line; `None` at end of input.
    fn prompt_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.output.write_all(prompt.as_bytes())?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt_number<T: FromStr>(&mut self, prompt: &str) -> io::Result<Option<T>> {
        loop {
            let Some(text) = self.prompt_line(prompt)? else {
                return Ok(None);
            };
            match text.parse() {
                Ok(value) => return Ok(Some(value)),
                Err(_) => writeln!(self.output, "Please enter a whole number.")?,
            }
        }
    }
}
