//! Congestion factor calculator.
//!
//! A single [`CongestionTable`] drives both the survey insight engine and the
//! `/api/commute-estimate` endpoint. The built-in table can be replaced by a
//! JSON override file named in `config.toml`.

use crate::survey::{Frequency, SurveyAnswers, TimeOfDay, TravelMode};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Free-flow time never drops below this many minutes.
pub const MIN_FREE_FLOW_MINUTES: u32 = 5;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimeOfDayOffsets {
    pub morning: f64,
    pub afternoon: f64,
    pub evening: f64,
    pub night: f64,
    pub unset: f64,
}

impl Default for TimeOfDayOffsets {
    fn default() -> Self {
        Self {
            morning: 0.10,
            afternoon: 0.05,
            evening: 0.12,
            night: 0.01,
            unset: 0.03,
        }
    }
}

impl TimeOfDayOffsets {
    fn offset(&self, time_of_day: Option<TimeOfDay>) -> f64 {
        match time_of_day {
            Some(TimeOfDay::Morning) => self.morning,
            Some(TimeOfDay::Afternoon) => self.afternoon,
            Some(TimeOfDay::Evening) => self.evening,
            Some(TimeOfDay::Night) => self.night,
            None => self.unset,
        }
    }

    fn values(&self) -> [f64; 5] {
        [
            self.morning,
            self.afternoon,
            self.evening,
            self.night,
            self.unset,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModeOffsets {
    pub car: f64,
    pub ride_share: f64,
    pub two_wheeler: f64,
    pub public: f64,
    pub walking: f64,
    pub unset: f64,
}

impl Default for ModeOffsets {
    fn default() -> Self {
        Self {
            car: 0.06,
            ride_share: 0.05,
            two_wheeler: 0.03,
            public: 0.04,
            walking: -0.12,
            unset: 0.02,
        }
    }
}

impl ModeOffsets {
    fn offset(&self, mode: Option<TravelMode>) -> f64 {
        match mode {
            Some(TravelMode::Car) => self.car,
            Some(TravelMode::RideShare) => self.ride_share,
            Some(TravelMode::TwoWheeler) => self.two_wheeler,
            Some(TravelMode::Public) => self.public,
            Some(TravelMode::Walking) => self.walking,
            None => self.unset,
        }
    }

    fn values(&self) -> [f64; 6] {
        [
            self.car,
            self.ride_share,
            self.two_wheeler,
            self.public,
            self.walking,
            self.unset,
        ]
    }
}

/// A known high-congestion city. Matching is a case-insensitive substring
/// test against any alias.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CityOffset {
    pub aliases: Vec<String>,
    pub offset: f64,
}

impl CityOffset {
    fn new(aliases: &[&str], offset: f64) -> Self {
        Self {
            aliases: aliases.iter().map(|alias| alias.to_string()).collect(),
            offset,
        }
    }

    fn matches(&self, city_lower: &str) -> bool {
        self.aliases
            .iter()
            .any(|alias| city_lower.contains(&alias.to_lowercase()))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CongestionTable {
    pub baseline: f64,
    pub time_of_day: TimeOfDayOffsets,
    pub mode: ModeOffsets,
    /// Checked in order; the first matching entry wins.
    pub cities: Vec<CityOffset>,
    /// Applied to any non-blank city that matches no entry.
    pub other_city: f64,
    /// Subtracted for occasional commuters.
    pub occasional_discount: f64,
    pub min_factor: f64,
    pub max_factor: f64,
    /// Share of the congestion factor removed from the reported duration to
    /// obtain free-flow time.
    pub free_flow_weight: f64,
}

impl Default for CongestionTable {
    fn default() -> Self {
        Self {
            baseline: 0.24,
            time_of_day: TimeOfDayOffsets::default(),
            mode: ModeOffsets::default(),
            cities: vec![
                CityOffset::new(&["bengaluru", "bangalore"], 0.12),
                CityOffset::new(&["mumbai"], 0.10),
                CityOffset::new(&["delhi"], 0.11),
                CityOffset::new(&["hyderabad", "chennai"], 0.07),
                CityOffset::new(&["pune", "kolkata"], 0.06),
            ],
            other_city: 0.05,
            occasional_discount: 0.03,
            min_factor: 0.08,
            max_factor: 0.6,
            free_flow_weight: 0.65,
        }
    }
}

/// The subset of survey answers that feeds the congestion factor.
#[derive(Debug, Clone, Copy)]
pub struct CongestionInputs<'a> {
    pub city: &'a str,
    pub time_of_day: Option<TimeOfDay>,
    pub mode: Option<TravelMode>,
    pub frequency: Option<Frequency>,
}

impl<'a> From<&'a SurveyAnswers> for CongestionInputs<'a> {
    fn from(answers: &'a SurveyAnswers) -> Self {
        Self {
            city: &answers.city,
            time_of_day: answers.time_of_day,
            mode: answers.mode,
            frequency: answers.frequency,
        }
    }
}

impl CongestionTable {
    /// Composite congestion factor, always within `[min_factor, max_factor]`.
    pub fn factor(&self, inputs: CongestionInputs<'_>) -> f64 {
        let mut factor = self.baseline;
        factor += self.time_of_day.offset(inputs.time_of_day);
        factor += self.mode.offset(inputs.mode);
        factor += self.city_offset(inputs.city);

        if inputs.frequency == Some(Frequency::Occasionally) {
            factor -= self.occasional_discount;
        }

        factor.max(self.min_factor).min(self.max_factor)
    }

    pub fn city_offset(&self, city: &str) -> f64 {
        let city_lower = city.to_lowercase();
        if let Some(entry) = self.cities.iter().find(|entry| entry.matches(&city_lower)) {
            return entry.offset;
        }
        if city.trim().is_empty() {
            0.0
        } else {
            self.other_city
        }
    }

    /// Hypothetical travel time with no congestion.
    pub fn free_flow_minutes(&self, duration_minutes: u32, factor: f64) -> u32 {
        let multiplier = 1.0 - factor * self.free_flow_weight;
        let minutes = (duration_minutes as f64 * multiplier).round().max(0.0) as u32;
        minutes.max(MIN_FREE_FLOW_MINUTES)
    }

    pub fn validate(&self) -> Result<(), TableError> {
        let scalars = [
            self.baseline,
            self.other_city,
            self.occasional_discount,
            self.min_factor,
            self.max_factor,
            self.free_flow_weight,
        ];
        let all_finite = scalars
            .iter()
            .chain(self.time_of_day.values().iter())
            .chain(self.mode.values().iter())
            .chain(self.cities.iter().map(|entry| &entry.offset))
            .all(|value| value.is_finite());
        if !all_finite {
            return Err(TableError::Invalid("non-finite value".to_string()));
        }
        if self.min_factor > self.max_factor {
            return Err(TableError::Invalid(format!(
                "min_factor {} exceeds max_factor {}",
                self.min_factor, self.max_factor
            )));
        }
        let blank_alias = self
            .cities
            .iter()
            .any(|entry| entry.aliases.is_empty() || entry.aliases.iter().any(|a| a.trim().is_empty()));
        if blank_alias {
            return Err(TableError::Invalid("city entry with blank alias".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read congestion table: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse congestion table: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid congestion table: {0}")]
    Invalid(String),
}

pub fn load_table_from_path(path: impl AsRef<Path>) -> Result<CongestionTable, TableError> {
    let contents = std::fs::read_to_string(path)?;
    let table: CongestionTable = serde_json::from_str(&contents)?;
    table.validate()?;
    Ok(table)
}
