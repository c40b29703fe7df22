//! Congestion insight engine.
//!
//! Pure functions turning [`SurveyAnswers`] into [`CongestionInsights`]. The
//! engine holds no mutable state and is safe to share across threads.

use crate::survey::{Frequency, SurveyAnswers, TravelMode};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

pub mod congestion;
pub mod format;
pub mod narrative;

use congestion::{CongestionInputs, CongestionTable, load_table_from_path};
use narrative::{NarrativeInputs, WrappedStat, build_wrapped};

/// Wasted time per trip never drops below this many minutes.
pub const MIN_WASTED_MINUTES: u32 = 2;
pub const MIN_DISTANCE_KM: f64 = 3.0;
/// kg of CO₂ per litre of petrol burned.
pub const CO2_KG_PER_LITRE: f64 = 2.31;
pub const WEEKS_PER_YEAR: u32 = 52;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CongestionInsights {
    pub congestion_factor: f64,
    pub free_flow_minutes: u32,
    pub wasted_per_trip: u32,
    pub wasted_daily: f64,
    pub wasted_weekly: u32,
    pub wasted_yearly: u32,
    pub trips_per_week: u32,
    pub annual_trips: u32,
    pub average_speed_kmh: f64,
    pub distance_per_trip_km: f64,
    pub annual_distance_km: f64,
    pub annual_fuel_litres: f64,
    /// Fuel saved per year by skipping one trip each week.
    pub shift_savings_litres: f64,
    pub annual_tailpipe_kg: f64,
    pub annual_tailpipe_tonnes: f64,
    pub wrapped: Vec<WrappedStat>,
}

/// Single-trip figures used by the `/api/commute-estimate` endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripEstimate {
    pub congestion_factor: f64,
    pub travel_time_minutes: u32,
    pub free_flow_minutes: u32,
    pub wasted_minutes: u32,
}

#[derive(Debug, Clone, Default)]
pub struct InsightEngine {
    table: CongestionTable,
}

impl InsightEngine {
    pub fn new(table: CongestionTable) -> Self {
        Self { table }
    }

    /// Load an override table, falling back to the built-in one when the path
    /// is missing or the file cannot be used.
    pub fn from_optional_path(path: Option<&Path>) -> Self {
        match path {
            Some(path) => match load_table_from_path(path) {
                Ok(table) => {
                    info!(path = %path.display(), "Congestion table loaded");
                    Self::new(table)
                }
                Err(err) => {
                    warn!(error = %err, "Failed to load congestion table, using default");
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }

    pub fn table(&self) -> &CongestionTable {
        &self.table
    }

    pub fn estimate(&self, answers: &SurveyAnswers) -> CongestionInsights {
        let duration = answers.duration_minutes;
        let trips_per_week = trips_per_week(answers.frequency);
        let annual_trips = ((trips_per_week * WEEKS_PER_YEAR) as f64).round().max(1.0) as u32;
        let congestion_factor = self.table.factor(CongestionInputs::from(answers));

        let free_flow_minutes = self.table.free_flow_minutes(duration, congestion_factor);
        let wasted_per_trip = wasted_minutes(duration, free_flow_minutes);

        let wasted_weekly = wasted_per_trip * trips_per_week;
        let wasted_daily = if trips_per_week > 0 {
            wasted_weekly as f64 / 7.0
        } else {
            wasted_per_trip as f64
        };
        let wasted_yearly = wasted_weekly * WEEKS_PER_YEAR;

        let average_speed_kmh = average_speed_kmh(answers.mode);
        let distance_per_trip_km = (duration as f64 / 60.0 * average_speed_kmh).max(MIN_DISTANCE_KM);
        let annual_distance_km = distance_per_trip_km * annual_trips as f64;
        let shift_savings_litres = if trips_per_week > 0 {
            fuel_litres(answers.mode, distance_per_trip_km * WEEKS_PER_YEAR as f64)
        } else {
            0.0
        };
        let annual_fuel_litres = fuel_litres(answers.mode, annual_distance_km);
        let annual_tailpipe_kg = annual_fuel_litres * CO2_KG_PER_LITRE;
        let annual_tailpipe_tonnes = annual_tailpipe_kg / 1000.0;

        let wrapped = build_wrapped(&NarrativeInputs {
            mode: answers.mode,
            duration_minutes: duration,
            trips_per_week,
            annual_trips,
            wasted_per_trip,
            wasted_weekly,
            wasted_yearly,
            distance_per_trip_km,
            annual_distance_km,
            annual_fuel_litres,
            shift_savings_litres,
            annual_tailpipe_kg,
            annual_tailpipe_tonnes,
        });

        CongestionInsights {
            congestion_factor,
            free_flow_minutes,
            wasted_per_trip,
            wasted_daily,
            wasted_weekly,
            wasted_yearly,
            trips_per_week,
            annual_trips,
            average_speed_kmh,
            distance_per_trip_km,
            annual_distance_km,
            annual_fuel_litres,
            shift_savings_litres,
            annual_tailpipe_kg,
            annual_tailpipe_tonnes,
            wrapped,
        }
    }

    /// Single-trip estimate: the reported duration is treated as the
    /// congested travel time, padded so it always exceeds free flow by the
    /// minimum wasted time.
    pub fn trip_estimate(&self, inputs: CongestionInputs<'_>, duration_minutes: u32) -> TripEstimate {
        let congestion_factor = self.table.factor(inputs);
        let free_flow_minutes = self.table.free_flow_minutes(duration_minutes, congestion_factor);
        let travel_time_minutes = duration_minutes.max(free_flow_minutes + MIN_WASTED_MINUTES);
        TripEstimate {
            congestion_factor,
            travel_time_minutes,
            free_flow_minutes,
            wasted_minutes: travel_time_minutes - free_flow_minutes,
        }
    }
}

/// Estimate with the built-in congestion table.
pub fn estimate_insights(answers: &SurveyAnswers) -> CongestionInsights {
    InsightEngine::default().estimate(answers)
}

pub fn trips_per_week(frequency: Option<Frequency>) -> u32 {
    match frequency {
        Some(Frequency::Daily) => 10,
        Some(Frequency::FewTimes) => 6,
        Some(Frequency::Weekly) => 2,
        Some(Frequency::Occasionally) => 1,
        None => 6,
    }
}

pub fn average_speed_kmh(mode: Option<TravelMode>) -> f64 {
    match mode {
        Some(TravelMode::Car) => 22.0,
        Some(TravelMode::RideShare) => 20.0,
        Some(TravelMode::TwoWheeler) => 28.0,
        Some(TravelMode::Public) => 18.0,
        Some(TravelMode::Walking) => 5.0,
        None => 21.0,
    }
}

/// Kilometres per litre; `None` for modes without direct fuel use.
pub fn fuel_efficiency_kmpl(mode: Option<TravelMode>) -> Option<f64> {
    match mode {
        Some(TravelMode::Car) => Some(12.0),
        Some(TravelMode::RideShare) => Some(13.0),
        Some(TravelMode::TwoWheeler) => Some(32.0),
        Some(TravelMode::Public) | Some(TravelMode::Walking) => None,
        None => Some(15.0),
    }
}

pub fn fuel_litres(mode: Option<TravelMode>, distance_km: f64) -> f64 {
    match fuel_efficiency_kmpl(mode) {
        Some(kmpl) => distance_km.max(0.0) / kmpl,
        None => 0.0,
    }
}

fn wasted_minutes(duration_minutes: u32, free_flow_minutes: u32) -> u32 {
    let gap = duration_minutes as i64 - free_flow_minutes as i64;
    gap.max(MIN_WASTED_MINUTES as i64) as u32
}
