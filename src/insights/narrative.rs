use crate::insights::format::{
    format_decimal, format_duration, format_kilometers, format_number, format_percentage,
};
use crate::survey::TravelMode;
use serde::Serialize;

pub const WORKDAY_HOURS: f64 = 8.0;
pub const MEETUP_MINUTES: f64 = 90.0;
/// Fuel (litres) and emissions (kg) below this are reported as negligible.
pub const NEGLIGIBLE_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WrappedCategory {
    Personal,
    Social,
    Economic,
    Environmental,
}

impl WrappedCategory {
    /// Display order.
    pub const ORDER: [WrappedCategory; 4] = [
        Self::Personal,
        Self::Social,
        Self::Economic,
        Self::Environmental,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Personal => "Personal Pace",
            Self::Social => "Social Bandwidth",
            Self::Economic => "Economic Footprint",
            Self::Environmental => "Environmental Impact",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WrappedStat {
    pub id: &'static str,
    pub category: WrappedCategory,
    pub text: String,
}

impl WrappedStat {
    fn new(id: &'static str, category: WrappedCategory, text: String) -> Self {
        Self { id, category, text }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WrappedGroup<'a> {
    pub category: WrappedCategory,
    pub label: &'static str,
    pub entries: Vec<&'a WrappedStat>,
}

/// Derived figures the statements are written from.
#[derive(Debug, Clone, Copy)]
pub struct NarrativeInputs {
    pub mode: Option<TravelMode>,
    pub duration_minutes: u32,
    pub trips_per_week: u32,
    pub annual_trips: u32,
    pub wasted_per_trip: u32,
    pub wasted_weekly: u32,
    pub wasted_yearly: u32,
    pub distance_per_trip_km: f64,
    pub annual_distance_km: f64,
    pub annual_fuel_litres: f64,
    pub shift_savings_litres: f64,
    pub annual_tailpipe_kg: f64,
    pub annual_tailpipe_tonnes: f64,
}

pub fn build_wrapped(inputs: &NarrativeInputs) -> Vec<WrappedStat> {
    let weekly_delay_hours = inputs.wasted_weekly as f64 / 60.0;
    let weekly_meetups = inputs.wasted_weekly as f64 / MEETUP_MINUTES;
    let yearly_delay_hours = inputs.wasted_yearly as f64 / 60.0;
    let lost_workdays = yearly_delay_hours / WORKDAY_HOURS;
    let delay_share = if inputs.duration_minutes > 0 {
        inputs.wasted_per_trip as f64 / inputs.duration_minutes as f64
    } else {
        0.0
    };

    vec![
        WrappedStat::new(
            "trip-volume",
            WrappedCategory::Personal,
            format!(
                "Around {} peak-hour trips this year (~{} per week).",
                format_number(inputs.annual_trips as f64),
                format_number(inputs.trips_per_week as f64)
            ),
        ),
        WrappedStat::new(
            "delay-share",
            WrappedCategory::Personal,
            format!(
                "Each trip loses about {}, which is {} of the total commute you reported.",
                format_duration(inputs.wasted_per_trip as f64),
                format_percentage(delay_share)
            ),
        ),
        WrappedStat::new(
            "social-time",
            WrappedCategory::Social,
            format!(
                "Weekly congestion delay totals {} hours, roughly {} typical 90-minute meetups you could plan elsewhere.",
                format_decimal(weekly_delay_hours, 1),
                format_decimal(weekly_meetups, 1)
            ),
        ),
        WrappedStat::new(
            "workdays",
            WrappedCategory::Social,
            format!(
                "Over the year that delay sums to {} hours, close to {} standard workdays of time.",
                format_decimal(yearly_delay_hours, 1),
                format_decimal(lost_workdays, 1)
            ),
        ),
        WrappedStat::new(
            "distance",
            WrappedCategory::Economic,
            format!(
                "Your route covers about {} per trip and {} annually, useful for tracking passes, maintenance, or reimbursements.",
                format_kilometers(inputs.distance_per_trip_km),
                format_kilometers(inputs.annual_distance_km)
            ),
        ),
        WrappedStat::new("fuel", WrappedCategory::Economic, fuel_text(inputs)),
        WrappedStat::new(
            "emissions",
            WrappedCategory::Environmental,
            emissions_text(
                inputs.mode,
                inputs.annual_tailpipe_kg,
                inputs.annual_tailpipe_tonnes,
            ),
        ),
    ]
}

fn fuel_text(inputs: &NarrativeInputs) -> String {
    if inputs.annual_fuel_litres > NEGLIGIBLE_THRESHOLD {
        format!(
            "This pattern consumes about {} litres of fuel yearly; skipping one trip each week would save roughly {} litres.",
            format_decimal(inputs.annual_fuel_litres, 1),
            format_decimal(inputs.shift_savings_litres, 1)
        )
    } else {
        format!(
            "No direct personal vehicle fuel use is estimated for your chosen mode across roughly {} travelled.",
            format_kilometers(inputs.annual_distance_km)
        )
    }
}

pub fn emissions_text(mode: Option<TravelMode>, tailpipe_kg: f64, tailpipe_tonnes: f64) -> String {
    if tailpipe_kg >= NEGLIGIBLE_THRESHOLD {
        format!(
            "Tailpipe emissions from this pattern are roughly {} kg CO₂ ({} tonnes) each year.",
            format_decimal(tailpipe_kg, 0),
            format_decimal(tailpipe_tonnes, 2)
        )
    } else {
        let mode_name = mode
            .map(|mode| mode.label().to_lowercase())
            .unwrap_or_else(|| "your chosen mode".to_string());
        format!(
            "Direct tailpipe CO₂ is near zero for {mode_name} and the distance you selected; upstream power impacts depend on the transit network."
        )
    }
}

/// Groups statements by category in display order, skipping empty groups.
pub fn group_by_category(stats: &[WrappedStat]) -> Vec<WrappedGroup<'_>> {
    WrappedCategory::ORDER
        .iter()
        .map(|&category| WrappedGroup {
            category,
            label: category.label(),
            entries: stats.iter().filter(|stat| stat.category == category).collect(),
        })
        .filter(|group| !group.entries.is_empty())
        .collect()
}
