//! Commute survey answers and the categorical options they are built from.

use serde::{Deserialize, Serialize};

pub mod flow;

pub const DEFAULT_DURATION_MINUTES: u32 = 45;
pub const MIN_DURATION_MINUTES: u32 = 5;
/// Upper bound of the survey duration slider.
pub const SLIDER_MAX_DURATION_MINUTES: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 4] = [Self::Morning, Self::Afternoon, Self::Evening, Self::Night];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "morning" => Some(Self::Morning),
            "afternoon" => Some(Self::Afternoon),
            "evening" => Some(Self::Evening),
            "night" => Some(Self::Night),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Evening => "Evening",
            Self::Night => "Night",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TravelMode {
    Car,
    TwoWheeler,
    Public,
    RideShare,
    Walking,
}

impl TravelMode {
    pub const ALL: [TravelMode; 5] = [
        Self::Car,
        Self::TwoWheeler,
        Self::Public,
        Self::RideShare,
        Self::Walking,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "car" => Some(Self::Car),
            "two-wheeler" => Some(Self::TwoWheeler),
            "public" => Some(Self::Public),
            "ride-share" => Some(Self::RideShare),
            "walking" => Some(Self::Walking),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Car => "Car",
            Self::TwoWheeler => "Two-wheeler",
            Self::Public => "Public transport",
            Self::RideShare => "Ride-share",
            Self::Walking => "Walking",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Time,
    Stress,
    Cost,
    Environment,
    None,
}

impl Priority {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "time" => Some(Self::Time),
            "stress" => Some(Self::Stress),
            "cost" => Some(Self::Cost),
            "environment" => Some(Self::Environment),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Time => "Saving time",
            Self::Stress => "Reducing stress",
            Self::Cost => "Reducing cost",
            Self::Environment => "Being more environmentally conscious",
            Self::None => "No specific priority",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    Daily,
    FewTimes,
    Weekly,
    Occasionally,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Self::Daily,
        Self::FewTimes,
        Self::Weekly,
        Self::Occasionally,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "few-times" => Some(Self::FewTimes),
            "weekly" => Some(Self::Weekly),
            "occasionally" => Some(Self::Occasionally),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Daily => "Every day",
            Self::FewTimes => "A few times a week",
            Self::Weekly => "Once a week",
            Self::Occasionally => "Occasionally",
        }
    }
}

/// Answers collected by the commute survey.
///
/// Unset categorical answers are `None` and fall through to the default
/// branch of every lookup table in the insight engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SurveyAnswers {
    pub city: String,
    pub start_location: String,
    pub end_location: String,
    pub time_of_day: Option<TimeOfDay>,
    pub mode: Option<TravelMode>,
    #[serde(rename = "duration")]
    pub duration_minutes: u32,
    pub priority: Option<Priority>,
    pub frequency: Option<Frequency>,
}

impl Default for SurveyAnswers {
    fn default() -> Self {
        Self {
            city: String::new(),
            start_location: String::new(),
            end_location: String::new(),
            time_of_day: None,
            mode: None,
            duration_minutes: DEFAULT_DURATION_MINUTES,
            priority: None,
            frequency: None,
        }
    }
}

/// Parse a raw JSON duration: non-finite or missing values use the default,
/// anything else is rounded and clamped to `[MIN_DURATION_MINUTES, max]`.
pub fn sanitize_duration(value: Option<f64>, max: u32) -> u32 {
    match value {
        Some(minutes) if minutes.is_finite() => {
            minutes
                .round()
                .clamp(MIN_DURATION_MINUTES as f64, max as f64) as u32
        }
        _ => DEFAULT_DURATION_MINUTES,
    }
}
