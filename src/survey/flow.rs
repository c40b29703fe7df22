//! Step-by-step survey flow.
//!
//! [`SurveyFlow`] owns the answers, the current step and the computed
//! insights. Only the current step is validated on submit; insights are
//! computed once on the final step and discarded by [`SurveyFlow::restart`].

use crate::insights::{CongestionInsights, InsightEngine};
use crate::survey::{
    Frequency, MIN_DURATION_MINUTES, Priority, SLIDER_MAX_DURATION_MINUTES, SurveyAnswers,
    TimeOfDay, TravelMode,
};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepId {
    City,
    Route,
    TimeOfDay,
    Mode,
    Duration,
    Priority,
    Frequency,
}

impl StepId {
    pub const ORDER: [StepId; 7] = [
        Self::City,
        Self::Route,
        Self::TimeOfDay,
        Self::Mode,
        Self::Duration,
        Self::Priority,
        Self::Frequency,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::City => "Which city do you travel in most often?",
            Self::Route => "What areas do you usually travel between?",
            Self::TimeOfDay => "When do you normally make this trip?",
            Self::Mode => "How do you usually get around?",
            Self::Duration => "How long does this trip usually take you?",
            Self::Priority => "What is your main priority during your commute?",
            Self::Frequency => "How often do you make this trip?",
        }
    }

    fn validate(self, answers: &SurveyAnswers) -> Result<(), StepError> {
        match self {
            Self::City if answers.city.trim().is_empty() => Err(StepError::MissingCity),
            Self::Route => {
                let start = answers.start_location.trim();
                let end = answers.end_location.trim();
                if start.is_empty() || end.is_empty() {
                    Err(StepError::MissingLocations)
                } else if start == end {
                    Err(StepError::SameLocations)
                } else {
                    Ok(())
                }
            }
            Self::TimeOfDay if answers.time_of_day.is_none() => Err(StepError::MissingTimeOfDay),
            Self::Mode if answers.mode.is_none() => Err(StepError::MissingMode),
            Self::Duration if answers.duration_minutes < MIN_DURATION_MINUTES => {
                Err(StepError::DurationTooShort)
            }
            Self::Priority if answers.priority.is_none() => Err(StepError::MissingPriority),
            Self::Frequency if answers.frequency.is_none() => Err(StepError::MissingFrequency),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("Pick a city to continue.")]
    MissingCity,
    #[error("Fill in both locations.")]
    MissingLocations,
    #[error("Start and end locations should be different.")]
    SameLocations,
    #[error("Select the time you travel.")]
    MissingTimeOfDay,
    #[error("Choose the way you travel.")]
    MissingMode,
    #[error("Duration must be at least 5 minutes.")]
    DurationTooShort,
    #[error("Select your top priority.")]
    MissingPriority,
    #[error("Let us know how often you travel.")]
    MissingFrequency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Advanced(StepId),
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryItem {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct SurveyFlow {
    engine: InsightEngine,
    answers: SurveyAnswers,
    step_index: usize,
    error: Option<StepError>,
    insights: Option<CongestionInsights>,
}

impl SurveyFlow {
    pub fn new(engine: InsightEngine) -> Self {
        Self {
            engine,
            ..Self::default()
        }
    }

    pub fn answers(&self) -> &SurveyAnswers {
        &self.answers
    }

    pub fn current_step(&self) -> StepId {
        StepId::ORDER[self.step_index]
    }

    pub fn error(&self) -> Option<StepError> {
        self.error
    }

    pub fn is_complete(&self) -> bool {
        self.insights.is_some()
    }

    pub fn insights(&self) -> Option<&CongestionInsights> {
        self.insights.as_ref()
    }

    pub fn set_city(&mut self, city: impl Into<String>) {
        if self.is_complete() {
            return;
        }
        self.answers.city = city.into();
        self.error = None;
    }

    pub fn set_start_location(&mut self, location: impl Into<String>) {
        if self.is_complete() {
            return;
        }
        self.answers.start_location = location.into();
        self.error = None;
    }

    pub fn set_end_location(&mut self, location: impl Into<String>) {
        if self.is_complete() {
            return;
        }
        self.answers.end_location = location.into();
        self.error = None;
    }

    pub fn set_time_of_day(&mut self, time_of_day: TimeOfDay) {
        if self.is_complete() {
            return;
        }
        self.answers.time_of_day = Some(time_of_day);
        self.error = None;
    }

    pub fn set_mode(&mut self, mode: TravelMode) {
        if self.is_complete() {
            return;
        }
        self.answers.mode = Some(mode);
        self.error = None;
    }

    /// Clamped to the slider range.
    pub fn set_duration(&mut self, minutes: u32) {
        if self.is_complete() {
            return;
        }
        self.answers.duration_minutes =
            minutes.clamp(MIN_DURATION_MINUTES, SLIDER_MAX_DURATION_MINUTES);
        self.error = None;
    }

    pub fn set_priority(&mut self, priority: Priority) {
        if self.is_complete() {
            return;
        }
        self.answers.priority = Some(priority);
        self.error = None;
    }

    pub fn set_frequency(&mut self, frequency: Frequency) {
        if self.is_complete() {
            return;
        }
        self.answers.frequency = Some(frequency);
        self.error = None;
    }

    /// Validate the current step and move forward. On the final step the
    /// insights are computed and the flow is complete; answers are then
    /// frozen until [`SurveyFlow::restart`].
    pub fn submit(&mut self) -> Result<StepOutcome, StepError> {
        if self.is_complete() {
            return Ok(StepOutcome::Completed);
        }
        if let Err(err) = self.current_step().validate(&self.answers) {
            self.error = Some(err);
            return Err(err);
        }
        self.error = None;

        if self.step_index == StepId::ORDER.len() - 1 {
            self.insights = Some(self.engine.estimate(&self.answers));
            return Ok(StepOutcome::Completed);
        }

        self.step_index += 1;
        Ok(StepOutcome::Advanced(self.current_step()))
    }

    /// No-op on the first step and once the flow is complete.
    pub fn back(&mut self) {
        if self.step_index == 0 || self.is_complete() {
            return;
        }
        self.step_index -= 1;
        self.error = None;
    }

    pub fn restart(&mut self) {
        self.answers = SurveyAnswers::default();
        self.step_index = 0;
        self.error = None;
        self.insights = None;
    }

    /// Labelled answer rows, `-` for anything unset.
    pub fn summary(&self) -> Vec<SummaryItem> {
        let answers = &self.answers;
        let text_or_dash = |value: &str| {
            if value.is_empty() {
                "-".to_string()
            } else {
                value.to_string()
            }
        };
        let label_or_dash = |label: Option<&'static str>| label.unwrap_or("-").to_string();

        vec![
            SummaryItem {
                label: "City",
                value: text_or_dash(&answers.city),
            },
            SummaryItem {
                label: "Start location",
                value: text_or_dash(&answers.start_location),
            },
            SummaryItem {
                label: "End location",
                value: text_or_dash(&answers.end_location),
            },
            SummaryItem {
                label: "Time of day",
                value: label_or_dash(answers.time_of_day.map(TimeOfDay::label)),
            },
            SummaryItem {
                label: "Mode",
                value: label_or_dash(answers.mode.map(TravelMode::label)),
            },
            SummaryItem {
                label: "Typical duration",
                value: format!("{} minutes", answers.duration_minutes),
            },
            SummaryItem {
                label: "Priority",
                value: label_or_dash(answers.priority.map(Priority::label)),
            },
            SummaryItem {
                label: "Frequency",
                value: label_or_dash(answers.frequency.map(Frequency::label)),
            },
        ]
    }
}
