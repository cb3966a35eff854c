//! Lifestyle feedback
//!
//! Threshold-based guidance for the screen time and caffeine values a user
//! enters alongside the stress estimate.

use serde::{Deserialize, Serialize};

/// Screen time above this many hours is high
pub const HIGH_SCREEN_TIME_HOURS: f64 = 8.0;

/// Screen time above this many hours is moderate
pub const MODERATE_SCREEN_TIME_HOURS: f64 = 5.0;

/// Caffeine above this many mg/day is high
pub const HIGH_CAFFEINE_MG: f64 = 400.0;

/// Caffeine above this many mg/day is moderate
pub const MODERATE_CAFFEINE_MG: f64 = 200.0;

/// How a piece of feedback should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenTimeFeedback {
    Good,
    Moderate,
    High,
}

impl ScreenTimeFeedback {
    pub fn assess(hours: f64) -> Self {
        if hours > HIGH_SCREEN_TIME_HOURS {
            ScreenTimeFeedback::High
        } else if hours > MODERATE_SCREEN_TIME_HOURS {
            ScreenTimeFeedback::Moderate
        } else {
            ScreenTimeFeedback::Good
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            ScreenTimeFeedback::Good => Severity::Success,
            ScreenTimeFeedback::Moderate => Severity::Info,
            ScreenTimeFeedback::High => Severity::Warning,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ScreenTimeFeedback::Good => "Good screen management!",
            ScreenTimeFeedback::Moderate => "Moderate screen time. Stay aware.",
            ScreenTimeFeedback::High => {
                "High screen time detected. Consider taking frequent breaks."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaffeineFeedback {
    Healthy,
    Moderate,
    High,
}

impl CaffeineFeedback {
    pub fn assess(caffeine_mg: f64) -> Self {
        if caffeine_mg > HIGH_CAFFEINE_MG {
            CaffeineFeedback::High
        } else if caffeine_mg > MODERATE_CAFFEINE_MG {
            CaffeineFeedback::Moderate
        } else {
            CaffeineFeedback::Healthy
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            CaffeineFeedback::Healthy => Severity::Success,
            CaffeineFeedback::Moderate => Severity::Info,
            CaffeineFeedback::High => Severity::Warning,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            CaffeineFeedback::Healthy => "Caffeine level within healthy range.",
            CaffeineFeedback::Moderate => {
                "Moderate caffeine intake. Monitor for jitters or sleep impact."
            }
            CaffeineFeedback::High => {
                "High caffeine consumption. Reduce for better sleep and clarity."
            }
        }
    }
}

/// A single rendered piece of guidance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackItem {
    pub topic: String,
    pub level: String,
    pub severity: Severity,
    pub message: String,
}

/// Feedback for one pair of inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifestyleFeedback {
    pub screen_time: ScreenTimeFeedback,
    pub caffeine: CaffeineFeedback,
}

impl LifestyleFeedback {
    pub fn assess(screen_time_hours: f64, caffeine_mg: f64) -> Self {
        Self {
            screen_time: ScreenTimeFeedback::assess(screen_time_hours),
            caffeine: CaffeineFeedback::assess(caffeine_mg),
        }
    }

    /// Feedback in display order: screen time, then caffeine
    pub fn items(&self) -> Vec<FeedbackItem> {
        vec![
            FeedbackItem {
                topic: "screen_time".to_string(),
                level: format!("{:?}", self.screen_time).to_lowercase(),
                severity: self.screen_time.severity(),
                message: self.screen_time.message().to_string(),
            },
            FeedbackItem {
                topic: "caffeine".to_string(),
                level: format!("{:?}", self.caffeine).to_lowercase(),
                severity: self.caffeine.severity(),
                message: self.caffeine.message().to_string(),
            },
        ]
    }
}
