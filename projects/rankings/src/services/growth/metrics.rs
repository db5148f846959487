//! Growth arithmetic with no storage access.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Serialize, Serializer};

/// Look-back window of a growth figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthWindow {
    Daily,
    Weekly,
    Monthly,
}

impl GrowthWindow {
    pub fn days(self) -> i64 {
        match self {
            GrowthWindow::Daily => 1,
            GrowthWindow::Weekly => 7,
            GrowthWindow::Monthly => 30,
        }
    }

    /// Snapshots at or before this instant count as the window's baseline.
    pub fn cutoff(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.days())
    }
}

/// Subscriber gain over a window and the same gain as a percentage of the
/// baseline.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Growth {
    pub gain: i64,
    pub percent: f64,
}

/// Missing data on either side is flat growth, never an error.
pub fn growth_between(baseline: Option<i64>, current: Option<i64>) -> Growth {
    let (Some(old), Some(current)) = (baseline, current) else {
        return Growth::default();
    };

    let gain = current - old;
    let percent = if old > 0 {
        gain as f64 / old as f64 * 100.0
    } else {
        0.0
    };

    Growth {
        gain,
        percent: round_to(percent, 4),
    }
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViralLabel {
    Exploding,
    RisingFast,
    Stable,
    Slowing,
}

impl ViralLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            ViralLabel::Exploding => "Exploding",
            ViralLabel::RisingFast => "Rising Fast",
            ViralLabel::Stable => "Stable",
            ViralLabel::Slowing => "Slowing",
        }
    }
}

impl fmt::Display for ViralLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ViralLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Thresholds are percentages and are checked in priority order.
pub fn classify(daily_percent: f64, weekly_percent: f64) -> ViralLabel {
    if daily_percent > 1.0 || (daily_percent > 0.5 && weekly_percent > 5.0) {
        ViralLabel::Exploding
    } else if daily_percent > 0.3 || weekly_percent > 3.0 {
        ViralLabel::RisingFast
    } else if daily_percent >= 0.0 && weekly_percent >= 0.0 {
        ViralLabel::Stable
    } else {
        ViralLabel::Slowing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViralPrediction {
    pub viral_score: f64,
    pub label: ViralLabel,
    pub daily_growth_rate: f64,
    pub weekly_growth_rate: f64,
    pub acceleration: f64,
}

/// Daily rate times weekly acceleration, per million subscribers, in [0, 100].
pub fn viral_score_for(
    daily_percent: f64,
    weekly_percent: f64,
    subscriber_count: i64,
) -> ViralPrediction {
    let acceleration = weekly_percent / 7.0;

    let raw = if subscriber_count > 0 {
        (daily_percent * acceleration) / (subscriber_count as f64 / 1_000_000.0)
    } else {
        0.0
    };

    ViralPrediction {
        viral_score: round_to(raw.clamp(0.0, 100.0), 2),
        label: classify(daily_percent, weekly_percent),
        daily_growth_rate: daily_percent,
        weekly_growth_rate: weekly_percent,
        acceleration: round_to(acceleration, 4),
    }
}

/// Outcome of a linear overtake extrapolation.
///
/// Serialized flat: `already_ahead`, then either the `reason` the gap never
/// closes or the days/date estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OvertakePrediction {
    pub already_ahead: bool,
    pub will_overtake: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_to_overtake: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_gap: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_gap_closure: Option<i64>,
}

pub const NOT_GROWING_FASTER: &str = "Not growing faster than target";

/// Assumes both channels keep their current daily gain.
pub fn overtake(
    subject_subscribers: i64,
    subject_daily_gain: i64,
    target_subscribers: i64,
    target_daily_gain: i64,
    now: DateTime<Utc>,
) -> OvertakePrediction {
    if subject_subscribers >= target_subscribers {
        return OvertakePrediction {
            already_ahead: true,
            will_overtake: false,
            reason: None,
            days_to_overtake: None,
            predicted_date: None,
            current_gap: None,
            daily_gap_closure: None,
        };
    }

    let gap = target_subscribers - subject_subscribers;
    let closure = subject_daily_gain - target_daily_gain;

    if closure <= 0 {
        return OvertakePrediction {
            already_ahead: false,
            will_overtake: false,
            reason: Some(NOT_GROWING_FASTER.to_string()),
            days_to_overtake: None,
            predicted_date: None,
            current_gap: Some(gap),
            daily_gap_closure: Some(closure),
        };
    }

    let days = gap as f64 / closure as f64;
    let predicted_date = Duration::try_milliseconds((days * 86_400_000.0) as i64)
        .and_then(|offset| now.checked_add_signed(offset))
        .map(|at| at.date_naive());

    OvertakePrediction {
        already_ahead: false,
        will_overtake: true,
        reason: None,
        days_to_overtake: Some(days.round() as i64),
        predicted_date,
        current_gap: Some(gap),
        daily_gap_closure: Some(closure),
    }
}

#[cfg(test)]
#[path = "metrics_test.rs"]
mod metrics_test;
