//! Repetitions-or-duration prescription for one routine exercise
//!
//! Clinicians type free text such as "10 repeticiones" or "30 segundos".
//! The text is parsed once, when the routine is authored, into a [`Dosage`].
//! Execution never looks at the text again.

use crate::error::{ErrorCode, PlannerError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `<number> <unit>` and nothing else
static DOSAGE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(\d{1,5})\s*([a-záéíóúñ]+)\.?\s*$").expect("dosage pattern is valid")
});

/// How much of an exercise one series contains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Dosage {
    /// Progression is by explicit patient action
    Repetitions { count: u32 },
    /// Progression is by countdown
    Timed { seconds: u32 },
}

impl Dosage {
    pub fn repetitions(count: u32) -> Self {
        Dosage::Repetitions { count }
    }

    pub fn timed(seconds: u32) -> Self {
        Dosage::Timed { seconds }
    }

    /// Countdown length for timed exercises
    pub fn duration_seconds(&self) -> Option<u32> {
        match self {
            Dosage::Timed { seconds } => Some(*seconds),
            Dosage::Repetitions { .. } => None,
        }
    }

    pub fn is_timed(&self) -> bool {
        matches!(self, Dosage::Timed { .. })
    }

    /// Parse clinician text into a dosage
    ///
    /// The whole text must be a positive number followed by one recognised
    /// unit. Trailing words ("10 segundos de pausa por lado") are rejected
    /// instead of guessed at.
    pub fn parse(text: &str) -> Result<Self, PlannerError> {
        let invalid = |reason: &str| {
            PlannerError::validation_with_code(
                ErrorCode::VALIDATION_INVALID_DOSAGE,
                format!("'{}' {}", text.trim(), reason),
                Some("reps_or_duration".to_string()),
            )
        };

        let caps = DOSAGE_PATTERN
            .captures(text)
            .ok_or_else(|| invalid("must be a number followed by a unit, e.g. '10 repeticiones' or '30 segundos'"))?;

        let value: u32 = caps[1]
            .parse()
            .map_err(|_| invalid("has an unreadable number"))?;
        if value == 0 {
            return Err(invalid("must be greater than zero"));
        }

        match Unit::from_token(&caps[2]) {
            Some(Unit::Repetitions) => Ok(Dosage::Repetitions { count: value }),
            Some(Unit::Seconds) => Ok(Dosage::Timed { seconds: value }),
            Some(Unit::Minutes) => Ok(Dosage::Timed {
                seconds: value * 60,
            }),
            None => Err(invalid("uses an unknown unit")),
        }
    }
}

impl FromStr for Dosage {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dosage::parse(s)
    }
}

impl fmt::Display for Dosage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dosage::Repetitions { count: 1 } => write!(f, "1 repetición"),
            Dosage::Repetitions { count } => write!(f, "{} repeticiones", count),
            Dosage::Timed { seconds: 1 } => write!(f, "1 segundo"),
            Dosage::Timed { seconds } => write!(f, "{} segundos", seconds),
        }
    }
}

enum Unit {
    Repetitions,
    Seconds,
    Minutes,
}

impl Unit {
    fn from_token(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "repeticion" | "repetición" | "repeticiones" | "rep" | "reps" | "repetition"
            | "repetitions" | "veces" => Some(Unit::Repetitions),
            "s" | "seg" | "segs" | "segundo" | "segundos" | "sec" | "secs" | "second"
            | "seconds" => Some(Unit::Seconds),
            "min" | "mins" | "minuto" | "minutos" | "minute" | "minutes" => Some(Unit::Minutes),
            _ => None,
        }
    }
}
