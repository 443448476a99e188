//! Scores and due dates

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::ValidationError;

/// Percentage score given to a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Score(u8);

impl Score {
    pub const MAX: u8 = 100;

    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if !(0..=i64::from(Self::MAX)).contains(&value) {
            return Err(ValidationError::OutOfRange {
                field: "score",
                min: 0,
                max: i64::from(Self::MAX),
            });
        }
        Ok(Self(value as u8))
    }

    /// Parse form input.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "score" });
        }
        let value: i64 = s.parse().map_err(|_| ValidationError::InvalidFormat {
            field: "score",
            reason: "must be a whole number",
        })?;
        Self::new(value)
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

/// Assignment deadline, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueDate(DateTime<Utc>);

impl DueDate {
    /// Accepts `YYYY-MM-DD` (end of that day) or the `YYYY-MM-DDTHH:MM`
    /// value produced by `<input type="datetime-local">`.
    ///
    /// # Example
    /// ```
    /// use lms_core::models::DueDate;
    ///
    /// let due = DueDate::parse("2024-03-01").unwrap();
    /// assert_eq!(due.to_string(), "2024-03-01 23:59 UTC");
    /// ```
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "due date" });
        }

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            let end_of_day = date
                .and_hms_opt(23, 59, 0)
                .ok_or(ValidationError::InvalidFormat {
                    field: "due date",
                    reason: "invalid calendar date",
                })?;
            return Ok(Self(end_of_day.and_utc()));
        }

        for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(Self(dt.and_utc()));
            }
        }

        Err(ValidationError::InvalidFormat {
            field: "due date",
            reason: "expected YYYY-MM-DD or YYYY-MM-DDTHH:MM",
        })
    }

    pub fn optional(s: Option<&str>) -> Result<Option<Self>, ValidationError> {
        match s.map(str::trim) {
            None | Some("") => Ok(None),
            Some(v) => Self::parse(v).map(Some),
        }
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Whether a submission made at `at` counts as late.
    pub fn is_late(&self, at: DateTime<Utc>) -> bool {
        at > self.0
    }
}

impl std::fmt::Display for DueDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M UTC"))
    }
}
