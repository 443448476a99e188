//! Course, material and assignment text fields

use once_cell::sync::Lazy;
use regex::Regex;

use super::validation::{optional, required};
use super::ValidationError;

const MIN_CODE_LEN: usize = 2;
const MAX_CODE_LEN: usize = 16;
const MAX_TITLE_LEN: usize = 200;
const MAX_BODY_LEN: usize = 20_000;

static CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9-]+$").expect("invalid course code regex"));

/// Short course identifier such as `CS-101`. Stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CourseCode(String);

impl CourseCode {
    /// # Example
    /// ```
    /// use lms_core::models::CourseCode;
    ///
    /// assert_eq!(CourseCode::new("cs-101").unwrap().as_str(), "CS-101");
    /// assert!(CourseCode::new("C").is_err());
    /// assert!(CourseCode::new("CS 101").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let code = required(s, "course code", MAX_CODE_LEN)?.to_ascii_uppercase();

        if code.chars().count() < MIN_CODE_LEN {
            return Err(ValidationError::TooShort {
                field: "course code",
                min: MIN_CODE_LEN,
            });
        }

        if !CODE_RE.is_match(&code) {
            return Err(ValidationError::InvalidFormat {
                field: "course code",
                reason: "only letters, digits and '-' are allowed",
            });
        }

        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Title of a course, material or assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title(String);

impl Title {
    /// Non-empty after trimming, at most 200 characters.
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        required(s, "title", MAX_TITLE_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Free text (descriptions, material bodies, submission text).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body(String);

impl Body {
    /// Blank input is `None`.
    pub fn optional(s: Option<&str>, field: &'static str) -> Result<Option<Self>, ValidationError> {
        Ok(optional(s, field, MAX_BODY_LEN)?.map(Self))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_uppercased() {
        assert_eq!(CourseCode::new(" math-2 ").unwrap().as_str(), "MATH-2");
    }

    #[test]
    fn code_limits() {
        assert!(matches!(
            CourseCode::new("").unwrap_err(),
            ValidationError::Empty { .. }
        ));
        assert!(matches!(
            CourseCode::new(&"A".repeat(17)).unwrap_err(),
            ValidationError::TooLong { max: 16, .. }
        ));
        assert!(matches!(
            CourseCode::new("CS_101").unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));
    }

    #[test]
    fn title_max_length() {
        assert!(Title::new(&"t".repeat(200)).is_ok());
        let err = Title::new(&"t".repeat(201)).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 200, .. }));
    }

    #[test]
    fn title_rejects_whitespace_only() {
        assert!(matches!(
            Title::new("   ").unwrap_err(),
            ValidationError::Empty { .. }
        ));
    }

    #[test]
    fn body_blank_is_none() {
        assert_eq!(Body::optional(Some("\n  \n"), "description").unwrap(), None);
        let body = Body::optional(Some(" Read chapter 1 "), "description")
            .unwrap()
            .unwrap();
        assert_eq!(body.as_str(), "Read chapter 1");
    }
}
