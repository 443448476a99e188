//! Account and profile field validation
//!
//! Phone and age patterns match the profile form the application has
//! always shipped with: a 10-digit number starting with `0` and a
//! two-digit age.

use once_cell::sync::Lazy;
use regex::Regex;

use super::validation::{optional, required};
use super::ValidationError;

const MIN_USERNAME_LEN: usize = 3;
const MAX_USERNAME_LEN: usize = 32;
const MAX_PASSWORD_LEN: usize = 128;
const MAX_EMAIL_LEN: usize = 254;
const MAX_NAME_LEN: usize = 100;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("invalid username regex"));

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("invalid email regex"));

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0[1-9][0-9]{8}$").expect("invalid phone regex"));

static AGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[1-9][0-9]$").expect("invalid age regex"));

/// Validated login name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// # Rules
    /// - 3 to 32 characters after trimming
    /// - ASCII letters, digits, `_`, `.` and `-`
    ///
    /// # Example
    /// ```
    /// use lms_core::models::Username;
    ///
    /// assert!(Username::new("ada.lovelace").is_ok());
    /// assert!(Username::new("ab").is_err());
    /// assert!(Username::new("no spaces").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let name = required(s, "username", MAX_USERNAME_LEN)?;

        if name.chars().count() < MIN_USERNAME_LEN {
            return Err(ValidationError::TooShort {
                field: "username",
                min: MIN_USERNAME_LEN,
            });
        }

        if !USERNAME_RE.is_match(&name) {
            return Err(ValidationError::InvalidFormat {
                field: "username",
                reason: "only letters, digits, '_', '.' and '-' are allowed",
            });
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Account password.
///
/// Only presence and length are checked. Passwords are compared as stored.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        // Not trimmed: leading/trailing spaces are part of the secret.
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "password" });
        }
        if s.chars().count() > MAX_PASSWORD_LEN {
            return Err(ValidationError::TooLong {
                field: "password",
                max: MAX_PASSWORD_LEN,
            });
        }
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Validated email address (shape check only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email(String);

impl Email {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let email = required(s, "email", MAX_EMAIL_LEN)?;
        if !EMAIL_RE.is_match(&email) {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "Invalid email address.",
            });
        }
        Ok(Self(email))
    }

    /// Blank input means "not provided".
    pub fn optional(s: Option<&str>) -> Result<Option<Self>, ValidationError> {
        match s.map(str::trim) {
            None | Some("") => Ok(None),
            Some(v) => Self::new(v).map(Some),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Phone number: `0`, a non-zero digit, then eight digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// # Example
    /// ```
    /// use lms_core::models::PhoneNumber;
    ///
    /// assert!(PhoneNumber::new("0712345678").is_ok());
    /// assert!(PhoneNumber::new("0012345678").is_err());
    /// assert!(PhoneNumber::new("712345678").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let phone = s.trim();
        if !PHONE_RE.is_match(phone) {
            return Err(ValidationError::InvalidFormat {
                field: "phone number",
                reason: "Invalid phone number.",
            });
        }
        Ok(Self(phone.to_owned()))
    }

    pub fn optional(s: Option<&str>) -> Result<Option<Self>, ValidationError> {
        match s.map(str::trim) {
            None | Some("") => Ok(None),
            Some(v) => Self::new(v).map(Some),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Two-digit age, 10 to 99.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Age(u8);

impl Age {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let age = s.trim();
        if !AGE_RE.is_match(age) {
            return Err(ValidationError::InvalidFormat {
                field: "age",
                reason: "must be a number between 10 and 99",
            });
        }
        // Two ASCII digits always fit in u8.
        age.parse().map(Self).map_err(|_| ValidationError::OutOfRange {
            field: "age",
            min: 10,
            max: 99,
        })
    }

    pub fn optional(s: Option<&str>) -> Result<Option<Self>, ValidationError> {
        match s.map(str::trim) {
            None | Some("") => Ok(None),
            Some(v) => Self::new(v).map(Some),
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

/// Optional display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn optional(s: Option<&str>) -> Result<Option<Self>, ValidationError> {
        Ok(optional(s, "name", MAX_NAME_LEN)?.map(Self))
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
    fn username_rules() {
        assert!(Username::new("admin").is_ok());
        assert!(Username::new("j.doe-2").is_ok());
        assert!(matches!(
            Username::new("").unwrap_err(),
            ValidationError::Empty { .. }
        ));
        assert!(matches!(
            Username::new("ab").unwrap_err(),
            ValidationError::TooShort { min: 3, .. }
        ));
        assert!(matches!(
            Username::new(&"a".repeat(33)).unwrap_err(),
            ValidationError::TooLong { max: 32, .. }
        ));
        assert!(matches!(
            Username::new("bad name").unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));
    }

    #[test]
    fn username_is_trimmed() {
        assert_eq!(Username::new("  ada  ").unwrap().as_str(), "ada");
    }

    #[test]
    fn password_keeps_whitespace() {
        assert_eq!(Password::new(" pw ").unwrap().as_str(), " pw ");
        assert!(Password::new("").is_err());
    }

    #[test]
    fn password_debug_is_redacted() {
        let pw = Password::new("hunter2").unwrap();
        assert!(!format!("{pw:?}").contains("hunter2"));
    }

    #[test]
    fn email_shape() {
        assert!(Email::new("ada@example.org").is_ok());
        assert!(Email::new("ada@example").is_err());
        assert!(Email::new("ada example.org").is_err());
        assert_eq!(Email::optional(Some("")).unwrap(), None);
    }

    #[test]
    fn phone_pattern() {
        assert!(PhoneNumber::new("0123456789").is_ok());
        assert!(PhoneNumber::new("0012345678").is_err());
        assert!(PhoneNumber::new("01234567890").is_err());
        assert!(PhoneNumber::new("012345678").is_err());
        let err = PhoneNumber::new("abc").unwrap_err();
        assert_eq!(err.to_string(), "phone number: Invalid phone number.");
    }

    #[test]
    fn age_pattern() {
        assert_eq!(Age::new("42").unwrap().get(), 42);
        assert!(Age::new("9").is_err());
        assert!(Age::new("09").is_err());
        assert!(Age::new("100").is_err());
        assert_eq!(Age::optional(Some(" ")).unwrap(), None);
    }
}
