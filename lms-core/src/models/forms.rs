//! HTML form payloads and their validated counterparts
//!
//! Form structs deserialize straight from `application/x-www-form-urlencoded`
//! bodies (missing fields default to empty). `validate()` turns them into
//! the typed values the persistence layer accepts, stopping at the first
//! invalid field.

use serde::Deserialize;

use super::{
    Age, Body, CourseCode, DisplayName, DueDate, Email, Password, PhoneNumber, Role, Score, Title,
    Username, ValidationError,
};

/// Login credentials.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Credentials after presence checks.
///
/// The username is not held to [`Username`] rules here: a malformed name
/// simply fails to authenticate.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: Password,
}

impl LoginForm {
    pub fn validate(&self) -> Result<Credentials, ValidationError> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(ValidationError::Empty { field: "username" });
        }
        Ok(Credentials {
            username: username.to_owned(),
            password: Password::new(&self.password)?,
        })
    }
}

/// Self-service profile edit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_nr: Option<String>,
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub name: Option<DisplayName>,
    pub email: Option<Email>,
    pub phone_nr: Option<PhoneNumber>,
    pub age: Option<Age>,
    pub username: Username,
    pub password: Password,
}

impl ProfileForm {
    pub fn validate(&self) -> Result<ProfileUpdate, ValidationError> {
        Ok(ProfileUpdate {
            name: DisplayName::optional(self.name.as_deref())?,
            email: Email::optional(self.email.as_deref())?,
            phone_nr: PhoneNumber::optional(self.phone_nr.as_deref())?,
            age: Age::optional(self.age.as_deref())?,
            username: Username::new(&self.username)?,
            password: Password::new(&self.password)?,
        })
    }
}

/// Admin: create an account.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUserForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Username,
    pub password: Password,
    pub role: Role,
    pub name: Option<DisplayName>,
}

impl NewUserForm {
    pub fn validate(&self) -> Result<NewUser, ValidationError> {
        Ok(NewUser {
            username: Username::new(&self.username)?,
            password: Password::new(&self.password)?,
            role: self.role.parse()?,
            name: DisplayName::optional(self.name.as_deref())?,
        })
    }
}

/// Admin: create a course.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCourseForm {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub code: CourseCode,
    pub title: Title,
    pub description: Option<Body>,
}

impl NewCourseForm {
    pub fn validate(&self) -> Result<NewCourse, ValidationError> {
        Ok(NewCourse {
            code: CourseCode::new(&self.code)?,
            title: Title::new(&self.title)?,
            description: Body::optional(self.description.as_deref(), "description")?,
        })
    }
}

/// Instructor: post course material. An attachment travels alongside in
/// the multipart body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaterialForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewMaterial {
    pub title: Title,
    pub body: Option<Body>,
}

impl MaterialForm {
    pub fn validate(&self) -> Result<NewMaterial, ValidationError> {
        Ok(NewMaterial {
            title: Title::new(&self.title)?,
            body: Body::optional(self.body.as_deref(), "body")?,
        })
    }
}

/// Instructor: post an assignment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignmentForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub title: Title,
    pub description: Option<Body>,
    pub due: Option<DueDate>,
}

impl AssignmentForm {
    pub fn validate(&self) -> Result<NewAssignment, ValidationError> {
        Ok(NewAssignment {
            title: Title::new(&self.title)?,
            description: Body::optional(self.description.as_deref(), "description")?,
            due: DueDate::optional(self.due.as_deref())?,
        })
    }
}

/// Student: hand in work.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionForm {
    #[serde(default)]
    pub text: Option<String>,
}

impl SubmissionForm {
    /// A submission needs text, a file, or both.
    pub fn validate(&self, has_file: bool) -> Result<Option<Body>, ValidationError> {
        let text = Body::optional(self.text.as_deref(), "submission text")?;
        if text.is_none() && !has_file {
            return Err(ValidationError::Empty { field: "submission" });
        }
        Ok(text)
    }
}

/// Instructor: grade a submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GradeForm {
    #[serde(default)]
    pub score: String,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GradeInput {
    pub score: Score,
    pub feedback: Option<Body>,
}

impl GradeForm {
    pub fn validate(&self) -> Result<GradeInput, ValidationError> {
        Ok(GradeInput {
            score: Score::parse(&self.score)?,
            feedback: Body::optional(self.feedback.as_deref(), "feedback")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> ProfileForm {
        ProfileForm {
            name: Some("Ada Lovelace".into()),
            email: Some("ada@example.org".into()),
            phone_nr: Some("0712345678".into()),
            age: Some("36".into()),
            username: "ada".into(),
            password: "engine".into(),
        }
    }

    #[test]
    fn login_requires_both_fields() {
        let form = LoginForm {
            username: "  ".into(),
            password: "x".into(),
        };
        assert!(matches!(
            form.validate().unwrap_err(),
            ValidationError::Empty { field: "username" }
        ));

        let form = LoginForm {
            username: "ada".into(),
            password: String::new(),
        };
        assert!(matches!(
            form.validate().unwrap_err(),
            ValidationError::Empty { field: "password" }
        ));
    }

    #[test]
    fn login_does_not_apply_username_rules() {
        let form = LoginForm {
            username: "x".into(),
            password: "pw".into(),
        };
        assert_eq!(form.validate().unwrap().username, "x");
    }

    #[test]
    fn profile_valid() {
        let update = profile().validate().unwrap();
        assert_eq!(update.username.as_str(), "ada");
        assert_eq!(update.age.unwrap().get(), 36);
    }

    #[test]
    fn profile_optional_fields_may_be_blank() {
        let form = ProfileForm {
            name: Some(String::new()),
            email: Some(String::new()),
            phone_nr: None,
            age: Some("  ".into()),
            ..profile()
        };
        let update = form.validate().unwrap();
        assert!(update.name.is_none());
        assert!(update.email.is_none());
        assert!(update.phone_nr.is_none());
        assert!(update.age.is_none());
    }

    #[test]
    fn profile_rejects_bad_phone() {
        let form = ProfileForm {
            phone_nr: Some("12345".into()),
            ..profile()
        };
        assert_eq!(
            form.validate().unwrap_err().to_string(),
            "phone number: Invalid phone number."
        );
    }

    #[test]
    fn new_user_role_is_checked() {
        let form = NewUserForm {
            username: "grace".into(),
            password: "cobol".into(),
            role: "superuser".into(),
            name: None,
        };
        assert!(matches!(
            form.validate().unwrap_err(),
            ValidationError::InvalidVariant { field: "role", .. }
        ));
    }

    #[test]
    fn submission_needs_text_or_file() {
        let empty = SubmissionForm { text: Some("  ".into()) };
        assert!(empty.validate(false).is_err());
        assert_eq!(empty.validate(true).unwrap(), None);

        let text = SubmissionForm {
            text: Some("my essay".into()),
        };
        assert!(text.validate(false).unwrap().is_some());
    }

    #[test]
    fn grade_form() {
        let form = GradeForm {
            score: "95".into(),
            feedback: Some("Well argued".into()),
        };
        let grade = form.validate().unwrap();
        assert_eq!(grade.score.get(), 95);
        assert_eq!(grade.feedback.unwrap().as_str(), "Well argued");

        let form = GradeForm {
            score: "150".into(),
            feedback: None,
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn assignment_due_is_optional() {
        let form = AssignmentForm {
            title: "Essay".into(),
            description: None,
            due: Some(String::new()),
        };
        assert!(form.validate().unwrap().due.is_none());
    }
}
