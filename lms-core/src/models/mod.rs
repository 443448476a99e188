//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod account;
pub mod course;
pub mod forms;
pub mod grading;
pub mod role;
pub mod validation;

pub use account::{Age, DisplayName, Email, Password, PhoneNumber, Username};
pub use course::{Body, CourseCode, Title};
pub use forms::{
    AssignmentForm, Credentials, GradeForm, GradeInput, LoginForm, MaterialForm, NewAssignment,
    NewCourse, NewCourseForm, NewMaterial, NewUser, NewUserForm, ProfileForm, ProfileUpdate,
    SubmissionForm,
};
pub use grading::{DueDate, Score};
pub use role::Role;
pub use validation::ValidationError;
