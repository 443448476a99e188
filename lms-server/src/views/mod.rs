//! Server-rendered HTML
//!
//! Every page is a plain function returning a `String`. All user-supplied
//! text goes through [`escape_html`] before it reaches the markup.

pub mod admin;
pub mod assignments;
pub mod auth;
pub mod courses;
pub mod dashboard;
pub mod error;
pub mod profile;

use chrono::{DateTime, Utc};
use lms_core::Role;

use crate::db::User;
use crate::session::Flash;

/// Per-request chrome: who is looking, and what to tell them.
pub struct Page<'a> {
    pub user: Option<&'a User>,
    pub flash: &'a [Flash],
}

impl<'a> Page<'a> {
    pub fn new(user: &'a User, flash: &'a [Flash]) -> Self {
        Self {
            user: Some(user),
            flash,
        }
    }

    pub fn anonymous(flash: &'a [Flash]) -> Self {
        Self { user: None, flash }
    }
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escaped value or a placeholder for missing optional text.
pub(crate) fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => escape_html(v),
        _ => "<span class=\"muted\">-</span>".to_string(),
    }
}

pub(crate) fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Multi-line text as paragraphs.
pub(crate) fn paragraphs(text: &str) -> String {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>\n", escape_html(p).replace('\n', "<br>")))
        .collect()
}

/// A single-button POST form, used for delete/enroll style actions.
pub(crate) fn action_button(action: &str, label: &str, class: &str) -> String {
    format!(
        "<form method=\"post\" action=\"{}\" class=\"inline\"><button type=\"submit\" class=\"{}\">{}</button></form>",
        escape_html(action),
        class,
        escape_html(label)
    )
}

fn nav(user: Option<&User>) -> String {
    let mut html = String::from("<nav>\n<a class=\"brand\" href=\"/\">LMS</a>\n");

    match user {
        Some(user) => {
            html.push_str("<a href=\"/dashboard\">Dashboard</a>\n");
            html.push_str("<a href=\"/courses\">Courses</a>\n");
            match user.role {
                Role::Admin => {
                    html.push_str("<a href=\"/admin/users\">Users</a>\n");
                    html.push_str("<a href=\"/admin/courses\">Manage courses</a>\n");
                }
                Role::Student => html.push_str("<a href=\"/grades\">Grades</a>\n"),
                Role::Instructor => {}
            }
            html.push_str("<span class=\"spacer\"></span>\n");
            html.push_str(&format!(
                "<a href=\"/profile\">{} <span class=\"role\">{}</span></a>\n",
                escape_html(user.display_name()),
                user.role.label()
            ));
            html.push_str(&action_button("/logout", "Log out", "link"));
            html.push('\n');
        }
        None => {
            html.push_str("<span class=\"spacer\"></span>\n");
            html.push_str("<a href=\"/login\">Log in</a>\n");
        }
    }

    html.push_str("</nav>\n");
    html
}

fn flashes(flash: &[Flash]) -> String {
    flash
        .iter()
        .map(|f| {
            format!(
                "<div class=\"flash {}\">{}</div>\n",
                f.level.css_class(),
                escape_html(&f.message)
            )
        })
        .collect()
}

/// Wrap page content in the shared document shell.
pub fn layout(page: &Page<'_>, title: &str, content: &str) -> String {
    let mut html = String::with_capacity(4096 + content.len());

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str(&format!("<title>{} | LMS</title>\n", escape_html(title)));
    html.push_str("<style>\n");
    html.push_str(INLINE_CSS);
    html.push_str("</style>\n</head>\n<body>\n");

    html.push_str(&nav(page.user));
    html.push_str("<main>\n");
    html.push_str(&flashes(page.flash));
    html.push_str(content);
    html.push_str("</main>\n</body>\n</html>\n");

    html
}

const INLINE_CSS: &str = r#"
* { box-sizing: border-box; }
body { margin: 0; font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; color: #1f2328; background: #f6f8fa; }
nav { display: flex; gap: 1rem; align-items: center; padding: 0.75rem 1.5rem; background: #24292f; }
nav a, nav button.link { color: #f6f8fa; text-decoration: none; }
nav .brand { font-weight: 700; }
nav .spacer { flex: 1; }
nav .role { font-size: 0.75rem; opacity: 0.7; }
main { max-width: 960px; margin: 1.5rem auto; padding: 0 1.5rem; }
h1 { font-size: 1.6rem; }
h2 { font-size: 1.2rem; margin-top: 2rem; }
table { width: 100%; border-collapse: collapse; background: #fff; }
th, td { text-align: left; padding: 0.5rem; border-bottom: 1px solid #d0d7de; vertical-align: top; }
form.stacked { display: grid; gap: 0.5rem; max-width: 520px; background: #fff; padding: 1rem; border: 1px solid #d0d7de; }
form.inline { display: inline; }
input, select, textarea { font: inherit; padding: 0.35rem; }
textarea { min-height: 6rem; }
button { font: inherit; cursor: pointer; }
button.link { background: none; border: none; padding: 0; }
button.danger { color: #cf222e; }
.flash { padding: 0.6rem 1rem; margin-bottom: 1rem; border: 1px solid; }
.flash-info { background: #ddf4ff; border-color: #54aeff; }
.flash-success { background: #dafbe1; border-color: #4ac26b; }
.flash-error { background: #ffebe9; border-color: #ff8182; }
.muted { color: #656d76; }
.late { color: #cf222e; font-weight: 600; }
.card { background: #fff; border: 1px solid #d0d7de; padding: 1rem; margin-bottom: 1rem; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Flash;

    fn user(role: Role) -> User {
        User {
            id: 1,
            username: "ada".into(),
            password: "x".into(),
            role,
            name: Some("Ada <L>".into()),
            email: None,
            phone_nr: None,
            age: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html("<a href=\"x\">'&'</a>"),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn nav_depends_on_role() {
        let admin = user(Role::Admin);
        let html = layout(&Page::new(&admin, &[]), "Home", "");
        assert!(html.contains("/admin/users"));
        assert!(!html.contains("/grades"));
        assert!(html.contains("Ada &lt;L&gt;"));

        let student = user(Role::Student);
        let html = layout(&Page::new(&student, &[]), "Home", "");
        assert!(html.contains("/grades"));
        assert!(!html.contains("/admin/users"));
    }

    #[test]
    fn anonymous_layout_offers_login() {
        let html = layout(&Page::anonymous(&[]), "Welcome", "<p>hi</p>");
        assert!(html.contains("href=\"/login\""));
        assert!(!html.contains("/logout"));
    }

    #[test]
    fn flash_messages_are_rendered_escaped() {
        let flash = [Flash::error("bad <input>")];
        let html = layout(&Page::anonymous(&flash), "Login", "");
        assert!(html.contains("flash-error"));
        assert!(html.contains("bad &lt;input&gt;"));
    }

    #[test]
    fn paragraphs_split_on_blank_lines() {
        let html = paragraphs("one\ntwo\n\nthree");
        assert_eq!(html, "<p>one<br>two</p>\n<p>three</p>\n");
    }
}
