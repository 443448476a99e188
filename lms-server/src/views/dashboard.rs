//! Role-specific landing page

use crate::db::{CourseSummary, GradeRow};

use super::{escape_html, layout, timestamp, Page};

/// What the dashboard shows, per role
pub enum Overview {
    Admin {
        users: i64,
        courses: Vec<CourseSummary>,
    },
    Instructor {
        courses: Vec<CourseSummary>,
    },
    Student {
        courses: Vec<CourseSummary>,
        recent: Vec<GradeRow>,
    },
}

fn course_list(courses: &[CourseSummary], empty: &str) -> String {
    if courses.is_empty() {
        return format!("<p class=\"muted\">{}</p>\n", escape_html(empty));
    }

    let mut html = String::from("<ul>\n");
    for course in courses {
        html.push_str(&format!(
            "<li><a href=\"/courses/{}\">{} &middot; {}</a> <span class=\"muted\">{} students</span></li>\n",
            course.id,
            escape_html(&course.code),
            escape_html(&course.title),
            course.student_count
        ));
    }
    html.push_str("</ul>\n");
    html
}

pub fn dashboard(page: &Page<'_>, overview: &Overview) -> String {
    let name = page.user.map(|u| u.display_name()).unwrap_or_default();
    let mut content = format!("<h1>Welcome, {}</h1>\n", escape_html(name));

    match overview {
        Overview::Admin { users, courses } => {
            content.push_str(&format!(
                "<div class=\"card\"><strong>{users}</strong> accounts &middot; <strong>{}</strong> courses</div>\n",
                courses.len()
            ));
            content.push_str("<p><a href=\"/admin/users\">Manage users</a> &middot; <a href=\"/admin/courses\">Manage courses</a></p>\n");
            content.push_str("<h2>Courses</h2>\n");
            content.push_str(&course_list(courses, "No courses yet."));
        }
        Overview::Instructor { courses } => {
            content.push_str("<h2>Your courses</h2>\n");
            content.push_str(&course_list(courses, "You are not assigned to any course yet."));
        }
        Overview::Student { courses, recent } => {
            content.push_str("<h2>Your courses</h2>\n");
            content.push_str(&course_list(
                courses,
                "You are not enrolled in any course. Browse the catalog under Courses.",
            ));

            content.push_str("<h2>Recent grades</h2>\n");
            if recent.is_empty() {
                content.push_str("<p class=\"muted\">Nothing graded yet.</p>\n");
            } else {
                content.push_str("<ul>\n");
                for row in recent {
                    let score = row.score.map(|s| s.to_string()).unwrap_or_default();
                    let when = row.graded_at.as_ref().map(timestamp).unwrap_or_default();
                    content.push_str(&format!(
                        "<li><a href=\"/assignments/{}\">{}</a> ({}): <strong>{score}</strong>/100 <span class=\"muted\">{when}</span></li>\n",
                        row.assignment_id,
                        escape_html(&row.assignment_title),
                        escape_html(&row.course_code)
                    ));
                }
                content.push_str("</ul>\n<p><a href=\"/grades\">All grades</a></p>\n");
            }
        }
    }

    layout(page, "Dashboard", &content)
}
