//! Administration pages

use lms_core::Role;

use crate::db::{Course, CourseSummary, User};

use super::{action_button, escape_html, layout, or_dash, paragraphs, timestamp, Page};

pub fn users(page: &Page<'_>, users: &[User]) -> String {
    let me = page.user.map(|u| u.id);
    let mut content = String::from("<h1>Users</h1>\n");

    content.push_str("<table>\n<thead><tr><th>Username</th><th>Name</th><th>Role</th><th>Email</th><th>Created</th><th></th></tr></thead>\n<tbody>\n");
    for user in users {
        let delete = if Some(user.id) == me {
            "<span class=\"muted\">you</span>".to_string()
        } else {
            action_button(&format!("/admin/users/{}/delete", user.id), "Delete", "danger")
        };
        content.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{delete}</td></tr>\n",
            escape_html(&user.username),
            or_dash(user.name.as_deref()),
            user.role.label(),
            or_dash(user.email.as_deref()),
            timestamp(&user.created_at)
        ));
    }
    content.push_str("</tbody>\n</table>\n");

    content.push_str("<h2>New user</h2>\n");
    content.push_str("<form method=\"post\" action=\"/admin/users\" class=\"stacked\">\n");
    content.push_str("<label>Username <input name=\"username\" required></label>\n");
    content.push_str("<label>Password <input name=\"password\" type=\"password\" required></label>\n");
    content.push_str("<label>Name <input name=\"name\"></label>\n");
    content.push_str("<label>Role <select name=\"role\">\n");
    for role in Role::ALL {
        let selected = if role == Role::Student { " selected" } else { "" };
        content.push_str(&format!(
            "<option value=\"{}\"{selected}>{}</option>\n",
            role.as_str(),
            role.label()
        ));
    }
    content.push_str("</select></label>\n<button type=\"submit\">Create</button>\n</form>\n");

    layout(page, "Users", &content)
}

pub fn courses(page: &Page<'_>, courses: &[CourseSummary]) -> String {
    let mut content = String::from("<h1>Manage courses</h1>\n");

    if courses.is_empty() {
        content.push_str("<p class=\"muted\">No courses yet.</p>\n");
    } else {
        content.push_str("<table>\n<thead><tr><th>Code</th><th>Title</th><th>Instructors</th><th>Students</th><th></th></tr></thead>\n<tbody>\n");
        for course in courses {
            content.push_str(&format!(
                "<tr><td><a href=\"/admin/courses/{id}\">{}</a></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape_html(&course.code),
                escape_html(&course.title),
                course.instructor_count,
                course.student_count,
                action_button(&format!("/admin/courses/{}/delete", course.id), "Delete", "danger"),
                id = course.id,
            ));
        }
        content.push_str("</tbody>\n</table>\n");
    }

    content.push_str("<h2>New course</h2>\n");
    content.push_str("<form method=\"post\" action=\"/admin/courses\" class=\"stacked\">\n");
    content.push_str("<label>Code <input name=\"code\" required placeholder=\"CS-101\"></label>\n");
    content.push_str("<label>Title <input name=\"title\" required></label>\n");
    content.push_str("<label>Description <textarea name=\"description\"></textarea></label>\n");
    content.push_str("<button type=\"submit\">Create</button>\n</form>\n");

    layout(page, "Manage courses", &content)
}

/// Course administration: instructor assignment and roster.
pub fn course_detail(
    page: &Page<'_>,
    course: &Course,
    instructors: &[User],
    candidates: &[User],
    students: &[User],
) -> String {
    let mut content = format!(
        "<h1>{} &middot; {}</h1>\n<p><a href=\"/courses/{}\">Open course page</a></p>\n",
        escape_html(&course.code),
        escape_html(&course.title),
        course.id
    );
    if let Some(description) = &course.description {
        content.push_str(&paragraphs(description));
    }

    content.push_str("<h2>Instructors</h2>\n");
    if instructors.is_empty() {
        content.push_str("<p class=\"muted\">No instructor assigned.</p>\n");
    } else {
        content.push_str("<ul>\n");
        for instructor in instructors {
            content.push_str(&format!(
                "<li>{} {}</li>\n",
                escape_html(instructor.display_name()),
                action_button(
                    &format!("/admin/courses/{}/instructors/{}/remove", course.id, instructor.id),
                    "Remove",
                    "danger"
                )
            ));
        }
        content.push_str("</ul>\n");
    }

    if candidates.is_empty() {
        content.push_str("<p class=\"muted\">No other instructors available.</p>\n");
    } else {
        content.push_str(&format!(
            "<form method=\"post\" action=\"/admin/courses/{}/instructors\" class=\"stacked\">\n<label>Assign instructor <select name=\"instructor_id\">\n",
            course.id
        ));
        for candidate in candidates {
            content.push_str(&format!(
                "<option value=\"{}\">{} ({})</option>\n",
                candidate.id,
                escape_html(candidate.display_name()),
                escape_html(&candidate.username)
            ));
        }
        content.push_str("</select></label>\n<button type=\"submit\">Assign</button>\n</form>\n");
    }

    content.push_str(&format!("<h2>Students ({})</h2>\n", students.len()));
    if students.is_empty() {
        content.push_str("<p class=\"muted\">Nobody is enrolled.</p>\n");
    } else {
        content.push_str("<ul>\n");
        for student in students {
            content.push_str(&format!(
                "<li>{} <span class=\"muted\">{}</span></li>\n",
                escape_html(student.display_name()),
                escape_html(&student.username)
            ));
        }
        content.push_str("</ul>\n");
    }

    layout(page, &course.code, &content)
}
