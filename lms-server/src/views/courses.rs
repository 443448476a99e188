//! Course catalog and course pages

use lms_core::models::DueDate;

use crate::db::{Assignment, Course, CourseSummary, Material, StudentAssignment, User};

use super::{action_button, escape_html, layout, or_dash, paragraphs, timestamp, Page};

/// Course list. `enrolled` is set for students and drives the
/// enroll/unenroll buttons.
pub fn list(page: &Page<'_>, heading: &str, courses: &[CourseSummary], enrolled: Option<&[i64]>) -> String {
    let mut content = format!("<h1>{}</h1>\n", escape_html(heading));

    if courses.is_empty() {
        content.push_str("<p class=\"muted\">No courses to show.</p>\n");
        return layout(page, heading, &content);
    }

    content.push_str("<table>\n<thead><tr><th>Code</th><th>Title</th><th>Students</th><th></th></tr></thead>\n<tbody>\n");
    for course in courses {
        let action = match enrolled {
            Some(ids) if ids.contains(&course.id) => format!(
                "<a href=\"/courses/{}\">Open</a> {}",
                course.id,
                action_button(&format!("/courses/{}/unenroll", course.id), "Unenroll", "danger")
            ),
            Some(_) => action_button(&format!("/courses/{}/enroll", course.id), "Enroll", ""),
            None => format!("<a href=\"/courses/{}\">Open</a>", course.id),
        };
        content.push_str(&format!(
            "<tr><td>{}</td><td>{}<br><span class=\"muted\">{}</span></td><td>{}</td><td>{action}</td></tr>\n",
            escape_html(&course.code),
            escape_html(&course.title),
            or_dash(course.description.as_deref()),
            course.student_count
        ));
    }
    content.push_str("</tbody>\n</table>\n");

    layout(page, heading, &content)
}

/// Everything the course page shows
pub struct CourseView<'a> {
    pub course: &'a Course,
    pub instructors: &'a [User],
    pub materials: &'a [Material],
    pub assignments: &'a [Assignment],
    /// Per-assignment status for the viewing student
    pub progress: Option<&'a [StudentAssignment]>,
    /// Viewer teaches this course
    pub can_edit: bool,
}

fn due_label(due_at: Option<&chrono::DateTime<chrono::Utc>>) -> String {
    match due_at {
        Some(at) => escape_html(&DueDate::from_datetime(*at).to_string()),
        None => "<span class=\"muted\">no due date</span>".to_string(),
    }
}

fn materials_section(view: &CourseView<'_>) -> String {
    let mut html = String::from("<h2>Materials</h2>\n");

    if view.materials.is_empty() {
        html.push_str("<p class=\"muted\">No materials yet.</p>\n");
    }
    for material in view.materials {
        html.push_str("<div class=\"card\">\n");
        html.push_str(&format!(
            "<strong>{}</strong> <span class=\"muted\">{}</span>\n",
            escape_html(&material.title),
            timestamp(&material.created_at)
        ));
        if let Some(body) = &material.body {
            html.push_str(&paragraphs(body));
        }
        if let Some(file_name) = &material.file_name {
            html.push_str(&format!(
                "<p>Attachment: <a href=\"/files/materials/{}\">{}</a></p>\n",
                material.id,
                escape_html(file_name)
            ));
        }
        if view.can_edit {
            html.push_str(&action_button(
                &format!("/materials/{}/delete", material.id),
                "Delete material",
                "danger",
            ));
        }
        html.push_str("</div>\n");
    }

    if view.can_edit {
        html.push_str(&format!(
            "<form method=\"post\" action=\"/courses/{}/materials\" enctype=\"multipart/form-data\" class=\"stacked\">\n",
            view.course.id
        ));
        html.push_str("<strong>Post material</strong>\n");
        html.push_str("<label>Title <input name=\"title\" required></label>\n");
        html.push_str("<label>Text <textarea name=\"body\"></textarea></label>\n");
        html.push_str("<label>File <input name=\"file\" type=\"file\"></label>\n");
        html.push_str("<button type=\"submit\">Post</button>\n</form>\n");
    }

    html
}

fn assignments_section(view: &CourseView<'_>) -> String {
    let mut html = String::from("<h2>Assignments</h2>\n");

    if let Some(progress) = view.progress {
        if progress.is_empty() {
            html.push_str("<p class=\"muted\">No assignments yet.</p>\n");
            return html;
        }
        html.push_str("<table>\n<thead><tr><th>Assignment</th><th>Due</th><th>Status</th></tr></thead>\n<tbody>\n");
        for row in progress {
            let status = match (row.submitted_at, row.score) {
                (_, Some(score)) => format!("graded: <strong>{score}</strong>/100"),
                (Some(at), None) => format!("submitted {}", timestamp(&at)),
                (None, None) => "<span class=\"muted\">not submitted</span>".to_string(),
            };
            html.push_str(&format!(
                "<tr><td><a href=\"/assignments/{}\">{}</a></td><td>{}</td><td>{status}</td></tr>\n",
                row.id,
                escape_html(&row.title),
                due_label(row.due_at.as_ref())
            ));
        }
        html.push_str("</tbody>\n</table>\n");
        return html;
    }

    if view.assignments.is_empty() {
        html.push_str("<p class=\"muted\">No assignments yet.</p>\n");
    } else {
        html.push_str("<table>\n<thead><tr><th>Assignment</th><th>Due</th><th></th></tr></thead>\n<tbody>\n");
        for assignment in view.assignments {
            let delete = if view.can_edit {
                action_button(&format!("/assignments/{}/delete", assignment.id), "Delete", "danger")
            } else {
                String::new()
            };
            html.push_str(&format!(
                "<tr><td><a href=\"/assignments/{}\">{}</a></td><td>{}</td><td>{delete}</td></tr>\n",
                assignment.id,
                escape_html(&assignment.title),
                due_label(assignment.due_at.as_ref())
            ));
        }
        html.push_str("</tbody>\n</table>\n");
    }

    if view.can_edit {
        html.push_str(&format!(
            "<form method=\"post\" action=\"/courses/{}/assignments\" class=\"stacked\">\n",
            view.course.id
        ));
        html.push_str("<strong>New assignment</strong>\n");
        html.push_str("<label>Title <input name=\"title\" required></label>\n");
        html.push_str("<label>Description <textarea name=\"description\"></textarea></label>\n");
        html.push_str("<label>Due (UTC) <input name=\"due\" type=\"datetime-local\"></label>\n");
        html.push_str("<button type=\"submit\">Create</button>\n</form>\n");
    }

    html
}

pub fn detail(page: &Page<'_>, view: &CourseView<'_>) -> String {
    let course = view.course;
    let mut content = format!(
        "<h1>{} &middot; {}</h1>\n",
        escape_html(&course.code),
        escape_html(&course.title)
    );

    let teachers: Vec<String> = view
        .instructors
        .iter()
        .map(|u| escape_html(u.display_name()))
        .collect();
    if teachers.is_empty() {
        content.push_str("<p class=\"muted\">No instructor assigned.</p>\n");
    } else {
        content.push_str(&format!("<p>Taught by {}</p>\n", teachers.join(", ")));
    }

    if let Some(description) = &course.description {
        content.push_str(&paragraphs(description));
    }

    content.push_str(&materials_section(view));
    content.push_str(&assignments_section(view));

    layout(page, &course.code, &content)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn course() -> Course {
        Course {
            id: 4,
            code: "CS-101".into(),
            title: "Intro".into(),
            description: None,
            created_at: Utc::now(),
        }
    }

    fn summary() -> CourseSummary {
        CourseSummary {
            id: 4,
            code: "CS-101".into(),
            title: "Intro".into(),
            description: None,
            created_at: Utc::now(),
            instructor_count: 1,
            student_count: 3,
        }
    }

    #[test]
    fn catalog_offers_enroll_or_unenroll() {
        let page = Page::anonymous(&[]);
        let courses = [summary()];

        let html = list(&page, "Catalog", &courses, Some(&[][..]));
        assert!(html.contains("/courses/4/enroll"));

        let html = list(&page, "Catalog", &courses, Some(&[4][..]));
        assert!(html.contains("/courses/4/unenroll"));

        let html = list(&page, "Courses", &courses, None);
        assert!(!html.contains("enroll"));
    }

    #[test]
    fn instructor_sees_forms_student_does_not() {
        let page = Page::anonymous(&[]);
        let course = course();
        let no_progress: Vec<StudentAssignment> = Vec::new();
        let mut view = CourseView {
            course: &course,
            instructors: &[],
            materials: &[],
            assignments: &[],
            progress: None,
            can_edit: true,
        };
        let html = detail(&page, &view);
        assert!(html.contains("enctype=\"multipart/form-data\""));
        assert!(html.contains("/courses/4/assignments"));

        view.can_edit = false;
        view.progress = Some(no_progress.as_slice());
        let html = detail(&page, &view);
        assert!(!html.contains("multipart"));
        assert!(!html.contains("/courses/4/assignments"));
    }
}
