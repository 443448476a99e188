//! Assignment, submission and grade pages

use chrono::Utc;

use crate::db::{Assignment, Course, GradeRow, Submission, SubmissionWithStudent};

use super::{escape_html, layout, or_dash, paragraphs, timestamp, Page};

/// Who is looking at an assignment
pub enum Viewer<'a> {
    Student {
        own: Option<&'a Submission>,
    },
    Staff {
        submissions: &'a [SubmissionWithStudent],
        can_grade: bool,
    },
}

fn late_badge(late: bool) -> &'static str {
    if late {
        " <span class=\"late\">late</span>"
    } else {
        ""
    }
}

fn submit_form(assignment: &Assignment) -> String {
    let mut html = format!(
        "<form method=\"post\" action=\"/assignments/{}/submit\" enctype=\"multipart/form-data\" class=\"stacked\">\n",
        assignment.id
    );
    html.push_str("<label>Answer <textarea name=\"text\"></textarea></label>\n");
    html.push_str("<label>File <input name=\"file\" type=\"file\"></label>\n");
    html.push_str("<button type=\"submit\">Submit</button>\n</form>\n");
    html
}

fn student_section(assignment: &Assignment, own: Option<&Submission>) -> String {
    let mut html = String::from("<h2>Your submission</h2>\n");

    let Some(submission) = own else {
        html.push_str("<p class=\"muted\">You have not submitted anything yet.</p>\n");
        html.push_str(&submit_form(assignment));
        return html;
    };

    html.push_str("<div class=\"card\">\n");
    html.push_str(&format!(
        "<p>Submitted {}{}</p>\n",
        timestamp(&submission.submitted_at),
        late_badge(assignment.is_late(submission.submitted_at))
    ));
    if let Some(body) = &submission.body {
        html.push_str(&paragraphs(body));
    }
    if let Some(file_name) = &submission.file_name {
        html.push_str(&format!(
            "<p>Attachment: <a href=\"/files/submissions/{}\">{}</a></p>\n",
            submission.id,
            escape_html(file_name)
        ));
    }
    match submission.score {
        Some(score) => {
            html.push_str(&format!("<p>Score: <strong>{score}</strong>/100</p>\n"));
            if let Some(feedback) = &submission.feedback {
                html.push_str("<p><strong>Feedback</strong></p>\n");
                html.push_str(&paragraphs(feedback));
            }
        }
        None => html.push_str("<p class=\"muted\">Not graded yet.</p>\n"),
    }
    html.push_str("</div>\n");

    if !submission.is_graded() {
        html.push_str("<p>You can replace your submission until it is graded.</p>\n");
        html.push_str(&submit_form(assignment));
    }

    html
}

fn staff_section(submissions: &[SubmissionWithStudent], can_grade: bool) -> String {
    let mut html = format!("<h2>Submissions ({})</h2>\n", submissions.len());

    if submissions.is_empty() {
        html.push_str("<p class=\"muted\">No submissions yet.</p>\n");
        return html;
    }

    for submission in submissions {
        html.push_str("<div class=\"card\">\n");
        html.push_str(&format!(
            "<strong>{}</strong> <span class=\"muted\">{}</span> &middot; {}{}\n",
            escape_html(submission.name.as_deref().unwrap_or(&submission.username)),
            escape_html(&submission.username),
            timestamp(&submission.submitted_at),
            late_badge(submission.is_late())
        ));
        if let Some(body) = &submission.body {
            html.push_str(&paragraphs(body));
        }
        if let Some(file_name) = &submission.file_name {
            html.push_str(&format!(
                "<p>Attachment: <a href=\"/files/submissions/{}\">{}</a></p>\n",
                submission.id,
                escape_html(file_name)
            ));
        }

        if can_grade {
            let score = submission.score.map(|s| s.to_string()).unwrap_or_default();
            html.push_str(&format!(
                "<form method=\"post\" action=\"/submissions/{}/grade\" class=\"stacked\">\n",
                submission.id
            ));
            html.push_str(&format!(
                "<label>Score (0-100) <input name=\"score\" value=\"{score}\" inputmode=\"numeric\" required></label>\n"
            ));
            html.push_str(&format!(
                "<label>Feedback <textarea name=\"feedback\">{}</textarea></label>\n",
                escape_html(submission.feedback.as_deref().unwrap_or_default())
            ));
            let label = if submission.score.is_some() { "Update grade" } else { "Grade" };
            html.push_str(&format!("<button type=\"submit\">{label}</button>\n</form>\n"));
        } else if let Some(score) = submission.score {
            html.push_str(&format!("<p>Score: <strong>{score}</strong>/100</p>\n"));
        }
        html.push_str("</div>\n");
    }

    html
}

pub fn detail(page: &Page<'_>, course: &Course, assignment: &Assignment, viewer: &Viewer<'_>) -> String {
    let mut content = format!(
        "<p><a href=\"/courses/{}\">{} &middot; {}</a></p>\n<h1>{}</h1>\n",
        course.id,
        escape_html(&course.code),
        escape_html(&course.title),
        escape_html(&assignment.title)
    );

    match assignment.due() {
        Some(due) => {
            let overdue = if due.is_late(Utc::now()) { " (past due)" } else { "" };
            content.push_str(&format!(
                "<p>Due {}{overdue}</p>\n",
                escape_html(&due.to_string())
            ));
        }
        None => content.push_str("<p class=\"muted\">No due date.</p>\n"),
    }
    if let Some(description) = &assignment.description {
        content.push_str(&paragraphs(description));
    }

    match viewer {
        Viewer::Student { own } => content.push_str(&student_section(assignment, *own)),
        Viewer::Staff {
            submissions,
            can_grade,
        } => content.push_str(&staff_section(submissions, *can_grade)),
    }

    layout(page, &assignment.title, &content)
}

/// A student's grade book.
pub fn grades(page: &Page<'_>, rows: &[GradeRow]) -> String {
    let mut content = String::from("<h1>Your grades</h1>\n");

    if rows.is_empty() {
        content.push_str("<p class=\"muted\">You have not submitted anything yet.</p>\n");
        return layout(page, "Grades", &content);
    }

    content.push_str("<table>\n<thead><tr><th>Course</th><th>Assignment</th><th>Submitted</th><th>Score</th><th>Feedback</th></tr></thead>\n<tbody>\n");
    for row in rows {
        let score = match row.score {
            Some(score) => format!("<strong>{score}</strong>/100"),
            None => "<span class=\"muted\">pending</span>".to_string(),
        };
        content.push_str(&format!(
            "<tr><td><a href=\"/courses/{}\">{}</a></td><td><a href=\"/assignments/{}\">{}</a></td><td>{}{}</td><td>{score}</td><td>{}</td></tr>\n",
            row.course_id,
            escape_html(&row.course_code),
            row.assignment_id,
            escape_html(&row.assignment_title),
            timestamp(&row.submitted_at),
            late_badge(row.is_late()),
            or_dash(row.feedback.as_deref())
        ));
    }
    content.push_str("</tbody>\n</table>\n");

    layout(page, "Grades", &content)
}
