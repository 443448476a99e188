//! Welcome and login pages

use super::{escape_html, layout, Page};

pub fn welcome(page: &Page<'_>) -> String {
    let mut content = String::from("<h1>Learning Management System</h1>\n");

    match page.user {
        Some(user) => content.push_str(&format!(
            "<p>Signed in as <strong>{}</strong>.</p>\n<p><a href=\"/dashboard\">Go to your dashboard</a></p>\n",
            escape_html(user.display_name())
        )),
        None => content.push_str(
            "<p>Course materials, assignments and grades in one place.</p>\n<p><a href=\"/login\">Log in</a> to continue.</p>\n",
        ),
    }

    layout(page, "Welcome", &content)
}

/// Login form. `required` is set when the visitor was bounced from a
/// protected page.
pub fn login(page: &Page<'_>, username: &str, required: bool) -> String {
    let mut content = String::from("<h1>Log in</h1>\n");

    if required {
        content.push_str("<div class=\"flash flash-info\">Please log in to view that page.</div>\n");
    }

    content.push_str("<form method=\"post\" action=\"/login\" class=\"stacked\">\n");
    content.push_str(&format!(
        "<label>Username <input name=\"username\" value=\"{}\" required autofocus></label>\n",
        escape_html(username)
    ));
    content.push_str("<label>Password <input name=\"password\" type=\"password\" required></label>\n");
    content.push_str("<button type=\"submit\">Log in</button>\n</form>\n");

    layout(page, "Log in", &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_notice_only_when_required() {
        let page = Page::anonymous(&[]);
        assert!(login(&page, "", true).contains("Please log in"));
        assert!(!login(&page, "", false).contains("Please log in"));
    }

    #[test]
    fn login_keeps_escaped_username() {
        let html = login(&Page::anonymous(&[]), "\"bob\"", false);
        assert!(html.contains("value=\"&quot;bob&quot;\""));
    }

    #[test]
    fn anonymous_welcome_links_to_login() {
        assert!(welcome(&Page::anonymous(&[])).contains("Log in</a> to continue"));
    }
}
