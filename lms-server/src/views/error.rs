//! Error pages

use super::{escape_html, layout, Page};

/// Status page shown for 4xx/5xx responses.
pub fn error_page(status: u16, heading: &str, message: &str) -> String {
    let content = format!(
        "<h1>{status} {}</h1>\n<p>{}</p>\n<p><a href=\"/dashboard\">Back to dashboard</a></p>\n",
        escape_html(heading),
        escape_html(message)
    );
    layout(&Page::anonymous(&[]), heading, &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_status_and_escaped_message() {
        let html = error_page(404, "Not Found", "course '<7>' not found");
        assert!(html.contains("<h1>404 Not Found</h1>"));
        assert!(html.contains("&lt;7&gt;"));
    }
}
