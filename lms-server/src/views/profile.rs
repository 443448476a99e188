//! Own-account page

use crate::db::User;

use super::{escape_html, layout, timestamp, Page};

fn text_input(label: &str, name: &str, value: Option<&str>, extra: &str) -> String {
    format!(
        "<label>{label} <input name=\"{name}\" value=\"{}\"{extra}></label>\n",
        escape_html(value.unwrap_or_default())
    )
}

pub fn profile(page: &Page<'_>, user: &User) -> String {
    let mut content = String::from("<h1>Your profile</h1>\n");

    content.push_str(&format!(
        "<p class=\"muted\">{} account since {}</p>\n",
        user.role.label(),
        timestamp(&user.created_at)
    ));

    let age = user.age.map(|a| a.to_string());

    content.push_str("<form method=\"post\" action=\"/profile\" class=\"stacked\">\n");
    content.push_str(&text_input("Username", "username", Some(user.username.as_str()), " required"));
    content.push_str(&text_input("Name", "name", user.name.as_deref(), ""));
    content.push_str(&text_input("Email", "email", user.email.as_deref(), " type=\"email\""));
    content.push_str(&text_input(
        "Phone number",
        "phone_nr",
        user.phone_nr.as_deref(),
        " placeholder=\"0XXXXXXXXX\"",
    ));
    content.push_str(&text_input("Age", "age", age.as_deref(), " inputmode=\"numeric\""));
    content.push_str(
        "<label>Password (current or new) <input name=\"password\" type=\"password\" required></label>\n",
    );
    content.push_str("<button type=\"submit\">Save</button>\n</form>\n");

    layout(page, "Profile", &content)
}
