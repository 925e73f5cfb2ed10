//! HTML fragments served by the rendering gateway. Both carry the `user`
//! element id so page checks can locate them.

pub const USER_ELEMENT_ID: &str = "user";

pub fn user_fragment(user_name: &str) -> String {
    format!(
        r#"<h1 id="{USER_ELEMENT_ID}">{}</h1>"#,
        escape_html(user_name)
    )
}

pub fn missing_user_fragment(user_id: &str) -> String {
    format!(
        r#"<h1 id="{USER_ELEMENT_ID}">No such user: {}</h1>"#,
        escape_html(user_id)
    )
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_name_inside_user_element() {
        assert_eq!(user_fragment("John"), r#"<h1 id="user">John</h1>"#);
    }

    #[test]
    fn renders_placeholder_with_requested_id() {
        assert_eq!(
            missing_user_fragment("42"),
            r#"<h1 id="user">No such user: 42</h1>"#
        );
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            user_fragment("<b>O'Neil & \"co\"</b>"),
            r#"<h1 id="user">&lt;b&gt;O&#x27;Neil &amp; &quot;co&quot;&lt;/b&gt;</h1>"#
        );
    }
}
