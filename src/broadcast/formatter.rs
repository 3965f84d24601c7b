use crate::models::{
    broadcast::{ParseMode, Payload},
    response::{BROADCAST_API_VERSION, DEVELOPER_CREDIT},
};

/// Placed between the body and the footer.
pub const FOOTER_SEPARATOR: &str = "\n\n";

pub fn footer_text() -> String {
    format!(
        "✨ This broadcast sent via Broadcast API {} Made With ❤️ By {} ✨",
        BROADCAST_API_VERSION, DEVELOPER_CREDIT
    )
}

/// Attribution footer rendered in `mode`.
pub fn render_footer(mode: ParseMode) -> String {
    let text = footer_text();
    match mode {
        ParseMode::Html => format!("<b><i><u>{}</u></i></b>", text),
        ParseMode::MarkdownV2 => format!("*_{}_*", escape_markdown_v2(&text)),
        ParseMode::Markdown => format!("*{}*", text),
    }
}

pub fn format_message(body: &str, mode: ParseMode) -> Payload {
    Payload {
        text: format!("{}{}{}", body, FOOTER_SEPARATOR, render_footer(mode)),
        parse_mode: mode,
    }
}

fn escape_markdown_v2(text: &str) -> String {
    const RESERVED: &[char] = &[
        '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
        '\\',
    ];

    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if RESERVED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_footer_follows_body() {
        let payload = format_message("Hello <b>all</b>", ParseMode::Html);

        assert!(payload.text.starts_with("Hello <b>all</b>\n\n<b><i><u>"));
        assert!(payload.text.ends_with("</u></i></b>"));
        assert!(payload.text.contains("Broadcast API v1.0.0"));
        assert_eq!(payload.parse_mode, ParseMode::Html);
    }

    #[test]
    fn markdown_v2_footer_is_escaped() {
        let footer = render_footer(ParseMode::MarkdownV2);

        assert!(footer.starts_with("*_"));
        assert!(footer.contains(r"v1\.0\.0"));
        assert!(!footer.contains("v1.0.0"));
    }

    #[test]
    fn formatting_is_deterministic() {
        assert_eq!(
            format_message("x", ParseMode::Markdown),
            format_message("x", ParseMode::Markdown)
        );
    }
}
