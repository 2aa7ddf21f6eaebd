//! Sign-up and sign-in pages.
//!
//! Both pages are thin HTML shells: they load the identity provider's hosted
//! widget script and give it a mount point. Credentials never touch this
//! service.

use axum::{extract::Extension, response::Html};
use std::sync::Arc;

/// Where the hosted widget lives and where it sends users once they are in.
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    script_url: String,
    after_auth_path: String,
}

impl WidgetConfig {
    #[must_use]
    pub fn new(script_url: String, after_auth_path: String) -> Self {
        Self {
            script_url,
            after_auth_path,
        }
    }

    #[must_use]
    pub fn script_url(&self) -> &str {
        &self.script_url
    }

    #[must_use]
    pub fn after_auth_path(&self) -> &str {
        &self.after_auth_path
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetMode {
    SignUp,
    SignIn,
}

impl WidgetMode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::SignUp => "sign-up",
            Self::SignIn => "sign-in",
        }
    }

    const fn title(self) -> &'static str {
        match self {
            Self::SignUp => "Sign up",
            Self::SignIn => "Sign in",
        }
    }
}

#[utoipa::path(
    get,
    path = "/sign-up",
    responses(
        (status = 200, description = "Hosted sign-up widget", body = String, content_type = "text/html")
    ),
    tag = "pages"
)]
pub async fn sign_up(widget: Extension<Arc<WidgetConfig>>) -> Html<String> {
    Html(render(&widget, WidgetMode::SignUp))
}

#[utoipa::path(
    get,
    path = "/sign-in",
    responses(
        (status = 200, description = "Hosted sign-in widget", body = String, content_type = "text/html")
    ),
    tag = "pages"
)]
pub async fn sign_in(widget: Extension<Arc<WidgetConfig>>) -> Html<String> {
    Html(render(&widget, WidgetMode::SignIn))
}

fn render(widget: &WidgetConfig, mode: WidgetMode) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<script async src="{script}"></script>
</head>
<body>
<main id="identity-widget" data-mode="{mode}" data-after-auth-url="{after}"></main>
</body>
</html>
"#,
        title = mode.title(),
        script = escape_attribute(widget.script_url()),
        mode = mode.as_str(),
        after = escape_attribute(widget.after_auth_path()),
    )
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> WidgetConfig {
        WidgetConfig::new(
            "https://accounts.example.com/widget.js?v=1&lang=en".to_string(),
            "/home".to_string(),
        )
    }

    #[test]
    fn sign_up_page_mounts_widget() {
        let html = render(&widget(), WidgetMode::SignUp);
        assert!(html.contains("<title>Sign up</title>"));
        assert!(html.contains(r#"data-mode="sign-up""#));
        assert!(html.contains(r#"data-after-auth-url="/home""#));
        assert!(html.contains(
            r#"src="https://accounts.example.com/widget.js?v=1&amp;lang=en""#
        ));
    }

    #[test]
    fn sign_in_page_mounts_widget() {
        let html = render(&widget(), WidgetMode::SignIn);
        assert!(html.contains("<title>Sign in</title>"));
        assert!(html.contains(r#"data-mode="sign-in""#));
    }

    #[test]
    fn script_url_cannot_break_out_of_attribute() {
        let widget = WidgetConfig::new(
            r#"https://x.test/"><script>alert(1)</script>"#.to_string(),
            "/home".to_string(),
        );
        let html = render(&widget, WidgetMode::SignUp);
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&quot;&gt;&lt;script&gt;"));
    }
}
