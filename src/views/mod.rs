//! Server-rendered HTML pages.
//!
//! Every dynamic value goes through [`escape`] before it reaches markup.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::models::context::RequestContext;
use crate::validation::validator::FormErrors;

pub mod chat;
pub mod snippets;
pub mod users;

/// Per-request data shared by every page.
pub struct Page<'a> {
    pub ctx: &'a RequestContext,
    pub flash: Option<String>,
}

/// Escapes text for use in element bodies and quoted attributes.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `02 Jan 2006 at 15:04` in UTC.
pub fn human_date(t: &DateTime<Utc>) -> String {
    t.format("%d %b %Y at %H:%M").to_string()
}

/// Hidden input carrying the CSRF token.
pub(crate) fn csrf_input(page: &Page<'_>) -> String {
    format!(
        r#"<input type="hidden" name="csrf_token" value="{}">"#,
        escape(&page.ctx.csrf_token)
    )
}

/// Error label for `field`, or nothing.
pub(crate) fn field_error(errors: &FormErrors, field: &str) -> String {
    errors
        .field(field)
        .map(|msg| format!(r#"<label class="error">{}</label>"#, escape(msg)))
        .unwrap_or_default()
}

pub(crate) fn non_field_errors(errors: &FormErrors) -> String {
    let mut out = String::new();
    for msg in errors.non_field() {
        let _ = write!(out, r#"<div class="error">{}</div>"#, escape(msg));
    }
    out
}

fn nav(page: &Page<'_>) -> String {
    let mut left = String::from(r#"<a href="/">Home</a> <a href="/chat">Chat</a>"#);
    let right = if page.ctx.is_authenticated {
        left.push_str(r#" <a href="/snippet/create">Create snippet</a> <a href="/user/show">Users</a>"#);
        format!(
            r#"<span>{}</span>
    <form action="/user/logout" method="POST">
      {}
      <button>Logout</button>
    </form>"#,
            escape(page.ctx.current_user.as_deref().unwrap_or("")),
            csrf_input(page),
        )
    } else {
        r#"<a href="/user/signup">Signup</a> <a href="/user/login">Login</a>"#.to_string()
    };
    format!("<nav>\n  <div>{left}</div>\n  <div>{right}</div>\n</nav>")
}

/// Wraps `body` in the shared layout.
pub fn layout(page: &Page<'_>, title: &str, body: &str) -> String {
    let flash = page
        .flash
        .as_deref()
        .map(|msg| format!(r#"<div class="flash">{}</div>"#, escape(msg)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} - Snipbox</title>
<link rel="stylesheet" href="/static/css/main.css">
</head>
<body>
<header><h1><a href="/">Snipbox</a></h1></header>
{nav}
<main>
{flash}
{body}
</main>
<footer>Powered by Rust</footer>
</body>
</html>"#,
        title = escape(title),
        nav = nav(page),
    )
}
