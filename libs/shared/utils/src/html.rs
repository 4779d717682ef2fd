use axum::response::Html;

use shared_models::auth::SessionIdentity;
use shared_models::flash::Flash;

pub fn escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn navigation(identity: Option<&SessionIdentity>) -> String {
    match identity {
        Some(identity) => {
            let book = if identity.is_patient() {
                r#"<a href="/book_appointment">Book appointment</a>"#
            } else {
                ""
            };
            format!(
                r#"<nav><a href="/dashboard">Dashboard</a> {book}
<span class="who">{email} ({role})</span>
<form method="post" action="/logout" class="inline"><button type="submit">Log out</button></form></nav>"#,
                book = book,
                email = escape(&identity.email),
                role = identity.role,
            )
        }
        None => r#"<nav><a href="/">Home</a> <a href="/login">Log in</a> <a href="/register">Register</a></nav>"#
            .to_string(),
    }
}

fn notices(flashes: &[Flash]) -> String {
    flashes
        .iter()
        .map(|flash| {
            format!(
                r#"<div class="alert alert-{}">{}</div>"#,
                flash.level.as_str(),
                escape(&flash.message)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wraps a page body in the shared layout. `body` must already be escaped.
pub fn render_page(
    title: &str,
    identity: Option<&SessionIdentity>,
    flashes: &[Flash],
    body: &str,
) -> Html<String> {
    Html(format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} | MedTrack</title>
</head>
<body>
<header><h1>MedTrack</h1>
{nav}
</header>
<main>
{notices}
<h2>{title}</h2>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
        nav = navigation(identity),
        notices = notices(flashes),
        body = body,
    ))
}
