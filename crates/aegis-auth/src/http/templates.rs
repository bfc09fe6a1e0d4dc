//! Server-rendered HTML for the login flow.
//!
//! The login form carries the validated authorization parameters through
//! as hidden fields, so no server-side session is needed between the
//! authorize and login steps. All interpolated values are HTML-escaped.

use crate::oauth::authorize::AuthorizationRequest;

/// Escapes a string for safe embedding in HTML attribute values and text.
fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
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

/// Renders a hidden input carrying one authorize parameter through the form.
fn hidden_field(name: &str, value: &str) -> String {
    format!(
        r#"<input type="hidden" name="{}" value="{}">"#,
        escape_html(name),
        escape_html(value)
    )
}

/// Renders the login form for an authorization request.
///
/// # Arguments
///
/// * `client_name` - Display name of the requesting client
/// * `request` - The validated authorization request, carried through as
///   hidden fields
/// * `error` - Optional failure message from a previous attempt
#[must_use]
pub fn render_login_form(
    client_name: &str,
    request: &AuthorizationRequest,
    error: Option<&str>,
) -> String {
    let mut hidden = String::new();
    hidden.push_str(&hidden_field("response_type", &request.response_type));
    hidden.push_str(&hidden_field("client_id", &request.client_id));
    hidden.push_str(&hidden_field("redirect_uri", &request.redirect_uri));
    hidden.push_str(&hidden_field("scope", &request.scope));
    if let Some(ref state) = request.state {
        hidden.push_str(&hidden_field("state", state));
    }
    hidden.push_str(&hidden_field("code_challenge", &request.code_challenge));
    hidden.push_str(&hidden_field(
        "code_challenge_method",
        &request.code_challenge_method,
    ));
    if let Some(ref nonce) = request.nonce {
        hidden.push_str(&hidden_field("nonce", nonce));
    }

    let error_block = error.map_or_else(String::new, |msg| {
        format!(r#"<p class="error">{}</p>"#, escape_html(msg))
    });

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Sign in</title>
<style>
  body {{ font-family: system-ui, sans-serif; max-width: 24rem; margin: 4rem auto; }}
  label {{ display: block; margin-top: 1rem; }}
  input[type=text], input[type=password] {{ width: 100%; padding: 0.5rem; }}
  button {{ margin-top: 1.5rem; padding: 0.5rem 1.5rem; }}
  .error {{ color: #b00020; }}
</style>
</head>
<body>
<h1>Sign in to {client}</h1>
{error_block}
<form method="post" action="/login">
{hidden}
<label>Username
<input type="text" name="username" autocomplete="username" autofocus required>
</label>
<label>Password
<input type="password" name="password" autocomplete="current-password" required>
</label>
<button type="submit">Sign in</button>
</form>
</body>
</html>
"#,
        client = escape_html(client_name),
    )
}

/// Renders a terminal error page.
///
/// Used when the request cannot be safely redirected back to the client
/// (unknown client, unregistered redirect URI) or carries invalid
/// parameters. Authorization codes and tokens are never echoed here.
#[must_use]
pub fn render_error_page(error: &str, description: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Authorization error</title>
<style>
  body {{ font-family: system-ui, sans-serif; max-width: 30rem; margin: 4rem auto; }}
  code {{ background: #eee; padding: 0.1rem 0.3rem; }}
</style>
</head>
<body>
<h1>Authorization error</h1>
<p><code>{error}</code></p>
<p>{description}</p>
</body>
</html>
"#,
        error = escape_html(error),
        description = escape_html(description),
    )
}
