use lambda_http::http::header::COOKIE;
use lambda_http::Request;

pub const AUTH_TOKEN: &str = "auth-token";
pub const STATE_TOKEN: &str = "state-token";
pub const INVITE_TOKEN: &str = "invite-token";

/// All `Cookie` headers of the request joined into one header value.
pub fn cookie_header(event: &Request) -> Option<String> {
    let values: Vec<&str> = event
        .headers()
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.join("; "))
    }
}

/// Value of cookie `name`, if present and non-empty.
pub fn read<'a>(cookie_header: Option<&'a str>, name: &str) -> Option<&'a str> {
    cookie_header?
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| k.trim() == name)
        .map(|(_, v)| v.trim())
        .filter(|v| !v.is_empty())
}

/// `Set-Cookie` value for a token cookie living `max_age_secs`.
pub fn set(name: &str, value: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; Secure; SameSite=None",
        name, value, max_age_secs
    )
}

/// `Set-Cookie` value that makes the browser drop cookie `name`.
pub fn clear(name: &str) -> String {
    format!("{}=; Path=/; Max-Age=0; HttpOnly; Secure; SameSite=None", name)
}
