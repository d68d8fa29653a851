//! Session cookie builders.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::token::SESSION_TOKEN_EXP;

/// Cookie name for the session token.
pub const IELS_SESSION: &str = "iels_session";

fn session_cookie(value: String, domain: String, max_age: Duration) -> Cookie<'static> {
    Cookie::build((IELS_SESSION, value))
        .path("/")
        .domain(domain)
        .max_age(max_age)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Add the session cookie. It lives as long as the token inside it.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use iels_auth_types::cookie::{set_session_cookie, IELS_SESSION};
///
/// let jar = set_session_cookie(CookieJar::new(), "token".to_string(), "example.com".to_string());
/// let cookie = jar.get(IELS_SESSION).unwrap();
/// assert_eq!(cookie.value(), "token");
/// assert_eq!(cookie.domain(), Some("example.com"));
/// ```
pub fn set_session_cookie(jar: CookieJar, value: String, domain: String) -> CookieJar {
    jar.add(session_cookie(
        value,
        domain,
        Duration::seconds(SESSION_TOKEN_EXP as i64),
    ))
}

/// Overwrite the session cookie with an empty, already-expired one.
pub fn clear_session_cookie(jar: CookieJar, domain: String) -> CookieJar {
    jar.add(session_cookie(String::new(), domain, Duration::ZERO))
}
