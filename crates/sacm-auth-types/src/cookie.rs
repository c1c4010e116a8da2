//! Cookie builders for the token pair and the account-activation session.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Cookie name for the access token.
pub const SACM_ACCESS_TOKEN: &str = "sacm_access_token";

/// Cookie name for the refresh token.
pub const SACM_REFRESH_TOKEN: &str = "sacm_refresh_token";

/// Cookie name carrying the activation session id.
pub const SACM_ACTIVATION: &str = "sacm_activation";

/// Access-token JWT lifetime in seconds (4 hours).
pub const ACCESS_TOKEN_EXP: u64 = 14400;

/// Refresh-token JWT lifetime and cookie Max-Age for both tokens, in seconds (7 days).
pub const REFRESH_TOKEN_EXP: u64 = 604800;

/// Activation session lifetime in seconds (30 minutes). Redis TTL uses the same value.
pub const ACTIVATION_SESSION_EXP: u64 = 1800;

const REFRESH_PATH: &str = "/auth/token";
const ACTIVATION_PATH: &str = "/auth/activation";

fn build(
    name: &'static str,
    value: String,
    path: &'static str,
    domain: String,
    max_age: Duration,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .path(path)
        .domain(domain)
        .max_age(max_age)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Set the access-token cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use sacm_auth_types::cookie::{set_access_token_cookie, SACM_ACCESS_TOKEN};
///
/// let jar = CookieJar::new();
/// let jar = set_access_token_cookie(jar, "token_value".to_string(), "uni.example".to_string());
/// let cookie = jar.get(SACM_ACCESS_TOKEN).unwrap();
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.domain(), Some("uni.example"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(604800)));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// ```
pub fn set_access_token_cookie(jar: CookieJar, value: String, domain: String) -> CookieJar {
    jar.add(build(
        SACM_ACCESS_TOKEN,
        value,
        "/",
        domain,
        Duration::seconds(REFRESH_TOKEN_EXP as i64),
    ))
}

/// Set the refresh-token cookie on the jar. Scoped to the token endpoint.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use sacm_auth_types::cookie::{set_refresh_token_cookie, SACM_REFRESH_TOKEN};
///
/// let jar = CookieJar::new();
/// let jar = set_refresh_token_cookie(jar, "refresh_value".to_string(), "uni.example".to_string());
/// let cookie = jar.get(SACM_REFRESH_TOKEN).unwrap();
/// assert_eq!(cookie.path(), Some("/auth/token"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(604800)));
/// ```
pub fn set_refresh_token_cookie(jar: CookieJar, value: String, domain: String) -> CookieJar {
    jar.add(build(
        SACM_REFRESH_TOKEN,
        value,
        REFRESH_PATH,
        domain,
        Duration::seconds(REFRESH_TOKEN_EXP as i64),
    ))
}

/// Clear both token cookies by setting Max-Age to 0.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use sacm_auth_types::cookie::{
///     clear_cookies, set_access_token_cookie, set_refresh_token_cookie,
///     SACM_ACCESS_TOKEN, SACM_REFRESH_TOKEN,
/// };
///
/// let jar = CookieJar::new();
/// let jar = set_access_token_cookie(jar, "a".to_string(), "uni.example".to_string());
/// let jar = set_refresh_token_cookie(jar, "r".to_string(), "uni.example".to_string());
/// let jar = clear_cookies(jar, "uni.example".to_string());
/// assert_eq!(jar.get(SACM_ACCESS_TOKEN).unwrap().max_age(), Some(time::Duration::ZERO));
/// assert_eq!(jar.get(SACM_REFRESH_TOKEN).unwrap().max_age(), Some(time::Duration::ZERO));
/// ```
pub fn clear_cookies(jar: CookieJar, domain: String) -> CookieJar {
    let access = build(
        SACM_ACCESS_TOKEN,
        String::new(),
        "/",
        domain.clone(),
        Duration::ZERO,
    );
    let refresh = build(
        SACM_REFRESH_TOKEN,
        String::new(),
        REFRESH_PATH,
        domain,
        Duration::ZERO,
    );
    jar.add(access).add(refresh)
}

/// Set the activation-session cookie. Only sent to the activation endpoints.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use sacm_auth_types::cookie::{set_activation_cookie, SACM_ACTIVATION};
///
/// let jar = set_activation_cookie(CookieJar::new(), "sid".to_string(), "uni.example".to_string());
/// let cookie = jar.get(SACM_ACTIVATION).unwrap();
/// assert_eq!(cookie.value(), "sid");
/// assert_eq!(cookie.path(), Some("/auth/activation"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(1800)));
/// ```
pub fn set_activation_cookie(jar: CookieJar, session_id: String, domain: String) -> CookieJar {
    jar.add(build(
        SACM_ACTIVATION,
        session_id,
        ACTIVATION_PATH,
        domain,
        Duration::seconds(ACTIVATION_SESSION_EXP as i64),
    ))
}

/// Expire the activation-session cookie.
pub fn clear_activation_cookie(jar: CookieJar, domain: String) -> CookieJar {
    jar.add(build(
        SACM_ACTIVATION,
        String::new(),
        ACTIVATION_PATH,
        domain,
        Duration::ZERO,
    ))
}
