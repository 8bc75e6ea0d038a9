//! Shared-password gate in front of the admin.
//!
//! A successful login stores the session expiry (unix seconds) in a signed
//! cookie. The signing key lives in [`AppState`] and is generated at startup,
//! so restarting the server ends every session.

use axum::{
    Form,
    extract::{Query, Request, State},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use constant_time_eq::constant_time_eq;
use serde::Deserialize;
use time::OffsetDateTime;

use super::templates;
use crate::AppState;

pub const SESSION_COOKIE: &str = "admin_session";
pub const LOGIN_PATH: &str = "/admin/login";
const HOME_PATH: &str = "/admin/";

fn session_valid(jar: &SignedCookieJar, now: i64) -> bool {
    jar.get(SESSION_COOKIE)
        .and_then(|c| c.value().parse::<i64>().ok())
        .is_some_and(|expires| expires > now)
}

fn password_matches(given: &str, expected: &str) -> bool {
    constant_time_eq(given.as_bytes(), expected.as_bytes())
}

/// Only admin-local paths are followed after login.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with("/admin/") && !path.starts_with("//") => path,
        _ => HOME_PATH,
    }
}

pub async fn require_admin(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.admin_gate_enabled()
        || session_valid(&jar, OffsetDateTime::now_utc().unix_timestamp())
    {
        return next.run(request).await;
    }

    let target = request.uri().path_and_query().map(|p| p.as_str()).unwrap_or(HOME_PATH);
    Redirect::to(&format!("{LOGIN_PATH}?next={}", urlencoding::encode(target))).into_response()
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    password: String,
    next: Option<String>,
}

pub async fn login_page(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> Response {
    if !state.config.admin_gate_enabled() {
        return Redirect::to(HOME_PATH).into_response();
    }
    Html(templates::login_page(safe_next(query.next.as_deref()), None)).into_response()
}

pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let next = safe_next(form.next.as_deref()).to_string();
    if !state.config.admin_gate_enabled() {
        return Redirect::to(&next).into_response();
    }

    if !password_matches(&form.password, &state.config.admin_password) {
        tracing::warn!("admin login failed");
        let body = templates::login_page(&next, Some("Please enter the correct password."));
        return (axum::http::StatusCode::UNAUTHORIZED, Html(body)).into_response();
    }

    let lifetime = time::Duration::hours(state.config.admin_session_hours);
    let expires = (OffsetDateTime::now_utc() + lifetime).unix_timestamp();
    let cookie = Cookie::build((SESSION_COOKIE, expires.to_string()))
        .path("/admin")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(lifetime);

    tracing::info!(expires, "admin session started");
    (jar.add(cookie), Redirect::to(&next)).into_response()
}

pub async fn logout(jar: SignedCookieJar) -> impl IntoResponse {
    (jar.remove(Cookie::build(SESSION_COOKIE).path("/admin")), Redirect::to(LOGIN_PATH))
}

#[cfg(test)]
mod tests {
    use axum_extra::extract::cookie::Key;

    use super::*;

    #[test]
    fn next_stays_inside_admin() {
        assert_eq!(safe_next(Some("/admin/movie/?o=name")), "/admin/movie/?o=name");
        assert_eq!(safe_next(Some("https://evil.example/")), "/admin/");
        assert_eq!(safe_next(Some("/directors")), "/admin/");
        assert_eq!(safe_next(None), "/admin/");
    }

    #[test]
    fn password_must_match_exactly() {
        assert!(password_matches("hunter2", "hunter2"));
        assert!(!password_matches("hunter3", "hunter2"));
        assert!(!password_matches("hunter", "hunter2"));
        assert!(!password_matches("", "hunter2"));
    }

    #[test]
    fn expired_sessions_are_rejected() {
        let jar = SignedCookieJar::new(Key::generate()).add(Cookie::new(SESSION_COOKIE, "1000"));
        assert!(session_valid(&jar, 999));
        assert!(!session_valid(&jar, 1000));
        assert!(!session_valid(&SignedCookieJar::new(Key::generate()), 0));
    }
}
