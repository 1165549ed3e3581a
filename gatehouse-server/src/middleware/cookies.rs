//! Session and notice cookies, and the extractors that read them.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use gatehouse_core::identity::{SessionTicket, User};

use crate::infra::{app_state::AppState, errors::AppError};

pub const SESSION_COOKIE: &str = "gatehouse_session";
pub const NOTICE_COOKIE: &str = "gatehouse_notice";

/// Value of cookie `name`, if present and non-empty.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name && !value.is_empty()).then(|| value.to_string())
        })
}

fn attributes(secure: bool) -> &'static str {
    if secure {
        "HttpOnly; SameSite=Lax; Path=/; Secure"
    } else {
        "HttpOnly; SameSite=Lax; Path=/"
    }
}

/// Persistent tickets outlive the browser session; the rest do not carry a
/// `Max-Age`.
pub fn session_cookie(ticket: &SessionTicket, secure: bool) -> String {
    let mut cookie = format!("{SESSION_COOKIE}={}; {}", ticket.token, attributes(secure));
    if ticket.persistent {
        let max_age = (ticket.expires_at - Utc::now()).num_seconds().max(0);
        cookie.push_str(&format!("; Max-Age={max_age}"));
    }
    cookie
}

pub fn notice_cookie(message: &str, secure: bool) -> String {
    format!(
        "{NOTICE_COOKIE}={}; {}",
        URL_SAFE_NO_PAD.encode(message.as_bytes()),
        attributes(secure)
    )
}

pub fn expired_cookie(name: &str, secure: bool) -> String {
    format!("{name}=; {}; Max-Age=0", attributes(secure))
}

fn decode_notice(value: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
    String::from_utf8(bytes).ok()
}

/// The raw session token from the request, if any.
#[derive(Debug, Clone, Default)]
pub struct SessionToken(pub Option<String>);

impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(read_cookie(&parts.headers, SESSION_COOKIE)))
    }
}

/// The one-shot notice left by the previous redirect.
///
/// `present` is true whenever the cookie was sent, even if it could not be
/// decoded, so the response still clears it.
#[derive(Debug, Clone, Default)]
pub struct PendingNotice {
    pub message: Option<String>,
    pub present: bool,
}

impl<S> FromRequestParts<S> for PendingNotice
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = read_cookie(&parts.headers, NOTICE_COOKIE);
        Ok(Self {
            present: raw.is_some(),
            message: raw.as_deref().and_then(decode_notice),
        })
    }
}

/// The signed-in user, resolved through the session authenticator.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<User>);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = read_cookie(&parts.headers, SESSION_COOKIE) else {
            return Ok(Self(None));
        };
        Ok(Self(state.sessions.authenticate(&token).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Duration;
    use uuid::Uuid;

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    fn ticket(persistent: bool) -> SessionTicket {
        SessionTicket {
            token: "tok".into(),
            user_id: Uuid::nil(),
            persistent,
            expires_at: Utc::now() + Duration::hours(2),
        }
    }

    #[test]
    fn reads_named_cookie_and_ignores_empty_values() {
        let headers = headers("a=1; gatehouse_session=abc; gatehouse_notice=");
        assert_eq!(read_cookie(&headers, SESSION_COOKIE).as_deref(), Some("abc"));
        assert_eq!(read_cookie(&headers, NOTICE_COOKIE), None);
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn only_persistent_sessions_get_max_age() {
        let browser = session_cookie(&ticket(false), false);
        assert_eq!(browser, "gatehouse_session=tok; HttpOnly; SameSite=Lax; Path=/");

        let persistent = session_cookie(&ticket(true), true);
        assert!(persistent.contains("; Secure; Max-Age="));
    }

    #[test]
    fn notice_survives_cookie_encoding() {
        let cookie = notice_cookie("Role created successfully!", false);
        let value = cookie
            .strip_prefix("gatehouse_notice=")
            .and_then(|rest| rest.split(';').next())
            .unwrap();
        assert!(!value.contains(' '));
        assert_eq!(decode_notice(value).as_deref(), Some("Role created successfully!"));
    }
}
