use crate::AppState;
use crate::error::Error;
use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use core_types::User;

/// Extractor that resolves the `sid` session cookie to the logged-in user.
///
/// Handlers that take a `CurrentUser` argument are authenticated routes:
/// a missing, unknown, or expired session rejects the request with a 401
/// before the handler body runs.
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or(Error::Unauthorized)?;

        match state.db.get_session_user(&token).await? {
            Some(user) => Ok(CurrentUser(user)),
            None => Err(Error::Unauthorized),
        }
    }
}

/// Pulls the session token out of the request's Cookie headers, if any.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|header| cookie_value(header, auth::SESSION_COOKIE))
}

fn cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}
