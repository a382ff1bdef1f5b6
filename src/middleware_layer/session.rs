use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_cookies::cookie::{time::Duration, SameSite};
use tower_cookies::{Cookie, Cookies};

use crate::{
    models::session::SessionData,
    services::session::Session,
    state::AppState,
};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session_id";

/// Creates an `HttpOnly`, `SameSite=Lax` cookie scoped to the whole site.
///
/// # Arguments
///
/// * `name` - The cookie name.
/// * `value` - The cookie value.
/// * `max_age_secs` - Lifetime of the cookie in seconds.
/// * `secure` - Whether browsers may only send it over HTTPS.
pub(crate) fn build_cookie(
    name: &'static str,
    value: String,
    max_age_secs: u64,
    secure: bool,
) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(Duration::seconds(max_age_secs as i64));
    cookie.set_path("/");
    cookie
}

/// Loads the caller's session, hands it to the handler and persists it
/// afterwards.
///
/// Unknown or expired tokens are discarded so a client can never pick its
/// own session id.
pub async fn load_session(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let presented = cookies.get(SESSION_COOKIE).map(|c| c.value().to_string());

    let loaded = match presented.as_deref() {
        Some(token) => match state.sessions.load(token).await {
            Ok(data) => data.map(|data| (token.to_string(), data)),
            Err(e) => return e.into_response(),
        },
        None => None,
    };

    let session = match loaded {
        Some((token, data)) => Session::new(state.sessions.clone(), Some(token), data),
        None => {
            if presented.is_some() {
                tracing::debug!("🔍 Unknown or expired session cookie ignored");
            }
            Session::new(state.sessions.clone(), None, SessionData::default())
        }
    };

    request.extensions_mut().insert(session.clone());
    let response = next.run(request).await;

    let ttl = state.config.session_ttl_secs();
    match session.commit(ttl).await {
        Ok(Some(token)) => {
            cookies.add(build_cookie(
                SESSION_COOKIE,
                token,
                ttl,
                state.config.secure_cookies,
            ));
        }
        Ok(None) => {}
        Err(e) => return e.into_response(),
    }

    response
}
