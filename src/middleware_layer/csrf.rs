use axum::{
    body::{to_bytes, Body},
    extract::{FromRequest, Request, State},
    http::{header, Method},
    middleware::Next,
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tower_cookies::Cookies;

use crate::{
    crypto::token::{generate_token, tokens_match},
    error::AppError,
    middleware_layer::session::build_cookie,
    state::AppState,
};

/// Name of the cookie and form field carrying the CSRF token.
pub const CSRF_COOKIE: &str = "csrf_token";
/// Header accepted in place of the form field.
pub const CSRF_HEADER: &str = "x-csrf-token";
/// Largest form body buffered for verification.
pub const MAX_FORM_BYTES: usize = 1024 * 1024;

/// The token forms must echo back, exposed to handlers and views.
#[derive(Clone, Debug)]
pub struct CsrfToken(pub String);

#[derive(Deserialize, Default)]
#[serde(default)]
struct CsrfField {
    csrf_token: String,
}

/// A middleware that verifies the CSRF token on state-changing requests.
///
/// The token lives in a cookie and must be repeated either in the
/// `csrf_token` form field or in the `x-csrf-token` header.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `cookies` - The request cookies.
/// * `req` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// The handler's `Response`, or `400 Bad Request` when verification fails.
pub async fn verify_csrf(
    State(state): State<AppState>,
    cookies: Cookies,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let cookie_token = cookies.get(CSRF_COOKIE).map(|c| c.value().to_string());

    if req.method() == Method::GET
        || req.method() == Method::HEAD
        || req.method() == Method::OPTIONS
    {
        let token = match cookie_token {
            Some(token) => token,
            None => {
                let token = generate_token();
                cookies.add(build_cookie(
                    CSRF_COOKIE,
                    token.clone(),
                    state.config.session_ttl_secs(),
                    state.config.secure_cookies,
                ));
                token
            }
        };
        req.extensions_mut().insert(CsrfToken(token));
        return next.run(req).await;
    }

    let Some(expected) = cookie_token else {
        return AppError::Csrf("missing csrf_token cookie".to_string()).into_response();
    };

    let header_token = req
        .headers()
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let (submitted, mut req) = match header_token {
        Some(token) => (token, req),
        None => match read_form_token(req).await {
            Ok(pair) => pair,
            Err(e) => return e.into_response(),
        },
    };

    if !tokens_match(&expected, &submitted) {
        return AppError::Csrf("token mismatch".to_string()).into_response();
    }

    tracing::debug!("✅ CSRF token valid");
    req.extensions_mut().insert(CsrfToken(expected));
    next.run(req).await
}

/// Buffers the body, pulls out `csrf_token` and rebuilds the request.
async fn read_form_token(req: Request<Body>) -> Result<(String, Request<Body>), AppError> {
    let (parts, body) = req.into_parts();
    let bytes = to_bytes(body, MAX_FORM_BYTES)
        .await
        .map_err(|e| AppError::BadRequest(format!("unreadable body: {}", e)))?;

    let mut replay = Request::new(Body::from(bytes.clone()));
    *replay.method_mut() = Method::POST;
    if let Some(content_type) = parts.headers.get(header::CONTENT_TYPE) {
        replay
            .headers_mut()
            .insert(header::CONTENT_TYPE, content_type.clone());
    }

    let submitted = match Form::<CsrfField>::from_request(replay, &()).await {
        Ok(Form(field)) => field.csrf_token,
        Err(_) => String::new(),
    };

    Ok((submitted, Request::from_parts(parts, Body::from(bytes))))
}
