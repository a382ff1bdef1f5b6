use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Extension,
};

use crate::{
    middleware_layer::csrf::CsrfToken,
    models::{context::RequestContext, session::CURRENT_USER_KEY},
    services::{auth::authenticated_user_id, session::Session},
    state::AppState,
};

/// Resolves who is making the request and stores a [`RequestContext`] in the
/// request extensions.
///
/// A session that names a deleted user is treated as anonymous.
pub async fn authenticate(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Extension(csrf): Extension<CsrfToken>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let mut ctx = RequestContext {
        csrf_token: csrf.0,
        ..RequestContext::default()
    };

    if let Some(user_id) = authenticated_user_id(&session).await {
        match state.users.exists(user_id).await {
            Ok(true) => {
                ctx.is_authenticated = true;
                ctx.user_id = Some(user_id);
                ctx.current_user = session.get(CURRENT_USER_KEY).await;
            }
            Ok(false) => {
                tracing::warn!("❌ Session names a missing user: {}", user_id);
            }
            Err(e) => return e.into_response(),
        }
    }

    request.extensions_mut().insert(ctx);
    next.run(request).await
}

/// A middleware that requires an authenticated user.
///
/// Anonymous callers are sent to the login page. Authenticated responses are
/// marked `no-store` so shared caches never keep them.
///
/// # Arguments
///
/// * `ctx` - The context built by [`authenticate`].
/// * `request` - The incoming request.
/// * `next` - The next middleware in the chain.
pub async fn require_auth(
    Extension(ctx): Extension<RequestContext>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !ctx.is_authenticated {
        tracing::debug!("🔐 Anonymous request to {} redirected", request.uri().path());
        let mut response = Redirect::to("/user/login").into_response();
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        return response;
    }

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
