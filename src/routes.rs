use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower_cookies::CookieManagerLayer;
use tower_governor::governor::GovernorConfigBuilder;
use tower_http::{
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{
    handlers::{chat, common, snippets, users},
    middleware_layer::{
        auth::{authenticate, require_auth},
        csrf::{verify_csrf, MAX_FORM_BYTES},
        session::load_session,
    },
    state::AppState,
};

/// Builds the full application router.
///
/// The login and signup submissions are rate limited per peer IP when
/// `auth_rate_limit` is on, which needs the server to run with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(snippets::home))
        .route("/ping", get(common::ping))
        .route("/snippet/view/{id}", get(snippets::view))
        .route("/user/signup", get(users::signup_form))
        .route("/user/login", get(users::login_form))
        .route("/chat", get(chat::index))
        .route("/ws", get(chat::ws_upgrade))
        .with_state(state.clone());

    let mut credential_routes = Router::new()
        .route("/user/signup", post(users::signup))
        .route("/user/login", post(users::login))
        .with_state(state.clone());

    if state.config.auth_rate_limit {
        match GovernorConfigBuilder::default()
            .per_second(2)
            .burst_size(5)
            .finish()
        {
            Some(conf) => {
                credential_routes =
                    credential_routes.layer(tower_governor::GovernorLayer::new(Arc::new(conf)));
            }
            None => tracing::error!("❌ Invalid rate limiter settings, limiter disabled"),
        }
    }

    let protected_routes = Router::new()
        .route(
            "/snippet/create",
            get(snippets::create_form).post(snippets::create),
        )
        .route("/snippet/edit/{id}", get(snippets::edit_form))
        .route("/snippet/update/{id}", post(snippets::update))
        .route("/snippet/delete/{id}", post(snippets::delete))
        .route("/user/logout", post(users::logout))
        .route("/user/show", get(users::show))
        .route("/user/edit/{id}", get(users::edit_form))
        .route("/user/update/{id}", post(users::update))
        .route_layer(from_fn(require_auth))
        .with_state(state.clone());

    Router::new()
        .merge(public_routes)
        .merge(credential_routes)
        .merge(protected_routes)
        .nest_service("/static", ServeDir::new("ui/static"))
        .layer(from_fn_with_state(state.clone(), authenticate))
        .layer(from_fn_with_state(state.clone(), load_session))
        .layer(from_fn_with_state(state.clone(), verify_csrf))
        .layer(CookieManagerLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false))
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(DefaultBodyLimit::max(MAX_FORM_BYTES))
}
