use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};

use crate::{
    error::{AppError, Result},
    handlers::common::{bind, page, parse_id},
    models::{
        context::RequestContext,
        session::{CURRENT_USER_KEY, FLASH_KEY},
    },
    services::{auth as auth_service, session::Session},
    state::AppState,
    validation::forms::{
        validate_login, validate_signup, validate_user_update, LoginForm, SignupForm,
        UserUpdateForm, BAD_CREDENTIALS, EMAIL_IN_USE,
    },
    views,
};

pub async fn signup_form(
    Extension(session): Extension<Session>,
    Extension(ctx): Extension<RequestContext>,
) -> Html<String> {
    let page = page(&session, &ctx).await;
    Html(views::users::signup(&page, &SignupForm::default()))
}

/// Handles user registration.
#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Extension(ctx): Extension<RequestContext>,
    form: std::result::Result<Form<SignupForm>, FormRejection>,
) -> Result<Response> {
    let mut form = bind(form)?;

    if validate_signup(&mut form) {
        match state
            .users
            .insert(&form.name, &form.email, &form.password)
            .await
        {
            Ok(()) => {
                tracing::info!("✅ User registered: {}", form.email);
                session
                    .put(FLASH_KEY, "Your signup was successful. Please log in.")
                    .await;
                return Ok(Redirect::to("/user/login").into_response());
            }
            Err(AppError::DuplicateEmail) => {
                form.errors.add_field_error("email", EMAIL_IN_USE);
            }
            Err(e) => return Err(e),
        }
    }

    form.password.clear();
    let page = page(&session, &ctx).await;
    Ok((
        StatusCode::UNPROCESSABLE_ENTITY,
        Html(views::users::signup(&page, &form)),
    )
        .into_response())
}

pub async fn login_form(
    Extension(session): Extension<Session>,
    Extension(ctx): Extension<RequestContext>,
) -> Html<String> {
    let page = page(&session, &ctx).await;
    Html(views::users::login(&page, &LoginForm::default()))
}

/// Handles user login.
///
/// Unknown email and wrong password render the same message.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Extension(ctx): Extension<RequestContext>,
    form: std::result::Result<Form<LoginForm>, FormRejection>,
) -> Result<Response> {
    let mut form = bind(form)?;

    if validate_login(&mut form) {
        match state.users.authenticate(&form.email, &form.password).await {
            Ok(user_id) => {
                let user = state.users.get(user_id).await?;
                auth_service::log_in(&session, &user).await?;
                return Ok(Redirect::to("/snippet/create").into_response());
            }
            Err(AppError::InvalidCredentials) => {
                tracing::warn!("❌ Failed login for {}", form.email);
                form.errors.add_non_field_error(BAD_CREDENTIALS);
            }
            Err(e) => return Err(e),
        }
    }

    form.password.clear();
    let page = page(&session, &ctx).await;
    Ok((
        StatusCode::UNPROCESSABLE_ENTITY,
        Html(views::users::login(&page, &form)),
    )
        .into_response())
}

pub async fn logout(Extension(session): Extension<Session>) -> Result<Redirect> {
    auth_service::log_out(&session).await?;
    Ok(Redirect::to("/"))
}

/// Lists every user.
pub async fn show(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Html<String>> {
    let users = state.users.list().await?;
    let page = page(&session, &ctx).await;
    Ok(Html(views::users::list(&page, &users)))
}

pub async fn edit_form(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<Html<String>> {
    let id = parse_id(&id)?;
    let user = state.users.get(id).await?;
    let page = page(&session, &ctx).await;
    Ok(Html(views::users::edit(&page, id, &UserUpdateForm::from(&user))))
}

/// Applies a profile edit.
///
/// Renaming yourself also refreshes the name shown in the navigation bar.
pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    form: std::result::Result<Form<UserUpdateForm>, FormRejection>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let mut form = bind(form)?;

    if validate_user_update(&mut form) {
        match state.users.update(id, &form.name, &form.email).await {
            Ok(_) => {
                if ctx.user_id == Some(id) {
                    session.put(CURRENT_USER_KEY, form.name.clone()).await;
                }
                tracing::info!("✅ User {} updated", id);
                session.put(FLASH_KEY, "Users successfully Updated!").await;
                return Ok(Redirect::to("/user/show").into_response());
            }
            Err(AppError::DuplicateEmail) => {
                form.errors.add_field_error("email", EMAIL_IN_USE);
            }
            Err(e) => return Err(e),
        }
    }

    let page = page(&session, &ctx).await;
    Ok((
        StatusCode::UNPROCESSABLE_ENTITY,
        Html(views::users::edit(&page, id, &form)),
    )
        .into_response())
}
