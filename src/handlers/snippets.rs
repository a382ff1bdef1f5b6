use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};

use crate::{
    error::Result,
    handlers::common::{bind, page, parse_id},
    models::{context::RequestContext, session::FLASH_KEY},
    services::session::Session,
    state::AppState,
    validation::forms::{validate_snippet, SnippetForm},
    views,
};

/// Lists the latest live snippets.
pub async fn home(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Html<String>> {
    let snippets = state.snippets.latest().await?;
    let page = page(&session, &ctx).await;
    Ok(Html(views::snippets::home(&page, &snippets)))
}

/// Shows one snippet. Expired and missing snippets are both 404.
pub async fn view(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<Html<String>> {
    let id = parse_id(&id)?;
    let snippet = state.snippets.get(id).await?;
    let page = page(&session, &ctx).await;
    Ok(Html(views::snippets::view(&page, &snippet)))
}

pub async fn create_form(
    Extension(session): Extension<Session>,
    Extension(ctx): Extension<RequestContext>,
) -> Html<String> {
    let page = page(&session, &ctx).await;
    Html(views::snippets::create(&page, &SnippetForm::default()))
}

/// Validates and stores a new snippet.
///
/// # Returns
///
/// `303` to the new snippet, or `422` with the form re-rendered.
pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Extension(ctx): Extension<RequestContext>,
    form: std::result::Result<Form<SnippetForm>, FormRejection>,
) -> Result<Response> {
    let mut form = bind(form)?;
    if !validate_snippet(&mut form) {
        let page = page(&session, &ctx).await;
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(views::snippets::create(&page, &form)),
        )
            .into_response());
    }

    let id = state
        .snippets
        .insert(&form.title, &form.content, form.expires, &form.author_name)
        .await?;
    tracing::info!("📝 Snippet {} created", id);

    session.put(FLASH_KEY, "Snippet successfully created!").await;
    Ok(Redirect::to(&format!("/snippet/view/{}", id)).into_response())
}

pub async fn edit_form(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<Html<String>> {
    let id = parse_id(&id)?;
    let snippet = state.snippets.get(id).await?;
    let page = page(&session, &ctx).await;
    Ok(Html(views::snippets::edit(&page, id, &SnippetForm::from(&snippet))))
}

/// Overwrites a snippet with the submitted fields.
pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    form: std::result::Result<Form<SnippetForm>, FormRejection>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let mut form = bind(form)?;
    if !validate_snippet(&mut form) {
        let page = page(&session, &ctx).await;
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(views::snippets::edit(&page, id, &form)),
        )
            .into_response());
    }

    state
        .snippets
        .update(id, &form.title, &form.content, form.expires, &form.author_name)
        .await?;
    tracing::info!("📝 Snippet {} updated", id);

    session.put(FLASH_KEY, "Snippet successfully Updated!").await;
    Ok(Redirect::to("/").into_response())
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let id = parse_id(&id)?;
    state.snippets.delete(id).await?;
    tracing::info!("🗑️ Snippet {} deleted", id);

    session.put(FLASH_KEY, "Snippet successfully Deleted!").await;
    Ok(Redirect::to("/"))
}
