use std::fmt::Write;

use crate::models::snippet::{Snippet, PERMITTED_EXPIRY_DAYS};
use crate::validation::forms::SnippetForm;
use crate::views::{csrf_input, escape, field_error, human_date, layout, Page};

pub fn home(page: &Page<'_>, snippets: &[Snippet]) -> String {
    let body = if snippets.is_empty() {
        "<h2>Latest Snippets</h2>\n<p>There's nothing to see here... yet!</p>".to_string()
    } else {
        let mut rows = String::new();
        for s in snippets {
            let _ = write!(
                rows,
                r#"<tr>
  <td><a href="/snippet/view/{id}">{title}</a></td>
  <td>{created}</td>
  <td>#{id}</td>
</tr>
"#,
                id = s.id,
                title = escape(&s.title),
                created = human_date(&s.created),
            );
        }
        format!(
            r#"<h2>Latest Snippets</h2>
<table>
  <tr><th>Title</th><th>Created</th><th>ID</th></tr>
{rows}</table>"#
        )
    };
    layout(page, "Home", &body)
}

pub fn view(page: &Page<'_>, snippet: &Snippet) -> String {
    let mut actions = String::new();
    if page.ctx.is_authenticated {
        let _ = write!(
            actions,
            r#"<div class="actions">
  <a href="/snippet/edit/{id}">Edit</a>
  <form action="/snippet/delete/{id}" method="POST">
    {csrf}
    <button>Delete</button>
  </form>
</div>"#,
            id = snippet.id,
            csrf = csrf_input(page),
        );
    }

    let body = format!(
        r#"<div class="snippet">
  <div class="metadata">
    <strong>{title}</strong>
    <span>#{id}</span>
  </div>
  <pre><code>{content}</code></pre>
  <div class="metadata">
    <span>By {author}</span>
    <time>Created: {created}</time>
    <time>Updated: {updated}</time>
    <time>Expires: {expires}</time>
  </div>
</div>
{actions}"#,
        title = escape(&snippet.title),
        id = snippet.id,
        content = escape(&snippet.content),
        author = escape(&snippet.author_name),
        created = human_date(&snippet.created),
        updated = human_date(&snippet.updated_at),
        expires = human_date(&snippet.expires),
    );
    layout(page, &format!("Snippet #{}", snippet.id), &body)
}

pub fn create(page: &Page<'_>, form: &SnippetForm) -> String {
    let body = snippet_form(page, "/snippet/create", form, "Publish snippet");
    layout(page, "Create a New Snippet", &body)
}

pub fn edit(page: &Page<'_>, id: i64, form: &SnippetForm) -> String {
    let body = snippet_form(page, &format!("/snippet/update/{}", id), form, "Update snippet");
    layout(page, &format!("Edit Snippet #{}", id), &body)
}

fn snippet_form(page: &Page<'_>, action: &str, form: &SnippetForm, submit: &str) -> String {
    let mut expiry = String::new();
    for days in PERMITTED_EXPIRY_DAYS {
        let label = match days {
            1 => "One Day",
            7 => "One Week",
            _ => "One Year",
        };
        let checked = if form.expires == days { " checked" } else { "" };
        let _ = write!(
            expiry,
            r#"<input type="radio" name="expires" value="{days}"{checked}> {label} "#
        );
    }

    format!(
        r#"<form action="{action}" method="POST">
  {csrf}
  <div>
    <label>Title:</label>
    {title_error}
    <input type="text" name="title" value="{title}">
  </div>
  <div>
    <label>Content:</label>
    {content_error}
    <textarea name="content">{content}</textarea>
  </div>
  <div>
    <label>Author:</label>
    <input type="text" name="author_name" value="{author}">
  </div>
  <div>
    <label>Delete in:</label>
    {expires_error}
    {expiry}
  </div>
  <div>
    <input type="submit" value="{submit}">
  </div>
</form>"#,
        action = escape(action),
        csrf = csrf_input(page),
        title_error = field_error(&form.errors, "title"),
        title = escape(&form.title),
        content_error = field_error(&form.errors, "content"),
        content = escape(&form.content),
        author = escape(&form.author_name),
        expires_error = field_error(&form.errors, "expires"),
        submit = escape(submit),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::context::RequestContext;
    use crate::validation::forms::validate_snippet;

    #[test]
    fn invalid_form_keeps_input_and_shows_messages() {
        let ctx = RequestContext::default();
        let page = Page { ctx: &ctx, flash: None };
        let mut form = SnippetForm {
            title: String::new(),
            content: "<b>kept</b>".into(),
            expires: 7,
            ..SnippetForm::default()
        };
        assert!(!validate_snippet(&mut form));

        let html = create(&page, &form);
        assert!(html.contains("This field cannot be blank"));
        assert!(html.contains("&lt;b&gt;kept&lt;/b&gt;"));
        assert!(html.contains(r#"value="7" checked"#));
    }
}
