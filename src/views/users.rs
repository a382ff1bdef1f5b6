use std::fmt::Write;

use crate::models::user::User;
use crate::validation::forms::{LoginForm, SignupForm, UserUpdateForm};
use crate::views::{csrf_input, escape, field_error, human_date, layout, non_field_errors, Page};

pub fn signup(page: &Page<'_>, form: &SignupForm) -> String {
    let body = format!(
        r#"<form action="/user/signup" method="POST" novalidate>
  {csrf}
  <div>
    <label>Name:</label>
    {name_error}
    <input type="text" name="name" value="{name}">
  </div>
  <div>
    <label>Email:</label>
    {email_error}
    <input type="email" name="email" value="{email}">
  </div>
  <div>
    <label>Password:</label>
    {password_error}
    <input type="password" name="password">
  </div>
  <div>
    <input type="submit" value="Signup">
  </div>
</form>"#,
        csrf = csrf_input(page),
        name_error = field_error(&form.errors, "name"),
        name = escape(&form.name),
        email_error = field_error(&form.errors, "email"),
        email = escape(&form.email),
        password_error = field_error(&form.errors, "password"),
    );
    layout(page, "Signup", &body)
}

pub fn login(page: &Page<'_>, form: &LoginForm) -> String {
    let body = format!(
        r#"<form action="/user/login" method="POST" novalidate>
  {csrf}
  {non_field}
  <div>
    <label>Email:</label>
    {email_error}
    <input type="email" name="email" value="{email}">
  </div>
  <div>
    <label>Password:</label>
    {password_error}
    <input type="password" name="password">
  </div>
  <div>
    <input type="submit" value="Login">
  </div>
</form>"#,
        csrf = csrf_input(page),
        non_field = non_field_errors(&form.errors),
        email_error = field_error(&form.errors, "email"),
        email = escape(&form.email),
        password_error = field_error(&form.errors, "password"),
    );
    layout(page, "Login", &body)
}

/// Every registered user with a link to their edit form.
pub fn list(page: &Page<'_>, users: &[User]) -> String {
    let mut rows = String::new();
    for user in users {
        let _ = write!(
            rows,
            r#"<tr>
  <td>{id}</td>
  <td>{name}</td>
  <td>{email}</td>
  <td>{joined}</td>
  <td><a href="/user/edit/{id}">Edit</a></td>
</tr>
"#,
            id = user.id,
            name = escape(&user.name),
            email = escape(&user.email),
            joined = human_date(&user.created),
        );
    }
    let body = format!(
        r#"<h2>Users</h2>
<table>
  <tr><th>ID</th><th>Name</th><th>Email</th><th>Joined</th><th></th></tr>
{rows}</table>"#
    );
    layout(page, "Users", &body)
}

pub fn edit(page: &Page<'_>, id: i64, form: &UserUpdateForm) -> String {
    let body = format!(
        r#"<form action="/user/update/{id}" method="POST" novalidate>
  {csrf}
  <div>
    <label>Name:</label>
    {name_error}
    <input type="text" name="name" value="{name}">
  </div>
  <div>
    <label>Email:</label>
    {email_error}
    <input type="email" name="email" value="{email}">
  </div>
  <div>
    <input type="submit" value="Update user">
  </div>
</form>"#,
        csrf = csrf_input(page),
        name_error = field_error(&form.errors, "name"),
        name = escape(&form.name),
        email_error = field_error(&form.errors, "email"),
        email = escape(&form.email),
    );
    layout(page, &format!("Edit User #{}", id), &body)
}
