use serde::Deserialize;

use crate::models::snippet::{Snippet, DEFAULT_EXPIRY_DAYS, PERMITTED_EXPIRY_DAYS};
use crate::models::user::User;
use crate::validation::validator::{
    matches, max_chars, min_chars, not_blank, permitted_value, FormErrors, EMAIL_RX,
};

const BLANK: &str = "This field cannot be blank";
const TOO_LONG: &str = "This field cannot be more than 100 characters long";
const BAD_EXPIRY: &str = "This field must equal 1, 7 or 365";
const BAD_EMAIL: &str = "This field must be a valid email address";
const SHORT_PASSWORD: &str = "This field must be at least 8 characters long";

/// Attached to the email field when signup or profile update hits the unique
/// constraint.
pub const EMAIL_IN_USE: &str = "Email address is already in use";
/// Non-field error shown for any failed login.
pub const BAD_CREDENTIALS: &str = "Email or password is incorrect";

/// Fields of the create and edit snippet forms.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SnippetForm {
    pub title: String,
    pub content: String,
    pub expires: i32,
    pub author_name: String,
    #[serde(skip)]
    pub errors: FormErrors,
}

impl Default for SnippetForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            expires: DEFAULT_EXPIRY_DAYS,
            author_name: String::new(),
            errors: FormErrors::default(),
        }
    }
}

impl From<&Snippet> for SnippetForm {
    fn from(snippet: &Snippet) -> Self {
        Self {
            title: snippet.title.clone(),
            content: snippet.content.clone(),
            author_name: snippet.author_name.clone(),
            ..Self::default()
        }
    }
}

/// Signup fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip)]
    pub errors: FormErrors,
}

/// Login fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(skip)]
    pub errors: FormErrors,
}

/// Profile fields. The password is never shown or changed here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserUpdateForm {
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub errors: FormErrors,
}

impl From<&User> for UserUpdateForm {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            errors: FormErrors::default(),
        }
    }
}

/// Checks a submitted snippet form, recording errors on it.
pub fn validate_snippet(form: &mut SnippetForm) -> bool {
    let errors = &mut form.errors;
    errors.check_field(not_blank(&form.title), "title", BLANK);
    errors.check_field(max_chars(&form.title, 100), "title", TOO_LONG);
    errors.check_field(not_blank(&form.content), "content", BLANK);
    errors.check_field(
        permitted_value(&form.expires, &PERMITTED_EXPIRY_DAYS),
        "expires",
        BAD_EXPIRY,
    );
    errors.is_valid()
}

pub fn validate_signup(form: &mut SignupForm) -> bool {
    let errors = &mut form.errors;
    errors.check_field(not_blank(&form.name), "name", BLANK);
    errors.check_field(not_blank(&form.email), "email", BLANK);
    errors.check_field(matches(&form.email, &EMAIL_RX), "email", BAD_EMAIL);
    errors.check_field(not_blank(&form.password), "password", BLANK);
    errors.check_field(min_chars(&form.password, 8), "password", SHORT_PASSWORD);
    errors.is_valid()
}

pub fn validate_login(form: &mut LoginForm) -> bool {
    let errors = &mut form.errors;
    errors.check_field(not_blank(&form.email), "email", BLANK);
    errors.check_field(matches(&form.email, &EMAIL_RX), "email", BAD_EMAIL);
    errors.check_field(not_blank(&form.password), "password", BLANK);
    errors.is_valid()
}

pub fn validate_user_update(form: &mut UserUpdateForm) -> bool {
    let errors = &mut form.errors;
    errors.check_field(not_blank(&form.name), "name", BLANK);
    errors.check_field(max_chars(&form.name, 100), "name", TOO_LONG);
    errors.check_field(not_blank(&form.email), "email", BLANK);
    errors.check_field(matches(&form.email, &EMAIL_RX), "email", BAD_EMAIL);
    errors.is_valid()
}
