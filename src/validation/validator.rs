use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// Email shape accepted on signup and login (the W3C `type=email` pattern).
pub static EMAIL_RX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern is valid")
});

/// Errors accumulated while checking one submitted form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    field_errors: BTreeMap<String, String>,
    non_field_errors: Vec<String>,
}

impl FormErrors {
    /// True when no field or non-field error was recorded.
    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty() && self.non_field_errors.is_empty()
    }

    /// Records `message` for `field` unless the field already has one.
    pub fn add_field_error(&mut self, field: &str, message: &str) {
        self.field_errors
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    /// Records an error that belongs to the form as a whole.
    pub fn add_non_field_error(&mut self, message: &str) {
        self.non_field_errors.push(message.to_string());
    }

    /// Records `message` for `field` when `ok` is false.
    pub fn check_field(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add_field_error(field, message);
        }
    }

    /// The message recorded for `field`, if any.
    pub fn field(&self, field: &str) -> Option<&str> {
        self.field_errors.get(field).map(String::as_str)
    }

    pub fn non_field(&self) -> &[String] {
        &self.non_field_errors
    }
}

/// The value has at least one non-whitespace character.
pub fn not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

/// The value has at most `n` characters (not bytes).
pub fn max_chars(value: &str, n: usize) -> bool {
    value.chars().count() <= n
}

/// The value has at least `n` characters (not bytes).
pub fn min_chars(value: &str, n: usize) -> bool {
    value.chars().count() >= n
}

/// The value matches `rx`.
pub fn matches(value: &str, rx: &Regex) -> bool {
    rx.is_match(value)
}

/// The value is one of `permitted`.
pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.contains(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_blank_rejects_empty_and_whitespace() {
        let mut errors = FormErrors::default();
        errors.check_field(not_blank(""), "title", "This field cannot be blank");
        assert!(!errors.is_valid());
        assert_eq!(errors.field("title"), Some("This field cannot be blank"));

        let mut errors = FormErrors::default();
        errors.check_field(not_blank("x"), "title", "This field cannot be blank");
        assert!(errors.is_valid());

        assert!(!not_blank("   \n\t"));
    }

    #[test]
    fn char_limits_count_characters() {
        assert!(max_chars("héllo", 5));
        assert!(!max_chars("héllo!", 5));
        assert!(min_chars("pässwörd", 8));
        assert!(!min_chars("short", 8));
    }

    #[test]
    fn email_pattern() {
        assert!(matches("alice@example.com", &EMAIL_RX));
        assert!(matches("a.b+c@sub.example.org", &EMAIL_RX));
        assert!(!matches("alice", &EMAIL_RX));
        assert!(!matches("alice@", &EMAIL_RX));
        assert!(!matches("al ice@example.com", &EMAIL_RX));
    }

    #[test]
    fn permitted_values() {
        assert!(permitted_value(&7, &[1, 7, 365]));
        assert!(!permitted_value(&30, &[1, 7, 365]));
    }

    #[test]
    fn first_message_per_field_wins() {
        let mut errors = FormErrors::default();
        errors.add_field_error("title", "first");
        errors.add_field_error("title", "second");
        assert_eq!(errors.field("title"), Some("first"));
    }

    #[test]
    fn non_field_errors_make_the_form_invalid() {
        let mut errors = FormErrors::default();
        errors.add_non_field_error("Email or password is incorrect");
        assert!(!errors.is_valid());
        assert_eq!(errors.non_field(), ["Email or password is incorrect".to_string()]);
    }

    #[test]
    fn revalidation_is_idempotent() {
        let check = |errors: &mut FormErrors| {
            errors.check_field(not_blank(""), "title", "This field cannot be blank");
        };
        let mut once = FormErrors::default();
        check(&mut once);
        let mut twice = once.clone();
        check(&mut twice);
        assert_eq!(once, twice);
    }
}
