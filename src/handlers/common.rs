use axum::{extract::rejection::FormRejection, Form};

use crate::{
    error::{AppError, Result},
    models::{context::RequestContext, session::FLASH_KEY},
    services::session::Session,
    views::Page,
};

/// Parses a path id. Anything that is not a positive integer is a 404.
pub fn parse_id(raw: &str) -> Result<i64> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id >= 1)
        .ok_or(AppError::NotFound)
}

/// Unwraps a decoded form, turning decode failures into 400.
pub fn bind<T>(form: std::result::Result<Form<T>, FormRejection>) -> Result<T> {
    form.map(|Form(inner)| inner)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

/// Builds the shared page data, consuming any pending flash message.
pub async fn page<'a>(session: &Session, ctx: &'a RequestContext) -> Page<'a> {
    Page {
        ctx,
        flash: session.pop(FLASH_KEY).await,
    }
}

/// Liveness check.
pub async fn ping() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_positive_integers_are_ids() {
        assert_eq!(parse_id("42").unwrap(), 42);
        for raw in ["0", "-3", "abc", "", "1.5", "99999999999999999999"] {
            assert!(matches!(parse_id(raw), Err(AppError::NotFound)), "{raw}");
        }
    }
}
