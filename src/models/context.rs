/// Per-request values every page needs, resolved by the auth middleware and
/// handed explicitly to handlers and views.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Whether the session belongs to a user that still exists.
    pub is_authenticated: bool,
    /// The id of that user.
    pub user_id: Option<i64>,
    /// The display name stored at login.
    pub current_user: Option<String>,
    /// The double-submit CSRF token to embed in forms.
    pub csrf_token: String,
}
