use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use tower::ServiceExt;

use snipbox::{
    config::Config,
    repositories::memory::MemorySnippetStore,
    routes::build_router,
    state::AppState,
};

/// Drives the router like a browser: remembers cookies and echoes the CSRF
/// token into every form it posts.
struct Browser {
    app: Router,
    cookies: BTreeMap<String, String>,
}

struct Page {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl Page {
    fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

impl Browser {
    fn new() -> Self {
        Self::with_state(AppState::in_memory(Config::in_memory()))
    }

    fn with_state(state: AppState) -> Self {
        Self {
            app: build_router(state),
            cookies: BTreeMap::new(),
        }
    }

    fn cookie(&self, name: &str) -> Option<String> {
        self.cookies.get(name).cloned()
    }

    async fn send(&mut self, mut request: Request<Body>) -> Page {
        if !self.cookies.is_empty() {
            let jar = self
                .cookies
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("; ");
            request
                .headers_mut()
                .insert(header::COOKIE, jar.parse().unwrap());
        }

        let response = self.app.clone().oneshot(request).await.unwrap();
        for set_cookie in response.headers().get_all(header::SET_COOKIE) {
            let raw = set_cookie.to_str().unwrap();
            let pair = raw.split(';').next().unwrap();
            let (name, value) = pair.split_once('=').unwrap();
            if raw.contains("Max-Age=0") {
                self.cookies.remove(name);
            } else {
                self.cookies.insert(name.to_string(), value.to_string());
            }
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        Page {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    async fn get(&mut self, uri: &str) -> Page {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    async fn post_raw(&mut self, uri: &str, body: String) -> Page {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    async fn post(&mut self, uri: &str, fields: &[(&str, &str)]) -> Page {
        if self.cookie("csrf_token").is_none() {
            self.get("/ping").await;
        }
        let token = self.cookie("csrf_token").unwrap();
        let mut pairs = vec![("csrf_token", token.as_str())];
        pairs.extend_from_slice(fields);
        let body = serde_urlencoded::to_string(&pairs).unwrap();
        self.post_raw(uri, body).await
    }

    async fn sign_up(&mut self, name: &str, email: &str) -> Page {
        self.post(
            "/user/signup",
            &[("name", name), ("email", email), ("password", "pa55word!")],
        )
        .await
    }

    async fn log_in(&mut self, email: &str) -> Page {
        self.post("/user/login", &[("email", email), ("password", "pa55word!")])
            .await
    }

    async fn signed_in(name: &str, email: &str) -> Self {
        let mut browser = Self::new();
        browser.sign_up(name, email).await;
        let page = browser.log_in(email).await;
        assert_eq!(page.status, StatusCode::SEE_OTHER);
        browser
    }
}

#[tokio::test]
async fn ping_answers_ok() {
    let mut browser = Browser::new();
    let page = browser.get("/ping").await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.body, "OK");
}

#[tokio::test]
async fn first_visit_issues_an_http_only_csrf_cookie() {
    let mut browser = Browser::new();
    let page = browser.get("/").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("There's nothing to see here"));

    let set_cookie = page.headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.starts_with("csrf_token="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));

    let page = browser.get("/user/login").await;
    let token = browser.cookie("csrf_token").unwrap();
    assert!(page.body.contains(&format!(r#"name="csrf_token" value="{}""#, token)));
}

#[tokio::test]
async fn static_assets_are_served() {
    let mut browser = Browser::new();
    let page = browser.get("/static/css/main.css").await;
    assert_eq!(page.status, StatusCode::OK);
}

#[tokio::test]
async fn bad_ids_are_not_found() {
    let mut browser = Browser::new();
    for uri in [
        "/snippet/view/abc",
        "/snippet/view/0",
        "/snippet/view/-1",
        "/snippet/view/999",
    ] {
        assert_eq!(browser.get(uri).await.status, StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn anonymous_users_are_sent_to_login() {
    let mut browser = Browser::new();
    for uri in ["/snippet/create", "/user/show", "/user/edit/1", "/snippet/edit/1"] {
        let page = browser.get(uri).await;
        assert_eq!(page.status, StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(page.location(), Some("/user/login"));
        assert_eq!(
            page.headers.get(header::CACHE_CONTROL).unwrap(),
            "no-store"
        );
    }

    let page = browser
        .post("/snippet/create", &[("title", "t"), ("content", "c"), ("expires", "7")])
        .await;
    assert_eq!(page.location(), Some("/user/login"));
}

#[tokio::test]
async fn posts_without_matching_csrf_token_are_rejected() {
    let mut browser = Browser::new();
    browser.get("/").await;

    let page = browser
        .post_raw(
            "/user/login",
            "email=a%40example.com&password=whatever".to_string(),
        )
        .await;
    assert_eq!(page.status, StatusCode::BAD_REQUEST);

    let page = browser
        .post_raw(
            "/user/login",
            "csrf_token=forged&email=a%40example.com&password=whatever".to_string(),
        )
        .await;
    assert_eq!(page.status, StatusCode::BAD_REQUEST);

    let mut stranger = Browser::new();
    let page = stranger
        .post_raw("/user/login", "csrf_token=x&email=a%40b.com".to_string())
        .await;
    assert_eq!(page.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn signup_flashes_once_and_rejects_duplicate_email() {
    let mut browser = Browser::new();
    let page = browser.sign_up("Alice", "alice@example.com").await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert_eq!(page.location(), Some("/user/login"));

    let page = browser.get("/user/login").await;
    assert!(page.body.contains("Your signup was successful. Please log in."));
    let page = browser.get("/user/login").await;
    assert!(!page.body.contains("Your signup was successful"));

    let page = browser.sign_up("Alice Again", "alice@example.com").await;
    assert_eq!(page.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(page.body.contains("Email address is already in use"));
    assert!(page.body.contains(r#"value="Alice Again""#));
}

#[tokio::test]
async fn signup_validation_rerenders_the_form() {
    let mut browser = Browser::new();
    let page = browser
        .post(
            "/user/signup",
            &[("name", ""), ("email", "nope"), ("password", "short")],
        )
        .await;
    assert_eq!(page.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(page.body.contains("This field cannot be blank"));
    assert!(page.body.contains("This field must be a valid email address"));
    assert!(page.body.contains("This field must be at least 8 characters long"));
    assert!(page.body.contains(r#"value="nope""#));
}

#[tokio::test]
async fn failed_logins_look_the_same() {
    let mut browser = Browser::new();
    browser.sign_up("Bob", "bob@example.com").await;

    let wrong_password = browser
        .post(
            "/user/login",
            &[("email", "bob@example.com"), ("password", "not-his-password")],
        )
        .await;
    let unknown_email = browser
        .post(
            "/user/login",
            &[("email", "nobody@example.com"), ("password", "not-his-password")],
        )
        .await;

    for page in [&wrong_password, &unknown_email] {
        assert_eq!(page.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(page.body.contains("Email or password is incorrect"));
        assert!(!page.body.contains("not-his-password"));
    }
}

#[tokio::test]
async fn login_and_logout_rotate_the_session_token() {
    let mut browser = Browser::new();
    browser.sign_up("Carol", "carol@example.com").await;
    let anonymous = browser.cookie("session_id").unwrap();

    let page = browser.log_in("carol@example.com").await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert_eq!(page.location(), Some("/snippet/create"));
    let logged_in = browser.cookie("session_id").unwrap();
    assert_ne!(anonymous, logged_in);

    let page = browser.get("/snippet/create").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Welcome Carol"));
    assert!(page.body.contains("Logout"));

    let page = browser.post("/user/logout", &[]).await;
    assert_eq!(page.location(), Some("/"));
    let logged_out = browser.cookie("session_id").unwrap();
    assert_ne!(logged_in, logged_out);

    let page = browser.get("/").await;
    assert!(page.body.contains("You&#39;ve been logged out successfully!"));
    assert_eq!(browser.get("/snippet/create").await.status, StatusCode::SEE_OTHER);

    // the pre-rotation token no longer names a session
    browser.cookies.insert("session_id".into(), logged_in);
    let page = browser.get("/snippet/create").await;
    assert_eq!(page.location(), Some("/user/login"));
}

#[tokio::test]
async fn snippet_lifecycle() {
    let mut browser = Browser::signed_in("Dave", "dave@example.com").await;

    let page = browser
        .post(
            "/snippet/create",
            &[("title", ""), ("content", "kept <content>"), ("expires", "7")],
        )
        .await;
    assert_eq!(page.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(page.body.contains("This field cannot be blank"));
    assert!(page.body.contains("kept &lt;content&gt;"));

    let page = browser
        .post(
            "/snippet/create",
            &[
                ("title", "O snail"),
                ("content", "Climb Mount Fuji"),
                ("expires", "7"),
                ("author_name", "Issa"),
            ],
        )
        .await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    let location = page.location().unwrap().to_string();
    assert_eq!(location, "/snippet/view/1");

    let page = browser.get(&location).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Snippet successfully created!"));
    assert!(page.body.contains("O snail"));
    assert!(page.body.contains("By Issa"));

    let page = browser.get("/snippet/edit/1").await;
    assert!(page.body.contains(r#"action="/snippet/update/1""#));
    assert!(page.body.contains(r#"value="O snail""#));

    let page = browser
        .post(
            "/snippet/update/1",
            &[
                ("title", "Over the wintry forest"),
                ("content", "winds howl in rage"),
                ("expires", "365"),
                ("author_name", "Soseki"),
            ],
        )
        .await;
    assert_eq!(page.location(), Some("/"));

    let page = browser.get("/").await;
    assert!(page.body.contains("Snippet successfully Updated!"));
    assert!(page.body.contains("Over the wintry forest"));

    let page = browser.post("/snippet/delete/1", &[]).await;
    assert_eq!(page.location(), Some("/"));
    assert_eq!(browser.get("/snippet/view/1").await.status, StatusCode::NOT_FOUND);

    let page = browser.post("/snippet/delete/1", &[]).await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn non_numeric_form_fields_are_bad_requests() {
    let mut browser = Browser::signed_in("Erin", "erin@example.com").await;
    let page = browser
        .post(
            "/snippet/create",
            &[("title", "t"), ("content", "c"), ("expires", "soon")],
        )
        .await;
    assert_eq!(page.status, StatusCode::BAD_REQUEST);

    let page = browser
        .post(
            "/snippet/create",
            &[("title", "t"), ("content", "c"), ("expires", "30")],
        )
        .await;
    assert_eq!(page.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(page.body.contains("This field must equal 1, 7 or 365"));
}

#[tokio::test]
async fn expired_snippets_disappear() {
    let snippets = Arc::new(MemorySnippetStore::new());
    let state = AppState {
        snippets: snippets.clone(),
        ..AppState::in_memory(Config::in_memory())
    };
    let mut browser = Browser::with_state(state);
    browser.sign_up("Finn", "finn@example.com").await;
    browser.log_in("finn@example.com").await;

    browser
        .post(
            "/snippet/create",
            &[("title", "short lived"), ("content", "gone tomorrow"), ("expires", "1")],
        )
        .await;
    assert_eq!(browser.get("/snippet/view/1").await.status, StatusCode::OK);

    snippets.advance_clock(chrono::Duration::days(2)).await;
    assert_eq!(browser.get("/snippet/view/1").await.status, StatusCode::NOT_FOUND);
    assert!(!browser.get("/").await.body.contains("short lived"));
    assert_eq!(snippets.row_count().await, 1);
}

#[tokio::test]
async fn users_can_be_listed_and_edited() {
    let state = AppState::in_memory(Config::in_memory());
    let mut other = Browser::with_state(state.clone());
    other.sign_up("Gina", "gina@example.com").await;

    let mut browser = Browser::with_state(state);
    browser.sign_up("Hank", "hank@example.com").await;
    browser.log_in("hank@example.com").await;
    let page = browser.get("/user/show").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("gina@example.com"));
    assert!(page.body.contains("hank@example.com"));

    assert_eq!(browser.get("/user/edit/99").await.status, StatusCode::NOT_FOUND);
    assert_eq!(browser.get("/user/edit/x").await.status, StatusCode::NOT_FOUND);

    let page = browser
        .post(
            "/user/update/2",
            &[("name", "Hank"), ("email", "gina@example.com")],
        )
        .await;
    assert_eq!(page.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(page.body.contains("Email address is already in use"));

    let page = browser
        .post(
            "/user/update/2",
            &[("name", "Henry"), ("email", "henry@example.com")],
        )
        .await;
    assert_eq!(page.location(), Some("/user/show"));

    let page = browser.get("/user/show").await;
    assert!(page.body.contains("Users successfully Updated!"));
    assert!(page.body.contains("henry@example.com"));
    assert!(page.body.contains("<span>Henry</span>"));
}
