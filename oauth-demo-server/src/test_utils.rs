use crate::config::Settings;
use crate::create_app;
use crate::state::AppState;
use axum::body::Body;
use axum::Router;
use http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use http::{HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use log::LevelFilter;
use serde::Serialize;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;

/// Test fixture for exercising the router against a mocked identity provider
/// and resource server.
///
/// Requests go through the full router with `oneshot`. The session cookie is
/// not tracked automatically: read it with [`TestResponse::cookie`] and pass
/// it back through the `*_with_cookie` helpers.
///
/// # Examples
///
/// ```rust
/// #[tokio::test]
/// async fn test_endpoint() {
///     let fixture = TestFixture::new().await;
///     fixture.mount_discovery().await;
///
///     let response = fixture.get("/").await;
///     response.assert_ok();
///     let cookie = response.cookie().unwrap();
///
///     let response = fixture.get_with_cookie("/refresh-access-token", &cookie).await;
///     response.assert_status(StatusCode::BAD_REQUEST);
/// }
/// ```
pub struct TestFixture {
    /// The application router
    pub app: Router,
    /// Configuration settings
    pub settings: Settings,
    /// Mock server for the identity provider (discovery and token endpoints)
    pub idp_mock: MockServer,
    /// Mock server for the resource server
    pub api_mock: MockServer,
}

impl TestFixture {
    /// Creates a new test fixture with mock servers for the identity provider
    /// and the resource server.
    pub async fn new() -> Self {
        Self::setup_logger(LevelFilter::Debug);

        let idp_mock = MockServer::start().await;
        let api_mock = MockServer::start().await;

        let settings = Settings::for_test_with_mocks(&idp_mock, &api_mock);

        let state = AppState::for_testing(&settings);
        let app = create_app(state).await;

        Self {
            app,
            settings,
            idp_mock,
            api_mock,
        }
    }

    /// Initializes the test logger. Called by `new()`, later calls are no-ops.
    pub fn setup_logger(level: LevelFilter) {
        let _ = env_logger::builder()
            .filter_level(level)
            .is_test(true)
            .try_init();
    }

    fn request_builder(
        &self,
        method: Method,
        uri: impl AsRef<str>,
        cookie: Option<&str>,
    ) -> http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri.as_ref());
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        builder
    }

    /// Sends a GET request without a session cookie
    pub async fn get(&self, uri: impl AsRef<str>) -> TestResponse {
        self.send_get(uri, None).await
    }

    /// Sends a GET request carrying `cookie` (`name=value`)
    pub async fn get_with_cookie(&self, uri: impl AsRef<str>, cookie: &str) -> TestResponse {
        self.send_get(uri, Some(cookie)).await
    }

    async fn send_get(&self, uri: impl AsRef<str>, cookie: Option<&str>) -> TestResponse {
        let request = self
            .request_builder(Method::GET, uri, cookie)
            .body(Body::empty())
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends a POST request with a form-urlencoded body
    pub async fn post_form<T: Serialize>(
        &self,
        uri: impl AsRef<str>,
        form: &T,
        cookie: Option<&str>,
    ) -> TestResponse {
        let body = encode_form(form);
        let request = self
            .request_builder(Method::POST, uri, cookie)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends a request and returns a TestResponse.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        }
    }

    /// Serves a discovery document pointing at `/authorize` and `/token` on
    /// the identity provider mock
    pub async fn mount_discovery(&self) {
        Mock::given(matchers::method("GET"))
            .and(matchers::path("/.well-known/oauth-authorization-server"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "authorization_endpoint": format!("{}/authorize", self.idp_mock.uri()),
                "token_endpoint": format!("{}/token", self.idp_mock.uri()),
            })))
            .mount(&self.idp_mock)
            .await;
    }

    /// Answers token requests with `response_body`
    pub async fn mount_token(&self, response_body: impl Serialize, status_code: StatusCode) {
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/token"))
            .respond_with(ResponseTemplate::new(status_code.as_u16()).set_body_json(response_body))
            .mount(&self.idp_mock)
            .await;
    }

    /// Adds a mock resource server route answering GET `path`
    pub async fn add_api_mock(
        &self,
        path: impl Into<String>,
        response_body: impl Serialize,
        status_code: StatusCode,
        expected_calls: u64,
    ) {
        Mock::given(matchers::method("GET"))
            .and(matchers::path(path.into()))
            .respond_with(ResponseTemplate::new(status_code.as_u16()).set_body_json(response_body))
            .expect(expected_calls)
            .mount(&self.api_mock)
            .await;
    }
}

fn encode_form<T: Serialize>(form: &T) -> String {
    let value = serde_json::to_value(form).expect("Failed to serialize form");
    let Value::Object(fields) = value else {
        panic!("form must serialize to an object");
    };
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (name, value) in fields {
        match value {
            Value::String(s) => serializer.append_pair(&name, &s),
            other => serializer.append_pair(&name, &other.to_string()),
        };
    }
    serializer.finish()
}

/// Response from a test request with convenient access to status, headers
/// and body.
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body as text
    pub body: String,
}

impl TestResponse {
    /// Asserts that the response has the expected status code.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match the expected value.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status, expected,
            "Expected status {} but got {} with body: {}",
            expected, self.status, self.body
        );
        self
    }

    /// Asserts that the response status is OK (200).
    pub fn assert_ok(&self) -> &Self {
        self.assert_status(StatusCode::OK)
    }

    /// Body parsed as JSON
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("Failed to parse response JSON")
    }

    /// `Location` header of a redirect
    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
    }

    /// `name=value` of the first `Set-Cookie` header
    pub fn cookie(&self) -> Option<String> {
        self.headers
            .get(SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }
}
