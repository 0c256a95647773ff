use crate::session::SessionError;
use askama::Template;
use axum::response::{Html, IntoResponse};
use http::StatusCode;
use thiserror::Error;

/// Errors surfaced by the authorization code flow.
///
/// Every variant is rendered as a diagnostic page at the handler boundary.
/// Messages carry upstream status codes and provider error bodies, never
/// client secrets or tokens.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("failed to fetch provider metadata: {0}")]
    MetadataFetch(String),
    #[error("token request failed: {0}")]
    TokenExchange(#[source] reqwest::Error),
    #[error("token endpoint rejected the grant (HTTP {status}): {body}")]
    InvalidGrant { status: StatusCode, body: String },
    #[error("malformed token response: {0}")]
    MalformedTokenResponse(String),
    #[error("resource request failed: {0}")]
    ResourceFetch(String),
    #[error("callback state does not match the state of this session")]
    StateMismatch,
    #[error("callback is missing the authorization code")]
    MissingCode,
    #[error("authorization was denied by the provider: {0}")]
    AuthorizationDenied(String),
    #[error("no refresh token is stored for this session")]
    MissingRefreshToken,
    #[error("session store error: {0}")]
    Session(#[from] SessionError),
    #[error("failed to render page: {0}")]
    Render(#[from] askama::Error),
}

impl FlowError {
    /// Short, stable name of the error kind shown on the diagnostic page
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MetadataFetch(_) => "MetadataFetchError",
            Self::TokenExchange(_) => "TokenExchangeError",
            Self::InvalidGrant { .. } => "InvalidGrant",
            Self::MalformedTokenResponse(_) => "MalformedTokenResponse",
            Self::ResourceFetch(_) => "ResourceFetchError",
            Self::StateMismatch => "StateMismatch",
            Self::MissingCode => "MissingCode",
            Self::AuthorizationDenied(_) => "AuthorizationDenied",
            Self::MissingRefreshToken => "MissingRefreshToken",
            Self::Session(_) => "SessionError",
            Self::Render(_) => "RenderError",
        }
    }

    /// HTTP status used when the error reaches the browser
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MetadataFetch(_)
            | Self::TokenExchange(_)
            | Self::InvalidGrant { .. }
            | Self::MalformedTokenResponse(_)
            | Self::ResourceFetch(_) => StatusCode::BAD_GATEWAY,
            Self::StateMismatch
            | Self::MissingCode
            | Self::AuthorizationDenied(_)
            | Self::MissingRefreshToken => StatusCode::BAD_REQUEST,
            Self::Session(_) | Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorPage<'a> {
    kind: &'a str,
    message: String,
    status: u16,
}

impl IntoResponse for FlowError {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.status_code();
        let page = ErrorPage {
            kind: self.kind(),
            message: self.to_string(),
            status: status_code.as_u16(),
        };
        match page.render() {
            Ok(html) => (status_code, Html(html)).into_response(),
            Err(e) => {
                log::error!("Failed to render error page: {}", e);
                (status_code, format!("{}: {}", page.kind, page.message)).into_response()
            }
        }
    }
}
