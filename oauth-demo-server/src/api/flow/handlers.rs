use crate::api::flow::views::settings_page;
use crate::errors::FlowError;
use crate::oauth::flow::{CallApi, CallbackOutcome, CallbackParams, StartFlow};
use crate::openapi::FLOW_TAG;
use crate::session::cookie::ensure_session_id;
use crate::state::AppState;
use axum::extract::{Form, Query, State};
use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use http::header::LOCATION;
use http::StatusCode;

/// 302 Found to `location`
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location)]).into_response()
}

#[utoipa::path(
    get,
    path = "/",
    tag = FLOW_TAG,
    responses(
        (status = 200, description = "Current settings of the session", content_type = "text/html", body = String)
    )
)]
pub(crate) async fn index(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), FlowError> {
    let (jar, session_id) = ensure_session_id(jar, &state.settings.session.cookie_name);
    let settings = state.flow.load(&session_id).await?;
    Ok((jar, settings_page(&settings)?))
}

#[utoipa::path(
    post,
    path = "/",
    tag = FLOW_TAG,
    request_body(content = StartFlow, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Redirect to the provider's authorization endpoint"),
        (status = 502, description = "Discovery document could not be fetched", content_type = "text/html", body = String)
    )
)]
pub(crate) async fn start(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<StartFlow>,
) -> Result<(CookieJar, Response), FlowError> {
    let (jar, session_id) = ensure_session_id(jar, &state.settings.session.cookie_name);
    let authorization_url = state
        .flow
        .start(&session_id, form)
        .await
        .inspect_err(|e| log::error!("Failed to start authorization: {}", e))?;
    Ok((jar, found(&authorization_url)))
}

#[utoipa::path(
    get,
    path = "/callback",
    tag = FLOW_TAG,
    params(CallbackParams),
    responses(
        (status = 200, description = "Tokens obtained", content_type = "text/html", body = String),
        (status = 302, description = "Redirect to an organization connection consent"),
        (status = 400, description = "Invalid callback", content_type = "text/html", body = String),
        (status = 502, description = "Token exchange failed", content_type = "text/html", body = String)
    )
)]
pub(crate) async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Response), FlowError> {
    let (jar, session_id) = ensure_session_id(jar, &state.settings.session.cookie_name);
    let outcome = state
        .flow
        .callback(&session_id, params)
        .await
        .inspect_err(|e| log::error!("Failed to complete authorization: {}", e))?;

    let response = match outcome {
        CallbackOutcome::Redirect(url) => found(&url),
        CallbackOutcome::Render(settings) => settings_page(&settings)?.into_response(),
    };
    Ok((jar, response))
}

#[utoipa::path(
    get,
    path = "/refresh-access-token",
    tag = FLOW_TAG,
    responses(
        (status = 200, description = "Access token refreshed", content_type = "text/html", body = String),
        (status = 400, description = "No refresh token in session", content_type = "text/html", body = String),
        (status = 502, description = "Refresh grant failed", content_type = "text/html", body = String)
    )
)]
pub(crate) async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), FlowError> {
    let (jar, session_id) = ensure_session_id(jar, &state.settings.session.cookie_name);
    let settings = state
        .flow
        .refresh(&session_id)
        .await
        .inspect_err(|e| log::error!("Failed to refresh access token: {}", e))?;
    Ok((jar, settings_page(&settings)?))
}

#[utoipa::path(
    post,
    path = "/call-api",
    tag = FLOW_TAG,
    request_body(content = CallApi, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Response of the resource server", content_type = "text/html", body = String),
        (status = 502, description = "Resource request failed", content_type = "text/html", body = String)
    )
)]
pub(crate) async fn call_api(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(call): Form<CallApi>,
) -> Result<(CookieJar, Html<String>), FlowError> {
    let (jar, session_id) = ensure_session_id(jar, &state.settings.session.cookie_name);
    let settings = state
        .flow
        .call_api(&session_id, call)
        .await
        .inspect_err(|e| log::error!("API call failed: {}", e))?;
    Ok((jar, settings_page(&settings)?))
}
