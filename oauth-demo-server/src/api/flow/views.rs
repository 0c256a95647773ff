use crate::errors::FlowError;
use crate::oauth::models::FlowSettings;
use askama::Template;
use axum::response::Html;
use chrono::Local;

#[derive(Template)]
#[template(path = "main.html")]
struct MainPage<'a> {
    settings: &'a FlowSettings,
    phase: &'static str,
    has_access_token: bool,
    has_refresh_token: bool,
    access_token: &'a str,
    refresh_token: &'a str,
    claims: &'a str,
    expires_at: String,
    api_url: String,
    api_response: &'a str,
}

/// Render the settings page for a session
pub fn settings_page(settings: &FlowSettings) -> Result<Html<String>, FlowError> {
    let page = MainPage {
        settings,
        phase: settings.phase.label(),
        has_access_token: settings.access_token.is_some(),
        has_refresh_token: settings.refresh_token.is_some(),
        access_token: settings.access_token.as_deref().unwrap_or_default(),
        refresh_token: settings.refresh_token.as_deref().unwrap_or_default(),
        claims: settings.access_token_claims.as_deref().unwrap_or_default(),
        expires_at: settings
            .expires_at
            .map(|at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default(),
        api_url: format!("{}/organizations", settings.api_url.trim_end_matches('/')),
        api_response: settings.last_api_response.as_deref().unwrap_or_default(),
    };
    Ok(Html(page.render()?))
}
