//! Flow controller: the five browser-facing triggers of the demo.
//!
//! Each trigger takes the session lock, reads the session's
//! [`FlowSettings`], applies its transition and writes the record back.
//!
//! ```text
//! Unauthenticated --start--> AuthorizationRequested --callback--> AwaitingOrgLink
//!                                                          \--> Authenticated
//! AwaitingOrgLink --load--> Authenticated --refresh--> Authenticated
//! ```

use crate::config::Settings;
use crate::errors::FlowError;
use crate::oauth::append_query;
use crate::oauth::metadata::{MetadataResolver, AUTHORIZATION_ENDPOINT};
use crate::oauth::models::{FlowPhase, FlowSettings, Grant};
use crate::oauth::organizations::OrganizationAccessChecker;
use crate::oauth::resource::ResourceClient;
use crate::oauth::token::TokenExchanger;
use crate::session::{SessionLocks, SessionStore};
use log::{info, warn};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

/// Settings submitted by the start form
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct StartFlow {
    pub client_id: String,
    pub client_secret: String,
    /// Discovery document URL
    pub well_known: String,
    pub callback_url: String,
    /// Space-delimited scopes
    pub scopes: String,
    pub state: String,
}

/// Query parameters of the provider's redirect back to the application
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CallbackParams {
    /// Authorization code
    pub code: Option<String>,
    /// State echoed by the provider
    pub state: Option<String>,
    /// Error code when the user or provider denied the request
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Ad-hoc API call submitted by the page
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CallApi {
    /// Resource URL to GET
    pub url: String,
    /// Bearer token to present
    pub token: String,
}

/// Result of the callback trigger
#[derive(Debug)]
pub enum CallbackOutcome {
    /// An organization needs a connection consent first
    Redirect(String),
    Render(FlowSettings),
}

pub struct FlowController {
    settings: Arc<Settings>,
    store: Arc<dyn SessionStore>,
    locks: SessionLocks,
    metadata: MetadataResolver,
    exchanger: TokenExchanger,
    organizations: OrganizationAccessChecker,
    resource: ResourceClient,
}

impl FlowController {
    pub fn new(settings: Arc<Settings>, client: Client, store: Arc<dyn SessionStore>) -> Self {
        let metadata = MetadataResolver::new(client.clone());
        let resource = ResourceClient::new(client.clone(), settings.provider.api_media_type.clone());
        Self {
            locks: SessionLocks::new(settings.session.idle_ttl, settings.session.max_sessions),
            exchanger: TokenExchanger::new(
                client,
                metadata.clone(),
                settings.provider.expires_in_unit,
            ),
            organizations: OrganizationAccessChecker::new(resource.clone()),
            metadata,
            resource,
            store,
            settings,
        }
    }

    async fn read(&self, session_id: &str) -> Result<FlowSettings, FlowError> {
        Ok(self
            .store
            .get(session_id)
            .await?
            .unwrap_or_else(|| FlowSettings::defaults(&self.settings)))
    }

    /// Current settings of the session, created with defaults on first view
    pub async fn load(&self, session_id: &str) -> Result<FlowSettings, FlowError> {
        let _guard = self.locks.lock(session_id).await;

        let mut settings = match self.store.get(session_id).await? {
            Some(settings) => settings,
            None => {
                let settings = FlowSettings::defaults(&self.settings);
                self.store.put(session_id, &settings).await?;
                return Ok(settings);
            }
        };

        // Back from the organization consent page. Linkage is not re-verified.
        if settings.phase == FlowPhase::AwaitingOrgLink {
            settings.phase = FlowPhase::Authenticated;
            self.store.put(session_id, &settings).await?;
        }
        Ok(settings)
    }

    /// Persist the submitted settings and return the authorization URL the
    /// browser is sent to
    pub async fn start(&self, session_id: &str, form: StartFlow) -> Result<String, FlowError> {
        let _guard = self.locks.lock(session_id).await;
        let mut settings = self.read(session_id).await?;

        settings.client_id = form.client_id;
        // the page never echoes the secret back, blank keeps the stored one
        replace_unless_empty(&mut settings.client_secret, form.client_secret);
        replace_unless_empty(&mut settings.well_known_url, form.well_known);
        replace_unless_empty(&mut settings.callback_url, form.callback_url);
        replace_unless_empty(&mut settings.scopes, form.scopes);
        replace_unless_empty(&mut settings.state, form.state);
        settings.phase = FlowPhase::AuthorizationRequested;
        self.store.put(session_id, &settings).await?;

        let authorization_endpoint = self
            .metadata
            .resolve_endpoint(&settings.well_known_url, AUTHORIZATION_ENDPOINT)
            .await?;

        info!(
            "Starting authorization for client '{}' at {}",
            settings.client_id, authorization_endpoint
        );

        Ok(append_query(
            &authorization_endpoint,
            &[
                ("client_id", settings.client_id.as_str()),
                ("response_type", "code"),
                ("scope", settings.scopes.as_str()),
                ("redirect_uri", settings.callback_url.as_str()),
                ("state", settings.state.as_str()),
            ],
        ))
    }

    /// Exchange the authorization code, then check organization access
    pub async fn callback(
        &self,
        session_id: &str,
        params: CallbackParams,
    ) -> Result<CallbackOutcome, FlowError> {
        if let Some(error) = params.error {
            return Err(FlowError::AuthorizationDenied(
                params.error_description.unwrap_or(error),
            ));
        }
        let code = params
            .code
            .filter(|code| !code.is_empty())
            .ok_or(FlowError::MissingCode)?;

        let _guard = self.locks.lock(session_id).await;
        let settings = self.read(session_id).await?;

        if self.settings.provider.enforce_state
            && params.state.as_deref() != Some(settings.state.as_str())
        {
            warn!("Rejecting callback whose state does not match the session");
            return Err(FlowError::StateMismatch);
        }

        let mut settings = self
            .exchanger
            .exchange(settings, &Grant::AuthorizationCode { code })
            .await?;
        settings.phase = FlowPhase::Authenticated;
        self.store.put(session_id, &settings).await?;

        match self.organizations.check(&settings).await? {
            Some(redirect) => {
                settings.phase = FlowPhase::AwaitingOrgLink;
                self.store.put(session_id, &settings).await?;
                Ok(CallbackOutcome::Redirect(redirect))
            }
            None => Ok(CallbackOutcome::Render(settings)),
        }
    }

    /// Refresh the access token with the stored refresh token
    pub async fn refresh(&self, session_id: &str) -> Result<FlowSettings, FlowError> {
        let _guard = self.locks.lock(session_id).await;
        let settings = self.read(session_id).await?;

        let refresh_token = settings
            .refresh_token
            .clone()
            .ok_or(FlowError::MissingRefreshToken)?;

        let mut settings = self
            .exchanger
            .exchange(settings, &Grant::RefreshToken { refresh_token })
            .await?;
        settings.phase = FlowPhase::Authenticated;
        self.store.put(session_id, &settings).await?;
        Ok(settings)
    }

    /// GET an arbitrary resource with a caller-supplied token and keep the
    /// pretty-printed response for display
    pub async fn call_api(&self, session_id: &str, call: CallApi) -> Result<FlowSettings, FlowError> {
        let _guard = self.locks.lock(session_id).await;
        let mut settings = self.read(session_id).await?;

        let body = self.resource.authenticated_get(&call.token, &call.url).await?;

        settings.last_api_response = Some(pretty_json(body));
        settings.access_token = Some(call.token);
        self.store.put(session_id, &settings).await?;
        Ok(settings)
    }
}

fn replace_unless_empty(target: &mut String, value: String) {
    if !value.trim().is_empty() {
        *target = value;
    }
}

/// Pretty-printed JSON, or the body unchanged when it is not JSON
fn pretty_json(body: String) -> String {
    serde_json::from_str::<serde_json::Value>(&body)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or(body)
}
