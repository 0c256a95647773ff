//! Organization connection check.
//!
//! After login the resource server lists the user's organizations. An
//! organization whose links contain a `connections` relation has not been
//! connected to this application yet, and the user must be sent to that
//! link to grant access.

use crate::errors::FlowError;
use crate::oauth::append_query;
use crate::oauth::models::{FlowSettings, OrganizationList};
use crate::oauth::resource::ResourceClient;
use log::{debug, info, warn};

pub const CONNECTIONS_REL: &str = "connections";

#[derive(Clone)]
pub struct OrganizationAccessChecker {
    resource: ResourceClient,
}

impl OrganizationAccessChecker {
    pub fn new(resource: ResourceClient) -> Self {
        Self { resource }
    }

    /// Returns the consent redirect for the first unconnected organization,
    /// or `None` when every organization is connected
    pub async fn check(&self, settings: &FlowSettings) -> Result<Option<String>, FlowError> {
        let Some(token) = settings.access_token.as_deref() else {
            warn!("Skipping organization check, no access token in session");
            return Ok(None);
        };

        let url = format!("{}/organizations", settings.api_url.trim_end_matches('/'));
        let body = self.resource.authenticated_get(token, &url).await?;
        let organizations: OrganizationList = serde_json::from_str(&body).map_err(|e| {
            FlowError::ResourceFetch(format!("unexpected organizations response: {e}"))
        })?;

        debug!(
            "Checking {} organizations for pending connections",
            organizations.values.len()
        );

        let redirect = connection_redirect(&organizations, &settings.org_connection_completed_url);
        if redirect.is_some() {
            info!("Organization connection required, redirecting user");
        }
        Ok(redirect)
    }
}

/// First `connections` link in listing order, with `redirect_uri` appended
pub fn connection_redirect(
    organizations: &OrganizationList,
    completed_url: &str,
) -> Option<String> {
    organizations
        .values
        .iter()
        .flat_map(|org| org.links.iter())
        .find(|link| link.rel == CONNECTIONS_REL)
        .map(|link| append_query(&link.uri, &[("redirect_uri", completed_url)]))
}
