use crate::api::flow::handlers;
use crate::api::health;
use crate::oauth::flow::{CallApi, StartFlow};
use utoipa::OpenApi;

pub(crate) const HEALTH_TAG: &str = "Health API";
pub(crate) const FLOW_TAG: &str = "Authorization Code Flow";

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        handlers::index,
        handlers::start,
        handlers::callback,
        handlers::refresh,
        handlers::call_api,
    ),
    components(schemas(StartFlow, CallApi, health::Health)),
    tags(
        (name = HEALTH_TAG, description = "Health check endpoints"),
        (name = FLOW_TAG, description = "Browser-facing OAuth 2.0 authorization code flow"),
    ),
    info(
        title = "OAuth2 Authorization Code demo",
        description = "Demonstrates the authorization code grant, token refresh and organization connection checks",
        version = "0.1.0"
    )
)]
pub(crate) struct ApiDoc;
