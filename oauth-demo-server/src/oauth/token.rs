//! Token endpoint grants

use crate::config::ExpiresInUnit;
use crate::errors::FlowError;
use crate::oauth::claims;
use crate::oauth::metadata::{MetadataResolver, TOKEN_ENDPOINT};
use crate::oauth::models::{FlowSettings, Grant, TokenResponse};
use chrono::Utc;
use http::header::ACCEPT;
use log::{debug, info, warn};
use reqwest::Client;

/// Exchanges grants for tokens at the provider's token endpoint
#[derive(Clone)]
pub struct TokenExchanger {
    client: Client,
    metadata: MetadataResolver,
    expires_in_unit: ExpiresInUnit,
}

impl TokenExchanger {
    pub fn new(client: Client, metadata: MetadataResolver, expires_in_unit: ExpiresInUnit) -> Self {
        Self {
            client,
            metadata,
            expires_in_unit,
        }
    }

    /// Perform `grant` with the client credentials of `settings` and return
    /// the settings updated with the new tokens, expiry and display claims.
    ///
    /// A response without `refresh_token` keeps the previously stored one.
    pub async fn exchange(
        &self,
        mut settings: FlowSettings,
        grant: &Grant,
    ) -> Result<FlowSettings, FlowError> {
        let token_endpoint = self
            .metadata
            .resolve_endpoint(&settings.well_known_url, TOKEN_ENDPOINT)
            .await?;

        debug!(
            "Requesting {} grant from {}",
            grant.grant_type(),
            token_endpoint
        );

        let requested_at = Utc::now();
        let response = self
            .client
            .post(&token_endpoint)
            .basic_auth(&settings.client_id, Some(&settings.client_secret))
            .header(ACCEPT, "application/json")
            .form(&grant.form_params(&settings))
            .send()
            .await
            .map_err(FlowError::TokenExchange)?;

        let status = response.status();
        let body = response.text().await.map_err(FlowError::TokenExchange)?;
        if !status.is_success() {
            warn!(
                "Token endpoint rejected {} grant with {}",
                grant.grant_type(),
                status
            );
            return Err(FlowError::InvalidGrant { status, body });
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| FlowError::MalformedTokenResponse(e.to_string()))?;

        settings.access_token_claims = claims::decode_for_display(&token.access_token);
        settings.expires_at =
            requested_at.checked_add_signed(self.expires_in_unit.to_duration(token.expires_in));
        settings.access_token = Some(token.access_token);
        if let Some(refresh_token) = token.refresh_token {
            settings.refresh_token = Some(refresh_token);
        }

        info!(
            "Obtained access token via {} grant for client '{}'",
            grant.grant_type(),
            settings.client_id
        );
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confique::Config;
    use crate::config::Settings;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn idp_with_token_response(template: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/oauth-authorization-server"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "authorization_endpoint": format!("{}/authorize", server.uri()),
                "token_endpoint": format!("{}/token", server.uri()),
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    }

    fn flow_settings(idp: &MockServer) -> FlowSettings {
        let mut settings = FlowSettings::defaults(&Settings::builder().load().unwrap());
        settings.client_id = "client".to_string();
        settings.client_secret = "secret".to_string();
        settings.well_known_url = format!("{}/.well-known/oauth-authorization-server", idp.uri());
        settings
    }

    fn exchanger(unit: ExpiresInUnit) -> TokenExchanger {
        let client = Client::new();
        TokenExchanger::new(client.clone(), MetadataResolver::new(client), unit)
    }

    #[tokio::test]
    async fn test_authorization_code_grant() {
        let idp = idp_with_token_response(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "refresh_token": "refresh-1",
            "expires_in": 43199,
            "token_type": "Bearer"
        })))
        .await;
        let before = Utc::now();

        let settings = exchanger(ExpiresInUnit::Seconds)
            .exchange(
                flow_settings(&idp),
                &Grant::AuthorizationCode {
                    code: "ABC".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(settings.access_token.as_deref(), Some("access-1"));
        assert_eq!(settings.refresh_token.as_deref(), Some("refresh-1"));
        let expires_at = settings.expires_at.unwrap();
        assert!(expires_at > before);
        assert!(expires_at >= before + chrono::Duration::seconds(43199));
        // opaque token, nothing to display
        assert!(settings.access_token_claims.is_none());
    }

    #[tokio::test]
    async fn test_request_shape() {
        let idp = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/oauth-authorization-server"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token_endpoint": format!("{}/token", idp.uri()),
            })))
            .mount(&idp)
            .await;
        let basic = format!("Basic {}", STANDARD.encode("client:secret"));
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(header("authorization", basic.as_str()))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=ABC"))
            .and(body_string_contains(
                "redirect_uri=http%3A%2F%2Flocalhost%3A9090%2Fcallback",
            ))
            .and(body_string_contains("scope=ag1+ag2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "access-1",
                "expires_in": 60
            })))
            .expect(1)
            .mount(&idp)
            .await;

        exchanger(ExpiresInUnit::Seconds)
            .exchange(
                flow_settings(&idp),
                &Grant::AuthorizationCode {
                    code: "ABC".to_string(),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_refresh_keeps_refresh_token_when_not_rotated() {
        let idp = idp_with_token_response(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-2",
            "expires_in": 3600
        })))
        .await;
        let mut settings = flow_settings(&idp);
        settings.access_token = Some("access-1".to_string());
        settings.refresh_token = Some("refresh-1".to_string());

        let settings = exchanger(ExpiresInUnit::Seconds)
            .exchange(
                settings,
                &Grant::RefreshToken {
                    refresh_token: "refresh-1".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(settings.access_token.as_deref(), Some("access-2"));
        assert_eq!(settings.refresh_token.as_deref(), Some("refresh-1"));
    }

    #[tokio::test]
    async fn test_expires_in_milliseconds() {
        let idp = idp_with_token_response(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "expires_in": 7_200_000
        })))
        .await;
        let before = Utc::now();

        let settings = exchanger(ExpiresInUnit::Milliseconds)
            .exchange(
                flow_settings(&idp),
                &Grant::AuthorizationCode {
                    code: "ABC".to_string(),
                },
            )
            .await
            .unwrap();

        let lifetime = settings.expires_at.unwrap() - before;
        assert!(lifetime >= chrono::Duration::hours(2));
        assert!(lifetime < chrono::Duration::hours(3));
    }

    #[tokio::test]
    async fn test_jwt_claims_are_decoded() {
        let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(r#"{"sub":"u1"}"#);
        let access_token = format!("eyJhbGciOiJSUzI1NiJ9.{payload}.sig");
        let idp = idp_with_token_response(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": access_token,
            "refresh_token": "refresh-1",
            "expires_in": 3600
        })))
        .await;

        let settings = exchanger(ExpiresInUnit::Seconds)
            .exchange(
                flow_settings(&idp),
                &Grant::AuthorizationCode {
                    code: "ABC".to_string(),
                },
            )
            .await
            .unwrap();

        assert!(settings.access_token_claims.unwrap().contains("\"sub\": \"u1\""));
    }

    #[tokio::test]
    async fn test_invalid_grant_propagates_body() {
        let idp = idp_with_token_response(
            ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_grant"}"#),
        )
        .await;

        let err = exchanger(ExpiresInUnit::Seconds)
            .exchange(
                flow_settings(&idp),
                &Grant::AuthorizationCode {
                    code: "expired".to_string(),
                },
            )
            .await
            .unwrap_err();

        match err {
            FlowError::InvalidGrant { status, body } => {
                assert_eq!(status, http::StatusCode::BAD_REQUEST);
                assert_eq!(body, r#"{"error":"invalid_grant"}"#);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_fields_are_malformed() {
        let idp = idp_with_token_response(
            ResponseTemplate::new(200).set_body_json(json!({"token_type": "Bearer"})),
        )
        .await;

        let err = exchanger(ExpiresInUnit::Seconds)
            .exchange(
                flow_settings(&idp),
                &Grant::AuthorizationCode {
                    code: "ABC".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::MalformedTokenResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_token_endpoint() {
        let idp = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/oauth-authorization-server"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token_endpoint": "http://127.0.0.1:1/token",
            })))
            .mount(&idp)
            .await;

        let err = exchanger(ExpiresInUnit::Seconds)
            .exchange(
                flow_settings(&idp),
                &Grant::AuthorizationCode {
                    code: "ABC".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::TokenExchange(_)));
    }
}
