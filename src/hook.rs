use std::sync::Arc;

use anyhow::Result;
use http::StatusCode;

use crate::config::{AuthConfig, AuthScheme};
use crate::credential::{parse_bearer, parse_composite, Credential};
use crate::error::{AuthError, SmtpReply, AUTH_FAILED};
use crate::http::HttpsClient;
use crate::provider::{
    password_grant_request, userinfo_request, userinfo_username, ArcProviderClient,
};

/// Session facts the host hands over with each AUTH attempt.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    /// Name of the listener that accepted the connection.
    pub interface: String,
    /// Correlation id, echoed in the success log record.
    pub id: String,
}

/// Identity vouched for by the provider on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Composite {
        realm: String,
        client_id: String,
        username: String,
    },
    /// `username` is the `preferred_username` claim returned by userinfo.
    Bearer { username: String },
}

/// What the host should do with the AUTH attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    /// The session's interface is not protected here; the host falls through
    /// to its next handler or default policy.
    Passthrough,
    Accept { identity: Identity },
    /// Refused. The reply is the same whatever the internal reason was.
    Reject { reply: SmtpReply },
}

/// The authentication hook: one immutable config, one shared provider
/// client, no other state. Safe to call from any number of sessions at once.
pub struct AuthKeycloak {
    config: AuthConfig,
    provider: ArcProviderClient,
}

impl AuthKeycloak {
    /// Hook wired to the production TLS client.
    pub fn new(config: AuthConfig) -> Result<Self> {
        Ok(Self::with_client(config, Arc::new(HttpsClient::new()?)))
    }

    /// Hook with a caller-supplied exchange capability.
    pub fn with_client(config: AuthConfig, provider: ArcProviderClient) -> Self {
        Self { config, provider }
    }

    /// Decide one AUTH attempt. At most one provider exchange per call.
    pub async fn handle(&self, credential: &Credential, session: &SessionInfo) -> AuthDecision {
        if !self.config.interfaces.contains(&session.interface) {
            return AuthDecision::Passthrough;
        }

        match self.authenticate(credential).await {
            Ok(identity) => {
                match &identity {
                    Identity::Composite {
                        realm,
                        client_id,
                        username,
                    } => {
                        tracing::info!(
                            id = %session.id,
                            realm = %realm,
                            client_id = %client_id,
                            username = %username,
                            "authentication accepted"
                        );
                    }
                    Identity::Bearer { username } => {
                        tracing::info!(
                            id = %session.id,
                            username = %username,
                            "authentication accepted"
                        );
                    }
                }
                AuthDecision::Accept { identity }
            }
            // All failures collapse into one opaque reply; the reason stays
            // internal and rejections are not logged.
            Err(_) => AuthDecision::Reject { reply: AUTH_FAILED },
        }
    }

    async fn authenticate(&self, credential: &Credential) -> Result<Identity, AuthError> {
        match self.config.scheme {
            AuthScheme::Composite => {
                let id = parse_composite(&credential.username)?;
                if self.config.force_realms && !self.config.realm_allowed(&id.realm) {
                    return Err(AuthError::RealmNotAllowed);
                }

                let request =
                    password_grant_request(&self.config.keycloak_url, &id, &credential.password);
                let response = self
                    .provider
                    .exchange(request)
                    .await
                    .map_err(AuthError::Transport)?;
                if response.status != StatusCode::OK {
                    return Err(AuthError::ProviderRejected(response.status));
                }

                // A 200 on the token endpoint is sufficient proof; the token
                // itself is not needed.
                Ok(Identity::Composite {
                    realm: id.realm,
                    client_id: id.client_id,
                    username: id.username,
                })
            }
            AuthScheme::Bearer => {
                let realm = parse_bearer(&credential.username)?;
                if self.config.force_realms && !self.config.realm_allowed(realm) {
                    return Err(AuthError::RealmNotAllowed);
                }

                let request =
                    userinfo_request(&self.config.keycloak_url, realm, &credential.password);
                let response = self
                    .provider
                    .exchange(request)
                    .await
                    .map_err(AuthError::Transport)?;
                if response.status != StatusCode::OK {
                    return Err(AuthError::ProviderRejected(response.status));
                }

                let username = userinfo_username(&response.body)?;
                Ok(Identity::Bearer { username })
            }
        }
    }
}
