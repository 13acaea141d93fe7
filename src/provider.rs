use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use http::{Method, StatusCode};
use hyper::body::Bytes;

use crate::credential::CompositeIdentity;
use crate::error::AuthError;

pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// One HTTP exchange with the identity provider, described independently of
/// any concrete client so that tests can substitute the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRequest {
    pub method: Method,
    pub url: String,
    pub content_type: Option<&'static str>,
    pub authorization: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Single-method exchange capability. One call per AUTH attempt, no retries.
#[async_trait]
pub trait ProviderClient {
    async fn exchange(&self, request: ProviderRequest) -> Result<ProviderResponse>;
}

pub type ArcProviderClient = Arc<dyn ProviderClient + Send + Sync>;

/// Token request validating a composite credential through a password grant.
///
/// Form values are URL-component-escaped; the realm lands in the URL path
/// as-is, an unparsable result later surfaces as a transport rejection.
pub fn password_grant_request(
    base_url: &str,
    id: &CompositeIdentity,
    password: &str,
) -> ProviderRequest {
    let body = format!(
        "username={}&password={}&grant_type=password&client_id={}",
        urlencoding::encode(&id.username),
        urlencoding::encode(password),
        urlencoding::encode(&id.client_id),
    );

    ProviderRequest {
        method: Method::POST,
        url: format!(
            "{}/realms/{}/protocol/openid-connect/token",
            base_url, id.realm
        ),
        content_type: Some(FORM_URLENCODED),
        authorization: None,
        body: Some(body),
    }
}

/// Userinfo request validating a bearer credential.
pub fn userinfo_request(base_url: &str, realm: &str, token: &str) -> ProviderRequest {
    ProviderRequest {
        method: Method::GET,
        url: format!(
            "{}/realms/{}/protocol/openid-connect/userinfo",
            base_url, realm
        ),
        content_type: None,
        authorization: Some(format!("Bearer {}", token)),
        body: None,
    }
}

/// Extract `preferred_username` from a userinfo response body.
///
/// The body is the claims object, either directly or re-encoded as a JSON
/// string; both forms are accepted. Anything without a string-valued
/// `preferred_username` is an invalid payload.
pub fn userinfo_username(body: &[u8]) -> Result<String, AuthError> {
    let claims: serde_json::Value =
        serde_json::from_slice(body).map_err(|_| AuthError::InvalidPayload)?;

    let claims = match claims {
        serde_json::Value::String(encoded) => {
            serde_json::from_str(&encoded).map_err(|_| AuthError::InvalidPayload)?
        }
        direct => direct,
    };

    claims
        .get("preferred_username")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or(AuthError::InvalidPayload)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> CompositeIdentity {
        CompositeIdentity {
            realm: "random-realm".into(),
            client_id: "random-client-id".into(),
            username: "random-username".into(),
        }
    }

    #[test]
    fn password_grant_shape() {
        let req = password_grant_request("https://kc.example.com", &identity(), "random-password");

        assert_eq!(req.method, Method::POST);
        assert_eq!(
            req.url,
            "https://kc.example.com/realms/random-realm/protocol/openid-connect/token"
        );
        assert_eq!(req.content_type, Some(FORM_URLENCODED));
        assert_eq!(req.authorization, None);
        assert_eq!(
            req.body.as_deref(),
            Some("username=random-username&password=random-password&grant_type=password&client_id=random-client-id")
        );
    }

    #[test]
    fn password_grant_escapes_form_values() {
        let id = CompositeIdentity {
            realm: "r".into(),
            client_id: "client&id".into(),
            username: "user name".into(),
        };
        let req = password_grant_request("http://kc", &id, "p@ss/word&=");

        assert_eq!(
            req.body.as_deref(),
            Some("username=user%20name&password=p%40ss%2Fword%26%3D&grant_type=password&client_id=client%26id")
        );
    }

    #[test]
    fn userinfo_shape() {
        let req = userinfo_request("https://kc.example.com", "random-realm", "random-token");

        assert_eq!(req.method, Method::GET);
        assert_eq!(
            req.url,
            "https://kc.example.com/realms/random-realm/protocol/openid-connect/userinfo"
        );
        assert_eq!(req.content_type, None);
        assert_eq!(req.authorization.as_deref(), Some("Bearer random-token"));
        assert_eq!(req.body, None);
    }

    #[test]
    fn username_from_claims_object() {
        let body = br#"{"sub":"deadbeef","preferred_username":"alice"}"#;
        assert_eq!(userinfo_username(body).unwrap(), "alice");
    }

    #[test]
    fn username_from_string_encoded_claims() {
        let body = br#""{\"preferred_username\":\"alice\"}""#;
        assert_eq!(userinfo_username(body).unwrap(), "alice");
    }

    #[test]
    fn username_missing_or_not_a_string() {
        assert!(userinfo_username(br#"{"sub":"deadbeef"}"#).is_err());
        assert!(userinfo_username(br#"{"preferred_username":42}"#).is_err());
        assert!(userinfo_username(br#"{"preferred_username":null}"#).is_err());
        assert!(userinfo_username(br#""just a string""#).is_err());
        assert!(userinfo_username(b"not json at all").is_err());
        assert!(userinfo_username(b"").is_err());
    }
}
