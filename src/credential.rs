use crate::error::AuthError;

/// Username and password exactly as presented by the SMTP client during AUTH.
#[derive(Debug, Clone)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

/// Identity parts carried by a composite username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeIdentity {
    pub realm: String,
    pub client_id: String,
    pub username: String,
}

/// Parse a composite username of the form `realm/client_id/username`.
///
/// Exactly three `/`-separated segments are required, each non-empty once
/// trimmed. Segments are kept as-is: trimming is only the emptiness check,
/// the provider receives the raw values.
pub fn parse_composite(username: &str) -> Result<CompositeIdentity, AuthError> {
    let segments: Vec<&str> = username.split('/').collect();
    match segments.as_slice() {
        [realm, client_id, user]
            if [realm, client_id, user].iter().all(|s| !s.trim().is_empty()) =>
        {
            Ok(CompositeIdentity {
                realm: realm.to_string(),
                client_id: client_id.to_string(),
                username: user.to_string(),
            })
        }
        _ => Err(AuthError::MalformedCredential),
    }
}

/// In bearer mode the whole username is the realm name; the password carries
/// the access token.
pub fn parse_bearer(username: &str) -> Result<&str, AuthError> {
    if username.trim().is_empty() {
        return Err(AuthError::MalformedCredential);
    }
    Ok(username)
}
