use http::StatusCode;
use thiserror::Error;

/// Reply handed back to the SMTP client when authentication is refused.
///
/// Every internal failure collapses into the same reply: the client must not
/// be able to tell a malformed credential from a provider outage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub message: &'static str,
}

pub const AUTH_FAILED: SmtpReply = SmtpReply {
    code: 535,
    message: "Authentication failed",
};

/// Why an AUTH attempt was refused. Internal only, never sent to the client.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("malformed credential")]
    MalformedCredential,
    #[error("realm not allowed")]
    RealmNotAllowed,
    #[error("transport error: {0}")]
    Transport(anyhow::Error),
    #[error("provider answered {0}")]
    ProviderRejected(StatusCode),
    #[error("invalid provider payload")]
    InvalidPayload,
}
