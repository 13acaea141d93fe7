pub mod config;
pub mod credential;
pub mod error;
pub mod hook;
pub mod http;
pub mod provider;

// An AUTH attempt flows through 4 small parts:
// - the credential presented by the client (credential)
// - the immutable process configuration (config)
// - a description of the provider exchange and its transport (provider, http)
// - the decision logic tying them together (hook)
