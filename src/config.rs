use std::collections::HashSet;
use std::io::Read;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Process-wide authentication settings. Loaded once, never mutated.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthConfig {
    /// Base URL of the Keycloak deployment, without any realm path.
    pub keycloak_url: String,

    /// Names of the SMTP listeners this handler takes part in. AUTH attempts
    /// on any other interface pass through untouched.
    pub interfaces: HashSet<String>,

    #[serde(default = "default_scheme")]
    pub scheme: AuthScheme,

    /// When set, only realms listed in `realms` may authenticate.
    #[serde(default)]
    pub force_realms: bool,
    #[serde(default)]
    pub realms: HashSet<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// Username is `realm/client_id/username`; the password is exchanged
    /// through an OAuth2 password grant.
    Composite,
    /// Username is the realm name; the password is a pre-issued token checked
    /// against the userinfo endpoint.
    Bearer,
}

impl AuthConfig {
    /// Realm allow-list membership. Callers consult it only when
    /// `force_realms` is set; an empty list then refuses every realm.
    pub fn realm_allowed(&self, realm: &str) -> bool {
        self.realms.contains(realm)
    }
}

pub fn read_config(config_file: PathBuf) -> Result<AuthConfig> {
    let mut file = std::fs::OpenOptions::new()
        .read(true)
        .open(config_file.as_path())?;

    let mut config = String::new();
    file.read_to_string(&mut config)?;

    Ok(toml::from_str(&config)?)
}

fn default_scheme() -> AuthScheme {
    AuthScheme::Composite
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config() {
        let conf: AuthConfig = toml::from_str(
            r#"
            keycloak_url = "https://sso.example.com"
            interfaces = ["submission"]
            "#,
        )
        .unwrap();

        assert_eq!(conf.scheme, AuthScheme::Composite);
        assert!(!conf.force_realms);
        assert!(conf.realms.is_empty());
        assert!(conf.interfaces.contains("submission"));
    }

    #[test]
    fn full_config() {
        let conf: AuthConfig = toml::from_str(
            r#"
            keycloak_url = "https://sso.example.com"
            interfaces = ["submission", "smtp"]
            scheme = "bearer"
            force_realms = true
            realms = ["tenant-a", "tenant-b"]
            "#,
        )
        .unwrap();

        assert_eq!(conf.scheme, AuthScheme::Bearer);
        assert!(conf.force_realms);
        assert!(conf.realm_allowed("tenant-a"));
        assert!(conf.realm_allowed("tenant-b"));
        assert!(!conf.realm_allowed("tenant-c"));
    }

    #[test]
    fn config_from_file() {
        let path = std::env::temp_dir().join("smtp-auth-keycloak-test.toml");
        std::fs::write(
            &path,
            "keycloak_url = \"http://127.0.0.1:8080\"\ninterfaces = [\"lab\"]\n",
        )
        .unwrap();

        let conf = read_config(path.clone()).unwrap();
        std::fs::remove_file(path).unwrap();

        assert_eq!(conf.keycloak_url, "http://127.0.0.1:8080");
        assert!(conf.interfaces.contains("lab"));
    }
}
