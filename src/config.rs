use anyhow::Result;
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;
use std::net::SocketAddr;

use crate::domain::{Role, User};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const LOCAL_CONFIG_PATH: &str = "config/local.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub enable_cors: bool,
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human readable output.
    #[serde(default)]
    pub json: bool,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    pub id: i64,
    pub username: String,
    pub token: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl From<UserConfig> for User {
    fn from(cfg: UserConfig) -> Self {
        Self {
            id: cfg.id,
            username: cfg.username,
            token: cfg.token,
            roles: cfg.roles,
        }
    }
}

impl UserConfig {
    pub fn has_placeholder_token(&self) -> bool {
        self.token.is_empty() || self.token.starts_with("__SET_VIA_ENV")
    }
}

impl AuthConfig {
    /// Users whose token was left at a placeholder value.
    pub fn unset_tokens(&self) -> impl Iterator<Item = &UserConfig> {
        self.users.iter().filter(|u| u.has_placeholder_token())
    }

    /// Users that can sign in.
    pub fn active_users(&self) -> impl Iterator<Item = &UserConfig> {
        self.users.iter().filter(|u| !u.has_placeholder_token())
    }
}

impl Config {
    /// Reads the defaults, then the optional untracked local file, then the environment.
    pub fn load() -> Result<Self> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file(DEFAULT_CONFIG_PATH))
                .merge(Toml::file(LOCAL_CONFIG_PATH)),
        )
    }

    /// Layers `SOLAR__SECTION__KEY` environment variables over the given base.
    pub fn from_figment(base: Figment) -> Result<Self> {
        let figment = base.merge(Env::prefixed("SOLAR__").split("__"));
        Ok(figment.extract()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [server]
        host = "0.0.0.0"
        port = 9090

        [[auth.users]]
        id = 7
        username = "ada"
        token = "__SET_VIA_ENV_ADA__"
        roles = ["ROLE_USER"]

        [[auth.users]]
        id = 8
        username = "grace"
        token = "0123456789abcdef"
        roles = ["ROLE_USER", "ROLE_ADMIN"]
    "#;

    #[test]
    fn test_config_from_toml_with_defaults() {
        let cfg = Config::from_figment(Figment::new().merge(Toml::string(SAMPLE))).unwrap();

        assert_eq!(cfg.server.socket_addr().unwrap().port(), 9090);
        assert_eq!(cfg.server.request_timeout_secs, 30);
        assert!(!cfg.server.enable_cors);
        assert!(!cfg.logging.json);
        assert!(cfg.db.url.is_none());
        assert_eq!(cfg.db.max_connections, 10);
        assert_eq!(cfg.auth.users.len(), 2);
        assert_eq!(cfg.auth.users[1].roles, vec![Role::User, Role::Admin]);
    }

    #[test]
    fn test_placeholder_tokens_are_reported() {
        let cfg = Config::from_figment(Figment::new().merge(Toml::string(SAMPLE))).unwrap();
        let unset: Vec<&str> = cfg.auth.unset_tokens().map(|u| u.username.as_str()).collect();
        assert_eq!(unset, vec!["ada"]);
        let active: Vec<i64> = cfg.auth.active_users().map(|u| u.id).collect();
        assert_eq!(active, vec![8]);
    }
}
