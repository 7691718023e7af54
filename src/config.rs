use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

use crate::utils::security::AdminPassword;

const DEFAULT_SITE_URL: &str = "https://pilates-sp.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub site_url: String,
    pub admin_password: AdminPassword,
    pub sitemap_refresh_token: Option<String>,
    pub content_dir: PathBuf,
    pub upload_dir: PathBuf,
    /// Build estático do painel, servido em `/admin`.
    pub admin_dir: PathBuf,
    pub secure_cookies: bool,
    pub ping_search_engines: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} não está definido")]
    Missing(&'static str),
    #[error("ADMIN_PASSWORD_HASH não é um hash argon2 válido")]
    InvalidHash,
    #[error("falha ao gerar hash da senha do admin: {0}")]
    Hash(argon2::password_hash::Error),
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            port: try_load("PORT", 3000),
            database_url,
            site_url: try_load("SITE_URL", DEFAULT_SITE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            admin_password: load_admin_password()?,
            sitemap_refresh_token: var("SITEMAP_REFRESH_TOKEN").filter(|t| !t.is_empty()),
            content_dir: PathBuf::from(try_load("CONTENT_DIR", "content/blog".to_string())),
            upload_dir: PathBuf::from(try_load("UPLOAD_DIR", "uploads".to_string())),
            admin_dir: PathBuf::from(try_load("ADMIN_DIR", "public/admin".to_string())),
            secure_cookies: try_load("COOKIE_SECURE", false),
            ping_search_engines: try_load("SITEMAP_PING", true),
        })
    }

    pub fn sitemap_url(&self) -> String {
        format!("{}/sitemap.xml", self.site_url)
    }
}

// ADMIN_PASSWORD_HASH tem precedência; ADMIN_PASSWORD em texto é convertido no boot
fn load_admin_password() -> Result<AdminPassword, ConfigError> {
    if let Some(hash) = var("ADMIN_PASSWORD_HASH") {
        return AdminPassword::from_hash(&hash).ok_or(ConfigError::InvalidHash);
    }

    let plain = var("ADMIN_PASSWORD").ok_or(ConfigError::Missing("ADMIN_PASSWORD_HASH ou ADMIN_PASSWORD"))?;
    warn!("ADMIN_PASSWORD em texto puro; prefira ADMIN_PASSWORD_HASH");
    AdminPassword::from_plain(&plain).map_err(ConfigError::Hash)
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = var(key) else {
        info!("{key} não definido, usando o padrão: {default}");
        return default;
    };

    raw.parse().unwrap_or_else(|e| {
        warn!("Valor inválido para {key} ({e}), usando o padrão: {default}");
        default
    })
}

#[cfg(test)]
impl Config {
    pub fn for_tests(admin_password: &str) -> Self {
        Self {
            port: 0,
            database_url: "postgres://localhost/pilates_test".into(),
            site_url: DEFAULT_SITE_URL.into(),
            admin_password: AdminPassword::from_plain(admin_password).unwrap(),
            sitemap_refresh_token: None,
            content_dir: PathBuf::from("content/blog"),
            upload_dir: PathBuf::from("uploads"),
            admin_dir: PathBuf::from("public/admin"),
            secure_cookies: false,
            ping_search_engines: false,
        }
    }
}
