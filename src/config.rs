use std::fs;

use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use directories::BaseDirs;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use url::Url;

use crate::error::SsoError;

pub const SSO_FILE_ENV: &str = "ORG_SSO_FILE";

/// Both spellings are sent; the portal is inconsistent about which one it reads.
pub const BEARER_HEADERS: [&str; 2] = ["x-amz-sso_bearer_token", "x-amz-sso-bearer-token"];

/// Contents of an AWS SSO token cache file (`~/.aws/sso/cache/*.json`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsoCache {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub start_url: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
}

/// Everything the pipeline needs from the environment, built once at startup.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub base_url: String,
    pub headers: HeaderMap,
    pub relay_state_prefix: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl PortalConfig {
    pub fn new(
        base_url: &str,
        access_token: &str,
        start_url: &str,
    ) -> Result<Self, SsoError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            headers: bearer_headers(access_token)?,
            relay_state_prefix: relay_state_prefix(start_url),
            expires_at: None,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, SsoError> {
        self.base_url = normalize_base_url(base_url)?;
        Ok(self)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads the SSO cache named by `path`, falling back to `ORG_SSO_FILE`.
    pub fn resolve(path: Option<&str>) -> Result<PortalConfig, SsoError> {
        let env_path = std::env::var(SSO_FILE_ENV).ok();
        let cache_path = Self::resolve_path(path, env_path.as_deref())?;

        if !cache_path.exists() {
            return Err(SsoError::SsoFileNotFound(cache_path));
        }

        let content = fs::read_to_string(&cache_path)
            .map_err(|_| SsoError::SsoFileRead(cache_path.clone()))?;
        let cache: SsoCache = serde_json::from_str(&content)
            .map_err(|err| SsoError::SsoFileParse(err.to_string()))?;

        Self::resolve_cache(cache)
    }

    pub fn resolve_path(
        flag: Option<&str>,
        env_value: Option<&str>,
    ) -> Result<Utf8PathBuf, SsoError> {
        let raw = flag
            .or(env_value)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(SsoError::MissingSsoFile)?;
        expand_home(raw)
    }

    pub fn resolve_cache(cache: SsoCache) -> Result<PortalConfig, SsoError> {
        let region = cache.region.ok_or(SsoError::MissingField("region"))?;
        let start_url = cache.start_url.ok_or(SsoError::MissingField("startUrl"))?;
        let access_token = cache
            .access_token
            .ok_or(SsoError::MissingField("accessToken"))?;

        let mut config = PortalConfig::new(&portal_url(&region), &access_token, &start_url)?;
        config.expires_at = cache.expires_at.as_deref().and_then(parse_expiry);
        Ok(config)
    }
}

pub fn portal_url(region: &str) -> String {
    format!("https://portal.sso.{region}.amazonaws.com")
}

pub fn relay_state_prefix(start_url: &str) -> String {
    format!("{}/saml/custom/", start_url.trim_end_matches('/'))
}

fn normalize_base_url(raw: &str) -> Result<String, SsoError> {
    let parsed = Url::parse(raw).map_err(|err| SsoError::InvalidBaseUrl(format!("{raw}: {err}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SsoError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

fn bearer_headers(access_token: &str) -> Result<HeaderMap, SsoError> {
    let value = HeaderValue::from_str(access_token.trim())
        .map_err(|err| SsoError::InvalidHeader(err.to_string()))?;
    let mut headers = HeaderMap::new();
    for name in BEARER_HEADERS {
        headers.insert(name, value.clone());
    }
    Ok(headers)
}

fn expand_home(raw: &str) -> Result<Utf8PathBuf, SsoError> {
    let Some(rest) = raw.strip_prefix('~') else {
        return Ok(Utf8PathBuf::from(raw));
    };
    let home = BaseDirs::new()
        .and_then(|dirs| Utf8PathBuf::from_path_buf(dirs.home_dir().to_path_buf()).ok())
        .ok_or_else(|| SsoError::SsoFileRead(Utf8PathBuf::from(raw)))?;
    Ok(home.join(rest.trim_start_matches('/')))
}

// Older CLI versions write `2024-01-01T00:00:00UTC` instead of RFC 3339.
fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    let normalized = match raw.strip_suffix("UTC") {
        Some(stem) => format!("{stem}Z"),
        None => raw.to_string(),
    };
    DateTime::parse_from_rfc3339(&normalized)
        .ok()
        .map(|value| value.with_timezone(&Utc))
}
