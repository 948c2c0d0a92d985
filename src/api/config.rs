//! Purpose: Explicit client configuration replacing a process-wide manager.
//! Exports: `ClientConfig`, `PRODUCTION_BASE_URL`, `DEVELOPMENT_BASE_URL`.
//! Role: Constructed once by the caller and passed to `Client::new`.
//! Invariants: Base URLs are http(s) and always end with `/` so paths join beneath them.
//! Invariants: Locale is a two-letter prefix; device id is stable for the config's lifetime.
use getrandom::fill as fill_random;
use url::Url;

use crate::core::error::{Error, ErrorKind};

pub const PRODUCTION_BASE_URL: &str = "https://mburger.cloud/api/";
pub const DEVELOPMENT_BASE_URL: &str = "https://dev.mburger.cloud/api/";
pub const DEFAULT_API_VERSION: &str = "3";

#[derive(Clone, Debug)]
pub struct ClientConfig {
    api_token: String,
    development: bool,
    base_url: Option<Url>,
    locale: String,
    device_id: String,
    api_version: String,
}

impl ClientConfig {
    pub fn new(api_token: impl Into<String>) -> Result<Self, Error> {
        let api_token = api_token.into();
        if api_token.trim().is_empty() {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("api token must not be empty")
                .with_hint("Pass --token or set CMSKIT_API_TOKEN."));
        }
        Ok(Self {
            api_token,
            development: false,
            base_url: None,
            locale: default_locale(),
            device_id: generate_device_id()?,
            api_version: DEFAULT_API_VERSION.to_string(),
        })
    }

    pub fn with_development(mut self, development: bool) -> Self {
        self.development = development;
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, Error> {
        self.base_url = Some(normalize_base_url(base_url)?);
        Ok(self)
    }

    pub fn with_locale(mut self, locale: &str) -> Self {
        self.locale = locale_prefix(locale).unwrap_or_else(|| "en".to_string());
        self
    }

    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = device_id.into();
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    pub fn development(&self) -> bool {
        self.development
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Explicit base URL, else the production or development host.
    pub fn base_url(&self) -> Result<Url, Error> {
        if let Some(url) = &self.base_url {
            return Ok(url.clone());
        }
        let raw = if self.development {
            DEVELOPMENT_BASE_URL
        } else {
            PRODUCTION_BASE_URL
        };
        normalize_base_url(raw)
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.base_url()?.join(path).map_err(|err| {
            Error::new(ErrorKind::Usage)
                .with_message(format!("invalid api path `{path}`"))
                .with_source(err)
        })
    }
}

fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    let mut url = Url::parse(raw).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid base url")
            .with_source(err)
    })?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("base url must use http or https scheme"));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn locale_prefix(raw: &str) -> Option<String> {
    let prefix: String = raw.chars().take(2).collect();
    if prefix.len() == 2 && prefix.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(prefix.to_ascii_lowercase())
    } else {
        None
    }
}

fn default_locale() -> String {
    std::env::var("LANG")
        .ok()
        .and_then(|lang| locale_prefix(&lang))
        .unwrap_or_else(|| "en".to_string())
}

fn generate_device_id() -> Result<String, Error> {
    let mut bytes = [0u8; 16];
    fill_random(&mut bytes).map_err(|err| {
        Error::new(ErrorKind::Internal).with_message(format!("failed to generate device id: {err}"))
    })?;
    Ok(bytes.iter().map(|byte| format!("{byte:02x}")).collect())
}

#[cfg(test)]
mod tests {
    use super::{ClientConfig, locale_prefix, normalize_base_url};
    use crate::core::error::ErrorKind;

    #[test]
    fn empty_token_is_rejected() {
        let err = ClientConfig::new("  ").expect_err("empty");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn development_switches_default_host() {
        let config = ClientConfig::new("tok").expect("config");
        let url = config.base_url().expect("production url");
        assert_eq!(url.as_str(), "https://mburger.cloud/api/");
        let config = config.with_development(true);
        let url = config.base_url().expect("development url");
        assert_eq!(url.as_str(), "https://dev.mburger.cloud/api/");
    }

    #[test]
    fn endpoints_join_under_base_path() {
        let config = ClientConfig::new("tok")
            .expect("config")
            .with_base_url("http://localhost:8080/api")
            .expect("base url");
        let url = config.endpoint("blocks/4/sections").expect("endpoint");
        assert_eq!(url.as_str(), "http://localhost:8080/api/blocks/4/sections");
    }

    #[test]
    fn base_url_rejects_other_schemes() {
        let err = normalize_base_url("ftp://example.com").expect_err("scheme");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn locale_uses_two_letter_prefix() {
        assert_eq!(locale_prefix("it_IT.UTF-8").as_deref(), Some("it"));
        assert_eq!(locale_prefix("C"), None);
        let config = ClientConfig::new("tok").expect("config").with_locale("FR-fr");
        assert_eq!(config.locale(), "fr");
    }

    #[test]
    fn device_id_is_random_hex() {
        let a = ClientConfig::new("tok").expect("config");
        let b = ClientConfig::new("tok").expect("config");
        assert_eq!(a.device_id().len(), 32);
        assert!(a.device_id().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a.device_id(), b.device_id());
    }
}
