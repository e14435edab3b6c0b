use crate::core::value::FormValues;
use crate::error::ConfigError;
use crate::submission::{Credentials, ListTarget, PayloadOptions, TransportConfig};
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_CLIENT_ID: &str = "CONSENT_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "CONSENT_CLIENT_SECRET";
const ENV_REDIRECT_URI: &str = "CONSENT_REDIRECT_URI";
const ENV_SITE_URL: &str = "CONSENT_SITE_URL";
const ENV_LIST_NAME: &str = "CONSENT_LIST_NAME";
const ENV_ACCESS_TOKEN: &str = "CONSENT_ACCESS_TOKEN";
const ENV_LIST_ITEM_TYPE: &str = "CONSENT_LIST_ITEM_TYPE";
const ENV_PROXY_URL: &str = "CONSENT_PROXY_URL";

pub const DEFAULT_LOG_FILE: &str = "consent-form.log";

/// Connection settings for the list endpoint. Values are opaque; nothing
/// here validates or rotates them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub site_url: Option<String>,
    pub list_name: Option<String>,
    pub access_token: Option<String>,
    pub list_item_type: Option<String>,
    pub proxy_url: Option<String>,
}

impl Config {
    /// Read the optional YAML file, then apply `CONSENT_*` environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_yaml_str(&read(path)?, path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_yaml_str(source: &str, path: &Path) -> Result<Self, ConfigError> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(source).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let slots: [(&str, &mut Option<String>); 8] = [
            (ENV_CLIENT_ID, &mut self.client_id),
            (ENV_CLIENT_SECRET, &mut self.client_secret),
            (ENV_REDIRECT_URI, &mut self.redirect_uri),
            (ENV_SITE_URL, &mut self.site_url),
            (ENV_LIST_NAME, &mut self.list_name),
            (ENV_ACCESS_TOKEN, &mut self.access_token),
            (ENV_LIST_ITEM_TYPE, &mut self.list_item_type),
            (ENV_PROXY_URL, &mut self.proxy_url),
        ];
        for (name, slot) in slots {
            if let Some(value) = lookup(name).filter(|v| !v.is_empty()) {
                *slot = Some(value);
            }
        }
    }

    /// Proxy mode wins when a proxy URL is set; otherwise the direct
    /// SharePoint target needs a site, a list and a token. Empty strings
    /// count as unset.
    pub fn transport(&self) -> Result<TransportConfig, ConfigError> {
        if let Some(url) = present(&self.proxy_url) {
            return Ok(TransportConfig::Proxy { url });
        }

        let site_url = present(&self.site_url).ok_or(ConfigError::Missing("site_url"))?;
        let list_name = present(&self.list_name).ok_or(ConfigError::Missing("list_name"))?;
        let access_token =
            present(&self.access_token).ok_or(ConfigError::Missing("access_token"))?;

        Ok(TransportConfig::SharePoint {
            target: ListTarget {
                site_url,
                list_name,
            },
            credentials: Credentials {
                access_token,
                client_id: present(&self.client_id),
                client_secret: present(&self.client_secret),
                redirect_uri: present(&self.redirect_uri),
            },
        })
    }

    pub fn payload_options(&self) -> PayloadOptions {
        PayloadOptions {
            list_item_type: present(&self.list_item_type),
        }
    }
}

fn present(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|v| !v.is_empty()).map(str::to_owned)
}

/// Interactive sessions log here unless `--log-file` says otherwise.
pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_LOG_FILE)
}

/// Load prefilled form values from a YAML (or JSON) document keyed by
/// field key.
pub fn load_values(path: &Path) -> Result<FormValues, ConfigError> {
    let source = read(path)?;
    values_from_str(&source, path)
}

pub fn values_from_str(source: &str, path: &Path) -> Result<FormValues, ConfigError> {
    if source.trim().is_empty() {
        return Ok(FormValues::new());
    }
    let document: IndexMap<String, serde_json::Value> =
        serde_yaml::from_str(source).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
    Ok(FormValues::from_document(&document)?)
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })
}
