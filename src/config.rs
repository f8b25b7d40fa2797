use reqwest::Url;
use std::time::Duration;

use crate::api::parse_base_url;
use crate::client::{ApiClient, ReqwestHttp};
use crate::error::ClientError;
use crate::pages::PageOptions;

pub const DEFAULT_BASE_URL: &str = "http://localhost";
pub const BASE_URL_ENV: &str = "SKI_RESULTS_BASE_URL";

/// Runtime settings shared by every command
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    /// None waits for the server indefinitely
    pub timeout: Option<Duration>,
    pub long_times: bool,
}

impl Config {
    pub fn new(base_url: &str, timeout_secs: Option<u64>, long_times: bool) -> Result<Config, ClientError> {
        Ok(Config {
            base_url: parse_base_url(base_url)?,
            timeout: timeout_secs.filter(|&secs| secs > 0).map(Duration::from_secs),
            long_times,
        })
    }

    pub fn http_client(&self) -> Result<ApiClient<ReqwestHttp>, ClientError> {
        let http = ReqwestHttp::new(self.timeout)?;
        Ok(ApiClient::new(http, self.base_url.clone()))
    }

    pub fn page_options(&self) -> PageOptions {
        PageOptions { long_times: self.long_times }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new() {
        let config = Config::new("https://results.example.com", Some(10), true).unwrap();
        assert_eq!(config.base_url.as_str(), "https://results.example.com/");
        assert_eq!(config.timeout, Some(Duration::from_secs(10)));
        assert!(config.page_options().long_times);
    }

    #[test]
    fn test_default_base_url_uses_port_80() {
        let config = Config::new(DEFAULT_BASE_URL, None, false).unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost/");
        assert_eq!(config.base_url.port_or_known_default(), Some(80));
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let config = Config::new(DEFAULT_BASE_URL, Some(0), false).unwrap();
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_invalid_base_url() {
        let err = Config::new("localhost", None, false).unwrap_err();
        assert!(err.to_string().contains("invalid base url"));
    }
}
