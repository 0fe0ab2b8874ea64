use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::orchestrator::RunnerConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub profiles: ProfilesConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub driver: DriverConfig,
    #[serde(default)]
    pub images: Option<ImagesConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    5000
}

/// Profile persistence configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProfilesConfig {
    #[serde(default = "default_profiles_path")]
    pub path: PathBuf,
}

impl Default for ProfilesConfig {
    fn default() -> Self {
        Self {
            path: default_profiles_path(),
        }
    }
}

fn default_profiles_path() -> PathBuf {
    PathBuf::from("profiles.json")
}

/// WebDriver automation backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DriverConfig {
    /// WebDriver endpoint (msedgedriver / chromedriver), e.g. "http://localhost:9515"
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    /// Home page every session navigates to
    #[serde(default = "default_target_url")]
    pub target_url: String,
    /// W3C browserName capability
    #[serde(default = "default_browser")]
    pub browser: String,
    #[serde(default = "default_page_load_timeout")]
    pub page_load_timeout_secs: u64,
    #[serde(default = "default_implicit_wait")]
    pub implicit_wait_secs: u64,
    /// HTTP timeout for a single WebDriver command
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Where failure screenshots are written
    #[serde(default = "default_screenshots_dir")]
    pub screenshots_dir: PathBuf,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            target_url: default_target_url(),
            browser: default_browser(),
            page_load_timeout_secs: default_page_load_timeout(),
            implicit_wait_secs: default_implicit_wait(),
            request_timeout_secs: default_request_timeout(),
            screenshots_dir: default_screenshots_dir(),
        }
    }
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}

fn default_target_url() -> String {
    "https://www.facebook.com".to_string()
}

fn default_browser() -> String {
    "MicrosoftEdge".to_string()
}

fn default_page_load_timeout() -> u64 {
    30
}

fn default_implicit_wait() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    60
}

fn default_screenshots_dir() -> PathBuf {
    PathBuf::from("warmupss")
}

/// Stock photo provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImagesConfig {
    #[serde(default)]
    pub pexels_api_key: Option<String>,
    #[serde(default)]
    pub unsplash_api_key: Option<String>,
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
    #[serde(default = "default_image_timeout")]
    pub timeout_secs: u64,
    /// Search topics, one is picked at random per fetch
    #[serde(default = "default_queries")]
    pub queries: Vec<String>,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            pexels_api_key: None,
            unsplash_api_key: None,
            download_dir: default_download_dir(),
            timeout_secs: default_image_timeout(),
            queries: default_queries(),
        }
    }
}

impl ImagesConfig {
    /// Whether at least one provider can be queried.
    pub fn has_provider(&self) -> bool {
        let set = |key: &Option<String>| key.as_deref().is_some_and(|k| !k.is_empty());
        set(&self.pexels_api_key) || set(&self.unsplash_api_key)
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("temp_images")
}

fn default_image_timeout() -> u64 {
    15
}

fn default_queries() -> Vec<String> {
    [
        "nature", "landscape", "sunset", "ocean", "mountains", "forest", "city",
        "architecture", "travel", "food", "coffee", "technology", "fitness", "yoga",
        "motivation", "success", "business", "workspace", "flowers", "animals", "beach",
        "sky", "art", "abstract", "minimal",
    ]
    .iter()
    .map(|q| q.to_string())
    .collect()
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub profiles: ProfilesConfig,
    pub runner: RunnerConfig,
    pub driver: DriverConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<SanitizedImagesConfig>,
}

/// Sanitized image config (API keys hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedImagesConfig {
    pub pexels_configured: bool,
    pub unsplash_configured: bool,
    pub download_dir: PathBuf,
    pub timeout_secs: u64,
    pub queries: usize,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            profiles: config.profiles.clone(),
            runner: config.runner.clone(),
            driver: config.driver.clone(),
            images: config.images.as_ref().map(|i| SanitizedImagesConfig {
                pexels_configured: i.pexels_api_key.as_deref().is_some_and(|k| !k.is_empty()),
                unsplash_configured: i
                    .unsplash_api_key
                    .as_deref()
                    .is_some_and(|k| !k.is_empty()),
                download_dir: i.download_dir.clone(),
                timeout_secs: i.timeout_secs,
                queries: i.queries.len(),
            }),
        }
    }
}
