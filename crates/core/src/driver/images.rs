//! Stock photo fetching for image posts.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ImagesConfig;

const PEXELS_SEARCH_URL: &str = "https://api.pexels.com/v1/search";
const UNSPLASH_RANDOM_URL: &str = "https://api.unsplash.com/photos/random";

/// Errors from image fetching.
#[derive(Debug, Error)]
pub enum ImageFetchError {
    /// No provider has an API key.
    #[error("No image provider configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} returned no usable photo")]
    NoResults { provider: &'static str },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Every configured provider failed.
    #[error("All image providers failed")]
    Exhausted,
}

/// A downloaded image ready to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub path: PathBuf,
    pub caption: String,
}

/// Source of images for the image-post step.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch_random_image(&self) -> Result<FetchedImage, ImageFetchError>;

    /// Remove downloaded files. Best effort.
    async fn cleanup(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Provider {
    Pexels,
    Unsplash,
}

impl Provider {
    fn name(&self) -> &'static str {
        match self {
            Provider::Pexels => "pexels",
            Provider::Unsplash => "unsplash",
        }
    }
}

/// Photo picked from a provider response, not yet downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PhotoChoice {
    url: String,
    description: String,
    photographer: String,
}

impl PhotoChoice {
    fn caption(&self) -> String {
        if self.photographer.is_empty() {
            self.description.clone()
        } else {
            format!("{}\nPhoto by {}", self.description, self.photographer)
        }
    }
}

#[derive(Debug, Deserialize)]
struct PexelsSearchResponse {
    #[serde(default)]
    photos: Vec<PexelsPhoto>,
}

#[derive(Debug, Deserialize)]
struct PexelsPhoto {
    src: PexelsSrc,
    #[serde(default)]
    alt: Option<String>,
    #[serde(default)]
    photographer: String,
}

#[derive(Debug, Deserialize)]
struct PexelsSrc {
    large: String,
}

#[derive(Debug, Deserialize)]
struct UnsplashPhoto {
    urls: UnsplashUrls,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    alt_description: Option<String>,
    user: UnsplashUser,
}

#[derive(Debug, Deserialize)]
struct UnsplashUrls {
    regular: String,
}

#[derive(Debug, Deserialize)]
struct UnsplashUser {
    #[serde(default)]
    name: String,
}

/// Fetches random landscape photos from Pexels and Unsplash.
pub struct StockImageFetcher {
    client: Client,
    pexels_api_key: Option<String>,
    unsplash_api_key: Option<String>,
    download_dir: PathBuf,
    queries: Vec<String>,
}

impl StockImageFetcher {
    pub fn new(config: &ImagesConfig) -> Result<Self, ImageFetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            pexels_api_key: non_empty(config.pexels_api_key.as_deref()),
            unsplash_api_key: non_empty(config.unsplash_api_key.as_deref()),
            download_dir: config.download_dir.clone(),
            queries: config.queries.clone(),
        })
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Configured providers in random order.
    fn shuffled_providers(&self) -> Vec<Provider> {
        let mut providers = Vec::new();
        if self.pexels_api_key.is_some() {
            providers.push(Provider::Pexels);
        }
        if self.unsplash_api_key.is_some() {
            providers.push(Provider::Unsplash);
        }
        providers.shuffle(&mut rand::thread_rng());
        providers
    }

    fn pick_query(&self) -> String {
        self.queries
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| "nature".to_string())
    }

    async fn search(&self, provider: Provider, query: &str) -> Result<PhotoChoice, ImageFetchError> {
        match provider {
            Provider::Pexels => {
                let key = self.pexels_api_key.as_deref().unwrap_or_default();
                let response: PexelsSearchResponse = self
                    .client
                    .get(PEXELS_SEARCH_URL)
                    .header("Authorization", key)
                    .query(&[
                        ("query", query),
                        ("per_page", "20"),
                        ("orientation", "landscape"),
                    ])
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;
                let index = random_index(response.photos.len());
                index
                    .and_then(|i| pexels_choice(response.photos.into_iter().nth(i)?, query))
                    .ok_or(ImageFetchError::NoResults {
                        provider: provider.name(),
                    })
            }
            Provider::Unsplash => {
                let key = self.unsplash_api_key.as_deref().unwrap_or_default();
                let photo: UnsplashPhoto = self
                    .client
                    .get(UNSPLASH_RANDOM_URL)
                    .query(&[
                        ("query", query),
                        ("orientation", "landscape"),
                        ("content_filter", "high"),
                        ("client_id", key),
                    ])
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;
                Ok(unsplash_choice(photo, query))
            }
        }
    }

    async fn download(&self, provider: Provider, url: &str) -> Result<PathBuf, ImageFetchError> {
        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        tokio::fs::create_dir_all(&self.download_dir).await?;
        let path = self.download_dir.join(format!(
            "{}_{}.jpg",
            provider.name(),
            chrono::Utc::now().timestamp_millis()
        ));
        tokio::fs::write(&path, &bytes).await?;
        debug!("Image downloaded: {}", path.display());
        Ok(path)
    }

    async fn fetch_from(&self, provider: Provider) -> Result<FetchedImage, ImageFetchError> {
        let query = self.pick_query();
        info!("Fetching {} image for: {}", provider.name(), query);

        let choice = self.search(provider, &query).await?;
        info!(
            "Found image by {}: {}",
            choice.photographer, choice.description
        );
        let path = self.download(provider, &choice.url).await?;
        Ok(FetchedImage {
            path,
            caption: choice.caption(),
        })
    }
}

#[async_trait]
impl ImageFetcher for StockImageFetcher {
    async fn fetch_random_image(&self) -> Result<FetchedImage, ImageFetchError> {
        let providers = self.shuffled_providers();
        if providers.is_empty() {
            return Err(ImageFetchError::NotConfigured);
        }

        for provider in providers {
            match self.fetch_from(provider).await {
                Ok(image) => return Ok(image),
                Err(e) => warn!("Error fetching from {}: {}", provider.name(), e),
            }
        }
        Err(ImageFetchError::Exhausted)
    }

    async fn cleanup(&self) {
        let mut entries = match tokio::fs::read_dir(&self.download_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
            Err(e) => {
                warn!("Error cleaning up images: {}", e);
                return;
            }
        };

        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let path = entry.path();
                    if path.is_file() {
                        if let Err(e) = tokio::fs::remove_file(&path).await {
                            warn!("Failed to remove {}: {}", path.display(), e);
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Error cleaning up images: {}", e);
                    break;
                }
            }
        }
        debug!("Cleaned up temporary images");
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn random_index(len: usize) -> Option<usize> {
    use rand::Rng;
    (len > 0).then(|| rand::thread_rng().gen_range(0..len))
}

fn title_case(query: &str) -> String {
    let mut chars = query.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn pexels_choice(photo: PexelsPhoto, query: &str) -> Option<PhotoChoice> {
    if photo.src.large.is_empty() {
        return None;
    }
    Some(PhotoChoice {
        url: photo.src.large,
        description: photo
            .alt
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| title_case(query)),
        photographer: photo.photographer,
    })
}

fn unsplash_choice(photo: UnsplashPhoto, query: &str) -> PhotoChoice {
    let description = photo
        .description
        .filter(|d| !d.trim().is_empty())
        .or(photo.alt_description.filter(|d| !d.trim().is_empty()))
        .unwrap_or_else(|| title_case(query));
    PhotoChoice {
        url: photo.urls.regular,
        description,
        photographer: photo.user.name,
    }
}
