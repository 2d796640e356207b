//! Image fetching behind the [`ImageLoader`] seam
//!
//! `HttpImageLoader` downloads with streaming, size limits and a timeout.
//! Tests and embedders can substitute any other loader.

use base64::Engine;
use futures::StreamExt;
use futures::future::BoxFuture;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;

use crate::config::ImageConfig;

pub type ImageFuture<'a> = BoxFuture<'a, Result<LoadedImage, ImageError>>;

/// Anything that can fetch an image by source identifier
pub trait ImageLoader: Send + Sync {
    fn load<'a>(&'a self, src: &'a str) -> ImageFuture<'a>;
}

/// Why an image failed to load
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageError {
    #[error("Image download failed with status: {status}")]
    Status { status: u16 },

    #[error("Image download failed: {0}")]
    Transport(String),

    #[error("Not an image (content-type: {content_type})")]
    NotAnImage { content_type: String },

    #[error("Image too large: {size} bytes exceeds limit of {limit} bytes")]
    TooLarge { size: u64, limit: usize },
}

/// A decoded-enough image: raw bytes plus their content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub src: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl LoadedImage {
    /// `data:` URL suitable for inline display
    #[must_use]
    pub fn data_url(&self) -> String {
        let encoded_capacity = base64::encoded_len(self.bytes.len(), true).unwrap_or(0);
        let mut encoded = String::with_capacity(encoded_capacity + 14 + self.content_type.len());
        encoded.push_str("data:");
        encoded.push_str(&self.content_type);
        encoded.push_str(";base64,");
        base64::engine::general_purpose::STANDARD.encode_string(&self.bytes, &mut encoded);
        encoded
    }
}

/// Loads images over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpImageLoader {
    http: Client,
    config: ImageConfig,
}

impl HttpImageLoader {
    #[must_use]
    pub fn new(config: ImageConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    #[must_use]
    pub fn with_client(http: Client, config: ImageConfig) -> Self {
        Self { http, config }
    }

    async fn fetch(&self, src: &str) -> Result<LoadedImage, ImageError> {
        let transport = |e: reqwest::Error| ImageError::Transport(e.to_string());

        let response = self
            .http
            .get(src)
            .timeout(self.config.timeout)
            .header("Accept", "image/avif,image/webp,image/apng,image/*,*/*;q=0.8")
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(ImageError::Status {
                status: response.status().as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();
        if !content_type.starts_with("image/") {
            return Err(ImageError::NotAnImage { content_type });
        }

        // Enforce the limit before downloading when the server announces a size
        let expected_size = response.content_length().unwrap_or(0);
        if expected_size > self.config.max_size as u64 {
            return Err(ImageError::TooLarge {
                size: expected_size,
                limit: self.config.max_size,
            });
        }

        let mut buffer = Vec::with_capacity(expected_size as usize);
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(transport)?;
            let new_total = buffer.len() + chunk.len();
            if new_total > self.config.max_size {
                return Err(ImageError::TooLarge {
                    size: new_total as u64,
                    limit: self.config.max_size,
                });
            }
            buffer.extend_from_slice(&chunk);
        }

        log::debug!("loaded image {src} ({} bytes, {content_type})", buffer.len());
        Ok(LoadedImage {
            src: src.to_string(),
            content_type,
            bytes: buffer,
        })
    }
}

impl Default for HttpImageLoader {
    fn default() -> Self {
        Self::new(ImageConfig::default())
    }
}

impl ImageLoader for HttpImageLoader {
    fn load<'a>(&'a self, src: &'a str) -> ImageFuture<'a> {
        Box::pin(self.fetch(src))
    }
}
