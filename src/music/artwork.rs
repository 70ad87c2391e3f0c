// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cover-art download.

use std::fmt;
use std::future::Future;

use crate::error::Result;

use super::ArtworkRef;

/// Encoding of downloaded artwork bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageFormat {
    /// JPEG file.
    Jpeg,
    /// PNG file.
    Png,
    /// Already decoded, tightly packed 8-bit RGBA pixels, row-major.
    Rgba8 {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
    /// Anything else, tagged with its media type.
    Other(String),
}

impl ImageFormat {
    /// Derives the format from an HTTP `Content-Type` value.
    ///
    /// Parameters such as `charset` are ignored and matching is
    /// case-insensitive.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Self {
        let media_type = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match media_type.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Self::Jpeg,
            "image/png" => Self::Png,
            _ => Self::Other(media_type),
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jpeg => f.write_str("image/jpeg"),
            Self::Png => f.write_str("image/png"),
            Self::Rgba8 { width, height } => write!(f, "rgba8 {width}x{height}"),
            Self::Other(media_type) => f.write_str(media_type),
        }
    }
}

/// A downloaded cover image.
#[derive(Clone, PartialEq, Eq)]
pub struct Artwork {
    /// Raw bytes as received or decoded.
    pub bytes: Vec<u8>,
    /// Encoding of [`bytes`](Self::bytes).
    pub format: ImageFormat,
}

impl Artwork {
    /// Wraps decoded RGBA pixels.
    #[must_use]
    pub fn rgba(width: u32, height: u32, bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            format: ImageFormat::Rgba8 { width, height },
        }
    }
}

impl fmt::Debug for Artwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artwork")
            .field("format", &self.format)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Downloads cover art.
pub trait ArtworkFetcher: Send + Sync {
    /// Fetches the image behind `artwork`.
    fn fetch(&self, artwork: &ArtworkRef) -> impl Future<Output = Result<Artwork>> + Send;
}

#[cfg(feature = "http")]
pub use self::http::HttpArtworkFetcher;

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use reqwest::Client;
    use reqwest::header::CONTENT_TYPE;

    use super::{Artwork, ArtworkFetcher, ImageFormat};
    use crate::error::{ProtocolError, Result};
    use crate::music::ArtworkRef;

    /// [`ArtworkFetcher`] over plain HTTP(S) GET requests.
    ///
    /// The format is taken from the response's `Content-Type`; a missing
    /// header yields [`ImageFormat::Other`].
    #[derive(Debug, Clone)]
    pub struct HttpArtworkFetcher {
        client: Client,
    }

    impl HttpArtworkFetcher {
        /// Request timeout used by [`new`](Self::new).
        pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

        /// Creates a fetcher with the default timeout.
        ///
        /// # Errors
        ///
        /// Returns `ProtocolError::Http` if the HTTP client cannot be built.
        pub fn new() -> std::result::Result<Self, ProtocolError> {
            Self::with_timeout(Self::DEFAULT_TIMEOUT)
        }

        /// Creates a fetcher with a custom request timeout.
        ///
        /// # Errors
        ///
        /// Returns `ProtocolError::Http` if the HTTP client cannot be built.
        pub fn with_timeout(timeout: Duration) -> std::result::Result<Self, ProtocolError> {
            let client = Client::builder()
                .timeout(timeout)
                .build()
                .map_err(ProtocolError::Http)?;
            Ok(Self { client })
        }
    }

    impl ArtworkFetcher for HttpArtworkFetcher {
        async fn fetch(&self, artwork: &ArtworkRef) -> Result<Artwork> {
            tracing::debug!(url = %artwork.url, "Downloading artwork");

            let response = self
                .client
                .get(&artwork.url)
                .send()
                .await
                .map_err(ProtocolError::Http)?;

            if !response.status().is_success() {
                return Err(ProtocolError::Status(response.status().as_u16()).into());
            }

            let format = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map_or_else(
                    || ImageFormat::Other("application/octet-stream".to_string()),
                    ImageFormat::from_content_type,
                );

            let bytes = response.bytes().await.map_err(ProtocolError::Http)?;

            tracing::debug!(%format, len = bytes.len(), "Artwork downloaded");
            Ok(Artwork {
                bytes: bytes.to_vec(),
                format,
            })
        }
    }
}
