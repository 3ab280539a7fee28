use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::ImageFormat;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::image::Image;

/// Errors encountered while retrieving or decoding a remote image
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Cannot build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("HTTP request for {url} failed: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },
    #[error("HTTP request for {url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("Empty response body for {url}")]
    EmptyBody { url: String },
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Unsupported image format {format} for {url} (expected JPEG or PNG)")]
    UnsupportedFormat { url: String, format: String },
    #[error("Cannot decode image from {url}: {source}")]
    Decode {
        url: String,
        source: image::ImageError,
    },
    #[error("Decoded image from {url} is invalid: {reason}")]
    Invalid { url: String, reason: String },
}

/// Source of raw bytes for a URL. The HTTP client in production, stubs in tests.
pub trait ByteSource: Send + Sync {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Blocking HTTP(S) client without authentication.
pub struct HttpSource {
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("stylepipe/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }
}

impl ByteSource for HttpSource {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;
        if body.is_empty() {
            return Err(FetchError::EmptyBody {
                url: url.to_string(),
            });
        }
        Ok(body.to_vec())
    }
}

/// `file://` URLs and bare paths are read in place instead of downloaded.
fn local_path(url: &str) -> Option<PathBuf> {
    if let Some(rest) = url.strip_prefix("file://") {
        return Some(PathBuf::from(rest));
    }
    if url.contains("://") {
        return None;
    }
    Some(PathBuf::from(url))
}

fn url_extension(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let last = path.rsplit('/').next().unwrap_or(path);
    match last.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
        Some(ext) if ext == "jpg" || ext == "jpeg" => "jpg",
        Some(ext) if ext == "png" => "png",
        _ => "img",
    }
}

/// Local cache filename: full BLAKE3 digest of the URL, so distinct URLs never share a file.
pub fn cache_file_name(url: &str) -> String {
    format!("{}.{}", blake3::hash(url.as_bytes()).to_hex(), url_extension(url))
}

/// Decode JPEG/PNG bytes into a normalized RGB `Image`. Gray or alpha inputs are
/// converted to three channels.
pub fn decode_image(url: &str, bytes: &[u8]) -> Result<Image, FetchError> {
    let format = image::guess_format(bytes).map_err(|source| FetchError::Decode {
        url: url.to_string(),
        source,
    })?;
    if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png) {
        return Err(FetchError::UnsupportedFormat {
            url: url.to_string(),
            format: format!("{:?}", format),
        });
    }

    let decoded = image::load_from_memory_with_format(bytes, format).map_err(|source| {
        FetchError::Decode {
            url: url.to_string(),
            source,
        }
    })?;
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();
    Image::from_rgb8(width as usize, height as usize, rgb.as_raw()).map_err(|e| {
        FetchError::Invalid {
            url: url.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Downloads images once into a cache directory and decodes them.
pub struct ImageFetcher {
    cache_dir: PathBuf,
    source: Box<dyn ByteSource>,
}

impl ImageFetcher {
    pub fn new(cache_dir: impl Into<PathBuf>, source: Box<dyn ByteSource>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            source,
        }
    }

    /// Fetcher backed by the blocking HTTP client.
    pub fn http(cache_dir: impl Into<PathBuf>, timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self::new(cache_dir, Box::new(HttpSource::new(timeout)?)))
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn cache_path(&self, url: &str) -> PathBuf {
        self.cache_dir.join(cache_file_name(url))
    }

    pub fn fetch(&self, url: &str) -> Result<Image, FetchError> {
        if let Some(path) = local_path(url) {
            debug!("Reading local image {:?}", path);
            let bytes = read_file(&path)?;
            return decode_image(url, &bytes);
        }

        let path = self.cache_path(url);
        if path.is_file() {
            debug!("Disk cache hit for {} at {:?}", url, path);
            let bytes = read_file(&path)?;
            match decode_image(url, &bytes) {
                Ok(image) => return Ok(image),
                Err(e) => {
                    warn!("Discarding unreadable cache file {:?}: {}", path, e);
                    fs::remove_file(&path).map_err(|source| FetchError::Io {
                        path: path.clone(),
                        source,
                    })?;
                }
            }
        }

        info!("Downloading {}", url);
        let bytes = self.source.get(url)?;
        // Only payloads that decode are persisted
        let image = decode_image(url, &bytes)?;
        self.store(&path, &bytes)?;
        info!("Stored {} bytes at {:?}", bytes.len(), path);
        Ok(image)
    }

    /// Write through a sibling `.part` file so readers never see a partial payload.
    fn store(&self, path: &Path, bytes: &[u8]) -> Result<(), FetchError> {
        fs::create_dir_all(&self.cache_dir).map_err(|source| FetchError::Io {
            path: self.cache_dir.clone(),
            source,
        })?;
        let partial = path.with_extension("part");
        fs::write(&partial, bytes).map_err(|source| FetchError::Io {
            path: partial.clone(),
            source,
        })?;
        fs::rename(&partial, path).map_err(|source| FetchError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, FetchError> {
    fs::read(path).map_err(|source| FetchError::Io {
        path: path.to_path_buf(),
        source,
    })
}
