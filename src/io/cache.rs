use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::image::Image;
use crate::core::processing::{crop_center, resize};
use crate::error::{Error, Result};
use crate::io::fetch::ImageFetcher;
use crate::types::ResizeFilter;

/// Identifies a preprocessed image request. Used as the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSpec {
    pub url: String,
    /// Target `(height, width)`
    pub size: (usize, usize),
    pub preserve_aspect_ratio: bool,
}

impl ImageSpec {
    pub fn new(url: impl Into<String>, size: (usize, usize), preserve_aspect_ratio: bool) -> Self {
        Self {
            url: url.into(),
            size,
            preserve_aspect_ratio,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub len: usize,
    pub capacity: usize,
}

/// Bounded memo of fetched, center-cropped and resized images.
///
/// Owned by a session; `&mut self` access keeps it single-writer, so a miss
/// issues exactly one fetch per key.
pub struct ImageCache {
    entries: LruCache<ImageSpec, Arc<Image>>,
    fetcher: ImageFetcher,
    filter: ResizeFilter,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl ImageCache {
    pub fn new(fetcher: ImageFetcher, capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or(Error::ZeroSize { size: capacity })?;
        Ok(Self {
            entries: LruCache::new(capacity),
            fetcher,
            filter: ResizeFilter::Bilinear,
            hits: 0,
            misses: 0,
            evictions: 0,
        })
    }

    pub fn with_filter(mut self, filter: ResizeFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn fetcher(&self) -> &ImageFetcher {
        &self.fetcher
    }

    /// Return the image for `spec`, computing and storing it on a miss.
    /// Failures are not cached.
    pub fn get(&mut self, spec: &ImageSpec) -> Result<Arc<Image>> {
        if let Some(image) = self.entries.get(spec) {
            let image = Arc::clone(image);
            self.hits += 1;
            debug!("Image cache hit: {:?}", spec);
            return Ok(image);
        }

        self.misses += 1;
        debug!("Image cache miss: {:?}", spec);
        let fetched = self.fetcher.fetch(&spec.url)?;
        let cropped = crop_center(&fetched)?;
        let image = Arc::new(resize(
            &cropped,
            spec.size,
            spec.preserve_aspect_ratio,
            self.filter,
        )?);

        if let Some((evicted, _)) = self.entries.push(spec.clone(), Arc::clone(&image)) {
            self.evictions += 1;
            info!("Evicted least recently used image: {}", evicted.url);
        }
        Ok(image)
    }

    pub fn contains(&self, spec: &ImageSpec) -> bool {
        self.entries.contains(spec)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            len: self.entries.len(),
            capacity: self.entries.cap().get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::fetch::{ByteSource, FetchError};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: Arc<AtomicUsize>,
    }

    impl ByteSource for Counting {
        fn get(&self, url: &str) -> std::result::Result<Vec<u8>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if url.contains("broken") {
                return Ok(b"not an image".to_vec());
            }
            let img = image::RgbImage::from_pixel(40, 20, image::Rgb([10, 20, 30]));
            let mut buf = Vec::new();
            image::DynamicImage::ImageRgb8(img)
                .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
                .unwrap();
            Ok(buf)
        }
    }

    fn cache(capacity: usize) -> (ImageCache, Arc<AtomicUsize>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = ImageFetcher::new(
            dir.path(),
            Box::new(Counting {
                calls: Arc::clone(&calls),
            }),
        );
        (ImageCache::new(fetcher, capacity).unwrap(), calls, dir)
    }

    #[test]
    fn identical_specs_fetch_once() {
        let (mut cache, calls, _dir) = cache(4);
        let spec = ImageSpec::new("https://example.com/a.png", (16, 16), true);

        let first = cache.get(&spec).unwrap();
        let second = cache.get(&spec).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.dims(), (16, 16));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.len), (1, 1, 1));
    }

    #[test]
    fn differing_fields_are_distinct_keys() {
        let (mut cache, _calls, _dir) = cache(8);
        cache.get(&ImageSpec::new("https://example.com/a.png", (16, 16), true)).unwrap();
        cache.get(&ImageSpec::new("https://example.com/a.png", (8, 8), true)).unwrap();
        cache.get(&ImageSpec::new("https://example.com/a.png", (8, 8), false)).unwrap();
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.stats().hits, 0);
    }

    #[test]
    fn evicts_least_recently_used() {
        let (mut cache, _calls, _dir) = cache(2);
        let a = ImageSpec::new("https://example.com/a.png", (8, 8), true);
        let b = ImageSpec::new("https://example.com/b.png", (8, 8), true);
        let c = ImageSpec::new("https://example.com/c.png", (8, 8), true);

        cache.get(&a).unwrap();
        cache.get(&b).unwrap();
        cache.get(&a).unwrap();
        cache.get(&c).unwrap();

        assert!(cache.contains(&a));
        assert!(!cache.contains(&b));
        assert!(cache.contains(&c));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let (mut cache, calls, _dir) = cache(2);
        let spec = ImageSpec::new("https://example.com/broken.png", (8, 8), true);
        assert!(matches!(cache.get(&spec), Err(Error::Fetch(_))));
        assert!(cache.is_empty());
        assert!(cache.get(&spec).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!cache.fetcher().cache_path(&spec.url).exists());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = ImageFetcher::new(
            dir.path(),
            Box::new(Counting {
                calls: Arc::new(AtomicUsize::new(0)),
            }),
        );
        assert!(matches!(
            ImageCache::new(fetcher, 0),
            Err(Error::ZeroSize { size: 0 })
        ));
    }
}
