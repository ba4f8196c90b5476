//! Thumbnail cache for catalog overlays
//!
//! Decodes and shrinks overlay images on a background thread so opening the
//! catalog never blocks the UI.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::thread;

use anyhow::Context as _;
use crossbeam_channel::{unbounded, Receiver, Sender};
use eframe::egui::{ColorImage, Context, TextureHandle, TextureOptions};
use image::RgbaImage;

/// Longest thumbnail side in pixels
pub const THUMBNAIL_SIZE: u32 = 64;

/// Result of thumbnail generation
struct ThumbnailResult {
    path: PathBuf,
    image: Option<RgbaImage>,
}

/// Cache of catalog thumbnails with background generation
pub struct ThumbnailCache {
    cache: HashMap<PathBuf, TextureHandle>,
    /// Paths currently being generated
    pending: HashSet<PathBuf>,
    /// Paths that failed to decode (not retried)
    failed: HashSet<PathBuf>,
    /// None when the generator thread could not be started
    request_tx: Option<Sender<PathBuf>>,
    result_rx: Receiver<ThumbnailResult>,
}

impl Default for ThumbnailCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ThumbnailCache {
    pub fn new() -> Self {
        let (request_tx, request_rx) = unbounded::<PathBuf>();
        let (result_tx, result_rx) = unbounded::<ThumbnailResult>();

        let spawned = thread::Builder::new()
            .name("thumbnail-generator".into())
            .spawn(move || Self::generator_thread(request_rx, result_tx));
        let request_tx = match spawned {
            Ok(_) => Some(request_tx),
            Err(e) => {
                log::error!("Failed to spawn thumbnail generator: {}", e);
                None
            }
        };

        Self {
            cache: HashMap::new(),
            pending: HashSet::new(),
            failed: HashSet::new(),
            request_tx,
            result_rx,
        }
    }

    /// Runs until the cache is dropped
    fn generator_thread(request_rx: Receiver<PathBuf>, result_tx: Sender<ThumbnailResult>) {
        while let Ok(path) = request_rx.recv() {
            let image = match generate_thumbnail(&path) {
                Ok(image) => Some(image),
                Err(e) => {
                    log::debug!("No thumbnail for {:?}: {:#}", path, e);
                    None
                }
            };
            if result_tx.send(ThumbnailResult { path, image }).is_err() {
                break;
            }
        }
    }

    /// Move finished thumbnails into textures. Call once per frame.
    pub fn poll(&mut self, ctx: &Context) {
        while let Ok(result) = self.result_rx.try_recv() {
            self.pending.remove(&result.path);
            match result.image {
                Some(image) => {
                    let size = [image.width() as usize, image.height() as usize];
                    let color_image = ColorImage::from_rgba_unmultiplied(size, image.as_raw());
                    let name = format!("thumbnail:{}", result.path.display());
                    let texture = ctx.load_texture(name, color_image, TextureOptions::LINEAR);
                    self.cache.insert(result.path, texture);
                }
                None => {
                    self.failed.insert(result.path);
                }
            }
        }

        if !self.pending.is_empty() {
            ctx.request_repaint();
        }
    }

    /// Cached thumbnail, queueing generation on first request
    pub fn get(&mut self, path: &Path) -> Option<&TextureHandle> {
        if !self.cache.contains_key(path) {
            self.request(path);
        }
        self.cache.get(path)
    }

    fn request(&mut self, path: &Path) {
        if self.pending.contains(path) || self.failed.contains(path) {
            return;
        }
        let Some(tx) = &self.request_tx else {
            return;
        };
        if tx.send(path.to_path_buf()).is_ok() {
            self.pending.insert(path.to_path_buf());
        }
    }

    pub fn is_pending(&self, path: &Path) -> bool {
        self.pending.contains(path)
    }

    pub fn has_failed(&self, path: &Path) -> bool {
        self.failed.contains(path)
    }
}

/// Decode an image and shrink it to fit `THUMBNAIL_SIZE`, keeping its aspect
fn generate_thumbnail(path: &Path) -> anyhow::Result<RgbaImage> {
    let image = image::open(path).with_context(|| format!("decoding {:?}", path))?;
    Ok(image.thumbnail(THUMBNAIL_SIZE, THUMBNAIL_SIZE).to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::time::{Duration, Instant};

    fn temp_png(name: &str, width: u32, height: u32) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "perspective-overlay-thumb-{}-{}.png",
            std::process::id(),
            name
        ));
        RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255]))
            .save(&path)
            .unwrap();
        path
    }

    fn wait_until_settled(cache: &mut ThumbnailCache, ctx: &Context, path: &Path) {
        let deadline = Instant::now() + Duration::from_secs(30);
        while cache.is_pending(path) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
            cache.poll(ctx);
        }
    }

    #[test]
    fn test_thumbnail_keeps_aspect() {
        let path = temp_png("aspect", 200, 400);
        let thumb = generate_thumbnail(&path).unwrap();
        assert_eq!(thumb.dimensions(), (32, 64));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_fails() {
        assert!(generate_thumbnail(Path::new("/nonexistent/door.png")).is_err());
    }

    #[test]
    fn test_cache_loads_once() {
        let ctx = Context::default();
        let path = temp_png("cache", 128, 128);
        let mut cache = ThumbnailCache::new();

        assert!(cache.get(&path).is_none());
        assert!(cache.is_pending(&path));
        // A second request while pending does not queue again
        assert!(cache.get(&path).is_none());

        wait_until_settled(&mut cache, &ctx, &path);
        let texture = cache.get(&path).unwrap();
        assert_eq!(texture.size(), [64, 64]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_failed_path_not_retried() {
        let ctx = Context::default();
        let path = PathBuf::from("/nonexistent/window.png");
        let mut cache = ThumbnailCache::new();

        assert!(cache.get(&path).is_none());
        wait_until_settled(&mut cache, &ctx, &path);
        assert!(cache.has_failed(&path));

        assert!(cache.get(&path).is_none());
        assert!(!cache.is_pending(&path));
    }
}
