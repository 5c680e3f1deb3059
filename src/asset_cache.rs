use chrono::Utc;
use image::DynamicImage;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use crate::error::RenderError;
use crate::utils::load_image;

struct CachedAsset {
    image: Arc<DynamicImage>,
    size_bytes: u64,
    hit_count: u64,
    last_access_at: i64,
}

#[derive(Default)]
struct Entries {
    assets: HashMap<PathBuf, CachedAsset>,
    total_bytes: u64,
}

/// Decoded images below a content root, kept in memory up to a byte budget.
pub struct AssetCache {
    content_root: PathBuf,
    max_size_bytes: u64,
    entries: Mutex<Entries>,
}

impl AssetCache {
    pub fn new(content_root: PathBuf, max_size_mb: u64) -> Self {
        Self {
            content_root,
            max_size_bytes: max_size_mb * 1024 * 1024,
            entries: Mutex::new(Entries::default()),
        }
    }

    pub fn content_root(&self) -> &Path {
        &self.content_root
    }

    pub fn get(&self, rel_path: &Path) -> Result<Arc<DynamicImage>, RenderError> {
        if let Some(image) = self.lookup(rel_path) {
            debug!("asset cache hit: {}", rel_path.display());
            return Ok(image);
        }

        debug!("asset cache miss: {}", rel_path.display());
        let image = Arc::new(load_image(&self.content_root.join(rel_path))?);
        self.insert(rel_path, image.clone());
        Ok(image)
    }

    pub fn len(&self) -> usize {
        self.lock().assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Entries> {
        // Entries stay consistent across a panic, so a poisoned lock is still usable.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lookup(&self, rel_path: &Path) -> Option<Arc<DynamicImage>> {
        let mut entries = self.lock();
        let cached = entries.assets.get_mut(rel_path)?;
        cached.hit_count += 1;
        cached.last_access_at = Utc::now().timestamp();
        Some(cached.image.clone())
    }

    fn insert(&self, rel_path: &Path, image: Arc<DynamicImage>) {
        let size_bytes = image.as_bytes().len() as u64;
        if size_bytes > self.max_size_bytes {
            return;
        }

        let mut entries = self.lock();
        let previous = entries.assets.insert(
            rel_path.to_path_buf(),
            CachedAsset {
                image,
                size_bytes,
                hit_count: 1,
                last_access_at: Utc::now().timestamp(),
            },
        );
        if let Some(previous) = previous {
            entries.total_bytes -= previous.size_bytes;
        }
        entries.total_bytes += size_bytes;

        self.evict_if_needed(&mut entries);
    }

    fn evict_if_needed(&self, entries: &mut Entries) {
        if entries.total_bytes <= self.max_size_bytes {
            return;
        }
        info!("asset cache limit reached, evicting...");

        // Lowest hit count first, then oldest access.
        let mut candidates: Vec<(PathBuf, u64, i64)> = entries
            .assets
            .iter()
            .map(|(path, a)| (path.clone(), a.hit_count, a.last_access_at))
            .collect();
        candidates.sort_by_key(|&(_, hits, last)| (hits, last));

        for (path, _, _) in candidates {
            if entries.total_bytes <= self.max_size_bytes {
                break;
            }
            if let Some(evicted) = entries.assets.remove(&path) {
                entries.total_bytes -= evicted.size_bytes;
                debug!("evicted: {}", path.display());
            }
        }
    }
}
