use image::imageops::{self, FilterType};
use image::DynamicImage;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::asset_cache::AssetCache;
use crate::error::RenderError;
use crate::geometry::{overlay_position, overlay_size};
use crate::models::{BarColor, Overlay, RenderRequest};
use crate::utils::encode_webp;

pub const CONTENT_TYPE: &str = "image/webp";

/// Layers strongpoint markers and capture bars over a map's base image.
pub struct Compositor {
    assets: AssetCache,
}

impl Compositor {
    pub fn new(assets: AssetCache) -> Self {
        Self { assets }
    }

    pub fn assets(&self) -> &AssetCache {
        &self.assets
    }

    pub fn render(&self, request: &RenderRequest) -> Result<Vec<u8>, RenderError> {
        let img = self.compose(request)?;
        encode_webp(&img)
    }

    pub fn compose(&self, request: &RenderRequest) -> Result<DynamicImage, RenderError> {
        let mut canvas = (*self.assets.get(&base_path(&request.map.id))?).clone();

        for overlay in self.overlays(request)? {
            imageops::overlay(&mut canvas, &*overlay.image, overlay.left, overlay.top);
        }

        let (width, height) = request.output_size();
        if (canvas.width(), canvas.height()) == (width, height) {
            return Ok(canvas);
        }
        Ok(canvas.resize_exact(width, height, FilterType::CatmullRom))
    }

    /// Layers in draw order: markers as requested, then axis bar, then allies bar.
    fn overlays(&self, request: &RenderRequest) -> Result<Vec<Overlay>, RenderError> {
        let map = &request.map;
        let mut layers = Vec::with_capacity(request.strongpoints.len() + 2);

        for name in &request.strongpoints {
            let offset = map.strongpoint(name).ok_or_else(|| RenderError::UnknownStrongpoint {
                map: map.id.clone(),
                name: name.clone(),
            })?;
            layers.push(Overlay {
                image: self.assets.get(&marker_path(&map.id, name))?,
                left: offset.x.into(),
                top: offset.y.into(),
            });
        }

        for (faction, capture) in request.captures() {
            let (width, height) = overlay_size(map.orientation, capture.caps);
            let (left, top) = overlay_position(map.orientation, capture.caps, faction);
            debug!(
                "{} bar on {}: {}x{} at ({}, {})",
                faction.name(), map.id, width, height, left, top
            );
            let source = self.assets.get(&color_path(capture.color))?;
            layers.push(Overlay {
                image: Arc::new(source.resize_exact(width, height, FilterType::Triangle)),
                left: left.into(),
                top: top.into(),
            });
        }

        Ok(layers)
    }
}

fn base_path(map_id: &str) -> PathBuf {
    PathBuf::from("hll_maps").join(format!("{}.png", map_id))
}

fn marker_path(map_id: &str, strongpoint: &str) -> PathBuf {
    PathBuf::from("strongpoints")
        .join(map_id.to_lowercase())
        .join(format!("{}.png", strongpoint))
}

fn color_path(color: BarColor) -> PathBuf {
    PathBuf::from("colors").join(format!("{}.png", color.as_str()))
}
