use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;

use crate::error::{EngineError, Result};
use crate::text::Font;

/// Shared, immutable bitmap.  Cloning is cheap.
pub type ImageHandle = Arc<RgbaImage>;

/// Resolves asset paths under `<run_dir>/<asset_subdir>` and caches decoded
/// images by file name.
pub struct Assets {
    asset_dir: PathBuf,
    image_subdir: String,
    sound_subdir: String,
    font_subdir: String,
    images: HashMap<String, ImageHandle>,
}

impl Assets {
    pub fn new(asset_dir: PathBuf, image_subdir: &str, sound_subdir: &str, font_subdir: &str) -> Self {
        Self {
            asset_dir,
            image_subdir: image_subdir.to_string(),
            sound_subdir: sound_subdir.to_string(),
            font_subdir: font_subdir.to_string(),
            images: HashMap::new(),
        }
    }

    pub fn asset_dir(&self) -> &Path {
        &self.asset_dir
    }

    /// Join `parts` onto the asset directory.
    pub fn get_asset<I, P>(&self, parts: I) -> PathBuf
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut path = self.asset_dir.clone();
        for part in parts {
            path.push(part);
        }
        path
    }

    pub fn image_path(&self, filename: &str) -> PathBuf {
        self.get_asset([self.image_subdir.as_str(), filename])
    }

    pub fn sound_path(&self, filename: &str) -> PathBuf {
        self.get_asset([self.sound_subdir.as_str(), filename])
    }

    pub fn font_path(&self, filename: &str) -> PathBuf {
        self.get_asset([self.font_subdir.as_str(), filename])
    }

    /// Load an image from the images directory.  Repeated loads of the same
    /// file name return the cached handle.
    pub fn load_image(&mut self, filename: &str) -> Result<ImageHandle> {
        if let Some(handle) = self.images.get(filename) {
            return Ok(Arc::clone(handle));
        }
        let path = self.image_path(filename);
        let img = image::open(&path)
            .map_err(|source| EngineError::Image { path: path.clone(), source })?
            .to_rgba8();
        log::debug!("assets: loaded image '{}' ({}x{})", path.display(), img.width(), img.height());
        let handle = Arc::new(img);
        self.images.insert(filename.to_string(), Arc::clone(&handle));
        Ok(handle)
    }

    /// Register an in-memory image under `filename` so later `load_image`
    /// calls return it without touching the disk.
    pub fn insert_image(&mut self, filename: &str, image: RgbaImage) -> ImageHandle {
        let handle = Arc::new(image);
        self.images.insert(filename.to_string(), Arc::clone(&handle));
        handle
    }

    /// Load every `.png` under the images directory (recursively).  Files are
    /// keyed by their path relative to the images directory.  Unreadable
    /// files are logged and skipped.  Returns the number of images cached.
    pub fn preload_images(&mut self) -> usize {
        let root = self.get_asset([self.image_subdir.as_str()]);
        let mut loaded = 0;
        for entry in walkdir::WalkDir::new(&root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let file_path = entry.path();
            if file_path.extension().and_then(|s| s.to_str()) != Some("png") {
                continue;
            }
            let Some(key) = file_path
                .strip_prefix(&root)
                .ok()
                .and_then(|p| p.to_str())
                .map(|s| s.replace('\\', "/"))
            else {
                continue;
            };
            match self.load_image(&key) {
                Ok(_) => loaded += 1,
                Err(e) => log::warn!("assets: skipping '{}': {e}", file_path.display()),
            }
        }
        loaded
    }

    /// Load a bitmap font: `<name>.png` atlas plus `<name>.json` glyph map in
    /// the fonts directory, scaled so one line is `size` pixels tall.
    pub fn load_font(&self, name: &str, size: u32) -> Result<Font> {
        let atlas_path = self.font_path(&format!("{name}.png"));
        let json_path = self.font_path(&format!("{name}.json"));
        let atlas = image::open(&atlas_path)
            .map_err(|source| EngineError::Image { path: atlas_path.clone(), source })?
            .to_rgba8();
        let json = std::fs::read_to_string(&json_path)
            .map_err(|source| EngineError::Io { path: json_path.clone(), source })?;
        let font = Font::from_atlas_json(atlas, &json)?.with_size(size);
        log::debug!("assets: loaded font '{name}' ({} glyphs)", font.glyph_count());
        Ok(font)
    }
}
