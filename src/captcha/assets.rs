//! Template assets: banner and marker loaded up front, creatures on demand

use crate::error::{CaptchaError, CaptchaResult};
use crate::template_matching::Template;
use image::{GrayImage, Luma};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const BANNER_TEMPLATE: &str = "templates/captcha_template.png";
pub const MARKER_TEMPLATE: &str = "templates/marker_template.png";
pub const CREATURE_DIR: &str = "creatures";

/// Load a template image as grayscale; an alpha channel becomes the validity mask
pub fn load_template(path: &Path, name: &str) -> CaptchaResult<Template> {
    if !path.is_file() {
        return Err(CaptchaError::asset_not_found(path));
    }

    let image = image::open(path).map_err(|source| CaptchaError::AssetDecode {
        path: path.to_path_buf(),
        source,
    })?;

    let mut template = Template::new(name, image.to_luma8());
    if image.color().has_alpha() {
        let rgba = image.to_rgba8();
        let mask = GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
            Luma([if rgba.get_pixel(x, y)[3] > 0 { 255 } else { 0 }])
        });
        template = template.with_mask(mask);
    }

    validate_template(&template)?;
    log::debug!(
        "🖼️ Loaded template '{}' {}x{} (masked: {})",
        name,
        template.width(),
        template.height(),
        template.mask.is_some()
    );
    Ok(template)
}

/// Reject templates the matcher cannot use
pub fn validate_template(template: &Template) -> CaptchaResult<()> {
    if template.width() == 0 || template.height() == 0 {
        return Err(CaptchaError::InvalidTemplate {
            name: template.name.clone(),
            reason: "empty image".to_string(),
        });
    }
    if !template.mask_matches_pixels() {
        return Err(CaptchaError::InvalidTemplate {
            name: template.name.clone(),
            reason: "mask size differs from image size".to_string(),
        });
    }
    if template.valid_pixel_count() == 0 {
        return Err(CaptchaError::InvalidTemplate {
            name: template.name.clone(),
            reason: "mask hides every pixel".to_string(),
        });
    }
    Ok(())
}

/// File stem used for a catalog name
pub fn creature_file_stem(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Owner of every template the session matches against
#[derive(Debug)]
pub struct TemplateAssets {
    banner: Template,
    marker: Template,
    creature_dir: PathBuf,
    creatures: HashMap<String, Template>,
}

impl TemplateAssets {
    /// Load from an asset root laid out as `templates/` + `creatures/`.
    /// A missing banner or marker template is a configuration error.
    pub fn load(root: impl AsRef<Path>) -> CaptchaResult<Self> {
        let root = root.as_ref();
        let banner = load_template(&root.join(BANNER_TEMPLATE), "captcha_template")?;
        let marker = load_template(&root.join(MARKER_TEMPLATE), "marker_template")?;
        log::info!("🗂️ Template assets loaded from {:?}", root);
        Ok(Self::from_parts(banner, marker, root.join(CREATURE_DIR)))
    }

    pub fn from_parts(banner: Template, marker: Template, creature_dir: impl Into<PathBuf>) -> Self {
        Self {
            banner,
            marker,
            creature_dir: creature_dir.into(),
            creatures: HashMap::new(),
        }
    }

    pub fn banner(&self) -> &Template {
        &self.banner
    }

    pub fn marker(&self) -> &Template {
        &self.marker
    }

    pub fn creature_path(&self, name: &str) -> PathBuf {
        self.creature_dir
            .join(format!("{}.png", creature_file_stem(name)))
    }

    /// Template for a catalog name, loaded on first use and cached
    pub fn creature(&mut self, name: &str) -> CaptchaResult<&Template> {
        let key = creature_file_stem(name);
        if !self.creatures.contains_key(&key) {
            let template = load_template(&self.creature_path(name), &key)?;
            self.creatures.insert(key.clone(), template);
        }
        self.creatures
            .get(&key)
            .ok_or_else(|| CaptchaError::asset_not_found(self.creature_path(name)))
    }

    /// Number of creature templates loaded so far
    pub fn cached_creatures(&self) -> usize {
        self.creatures.len()
    }
}
