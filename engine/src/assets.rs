use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glam::Vec2;
use image::RgbaImage;
use log::debug;

use crate::error::{EngineError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SoundId(u32);

impl SoundId {
    #[cfg(test)]
    pub(crate) fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
}

#[derive(Clone, Debug)]
pub struct Texture {
    pub name: String,
    pub size: Vec2,
    /// Decoded image. Registered textures have none and draw as a flat fill.
    pub pixels: Option<RgbaImage>,
}

#[derive(Clone, Debug)]
pub struct Sound {
    pub file: String,
    pub path: PathBuf,
}

/// Name-keyed texture and sound lookup.
///
/// Every name is resolved once; later lookups of the same name return the
/// same id. With a root directory, textures are `<root>/<name>.png` and
/// sounds are `<root>/<file>`. Without one, only registered names resolve.
#[derive(Debug, Default)]
pub struct AssetStore {
    root: Option<PathBuf>,
    textures: Vec<Texture>,
    texture_names: HashMap<String, TextureId>,
    sounds: Vec<Sound>,
    sound_names: HashMap<String, SoundId>,
}

impl AssetStore {
    pub fn from_dir(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            ..Self::default()
        }
    }

    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn register_texture(&mut self, name: &str, size: Vec2) -> TextureId {
        if let Some(id) = self.texture_names.get(name) {
            self.textures[id.0 as usize].size = size;
            return *id;
        }
        let id = TextureId(self.textures.len() as u32);
        self.textures.push(Texture {
            name: name.to_owned(),
            size,
            pixels: None,
        });
        self.texture_names.insert(name.to_owned(), id);
        id
    }

    pub fn register_sound(&mut self, file: &str) -> SoundId {
        if let Some(id) = self.sound_names.get(file) {
            return *id;
        }
        let path = self
            .root
            .as_deref()
            .map_or_else(|| PathBuf::from(file), |root| root.join(file));
        let id = SoundId(self.sounds.len() as u32);
        self.sounds.push(Sound {
            file: file.to_owned(),
            path,
        });
        self.sound_names.insert(file.to_owned(), id);
        id
    }

    pub fn texture(&mut self, name: &str) -> Result<TextureId> {
        if let Some(id) = self.texture_names.get(name) {
            return Ok(*id);
        }
        let root = self
            .root
            .as_deref()
            .ok_or_else(|| EngineError::MissingAsset(name.to_owned()))?;
        let path = root.join(format!("{name}.png"));
        let pixels = read_image(&path, name)?;
        let (w, h) = pixels.dimensions();
        debug!("loaded texture {name} ({w}x{h})");
        let id = self.register_texture(name, Vec2::new(w as f32, h as f32));
        self.textures[id.0 as usize].pixels = Some(pixels);
        Ok(id)
    }

    pub fn sound(&mut self, file: &str) -> Result<SoundId> {
        if let Some(id) = self.sound_names.get(file) {
            return Ok(*id);
        }
        match self.root.as_deref() {
            Some(root) if root.join(file).is_file() => Ok(self.register_sound(file)),
            _ => Err(EngineError::MissingAsset(file.to_owned())),
        }
    }

    pub fn texture_info(&self, id: TextureId) -> &Texture {
        &self.textures[id.0 as usize]
    }

    pub fn texture_size(&self, id: TextureId) -> Vec2 {
        self.texture_info(id).size
    }

    pub fn sound_info(&self, id: SoundId) -> &Sound {
        &self.sounds[id.0 as usize]
    }
}

fn read_image(path: &Path, name: &str) -> Result<RgbaImage> {
    if !path.is_file() {
        return Err(EngineError::MissingAsset(name.to_owned()));
    }
    let image = image::open(path).map_err(|source| EngineError::Image {
        path: path.to_owned(),
        source,
    })?;
    Ok(image.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_are_memoized() {
        let mut assets = AssetStore::in_memory();
        let a = assets.register_texture("card_back", Vec2::new(100.0, 140.0));
        let b = assets.texture("card_back").unwrap();
        assert_eq!(a, b);
        assert_eq!(assets.texture_size(b), Vec2::new(100.0, 140.0));
    }

    #[test]
    fn unknown_names_are_missing_assets() {
        let mut assets = AssetStore::in_memory();
        assert!(matches!(
            assets.texture("nope"),
            Err(EngineError::MissingAsset(name)) if name == "nope"
        ));
        assert!(matches!(assets.sound("nope.wav"), Err(EngineError::MissingAsset(_))));
    }

    #[test]
    fn textures_under_root_keep_their_pixels() {
        let dir = std::env::temp_dir().join(format!("engine-assets-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        RgbaImage::from_pixel(3, 2, image::Rgba([200, 10, 10, 255]))
            .save(dir.join("card_back.png"))
            .unwrap();

        let mut assets = AssetStore::from_dir(&dir);
        let id = assets.texture("card_back").unwrap();
        let texture = assets.texture_info(id);
        assert_eq!(texture.size, Vec2::new(3.0, 2.0));
        let pixels = texture.pixels.as_ref().unwrap();
        assert_eq!(pixels.get_pixel(2, 1).0, [200, 10, 10, 255]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_under_root_is_reported() {
        let mut assets = AssetStore::from_dir(std::env::temp_dir().join("engine-no-such-dir"));
        assert!(matches!(assets.texture("card_back"), Err(EngineError::MissingAsset(_))));
    }
}
