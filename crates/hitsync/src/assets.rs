//! External asset lookup.
//!
//! Audio and sprites are resolved by name through traits the host
//! implements. Sprite and animation tags are resolved once, when the session
//! is built, into a per-note [`VisualTable`]; nothing is looked up by string
//! while notes are in flight.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::chart::Chart;
use crate::error::AssetError;

/// Audio formats tried by [`DirectoryAudioResolver`], in order.
pub const AUDIO_EXTENSIONS: [&str; 4] = ["ogg", "wav", "mp3", "flac"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioHandle {
    pub song_name: String,
    pub path: Option<PathBuf>,
}

/// Opaque reference to a resolved sprite or animation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetHandle {
    pub id: u32,
    pub name: Arc<str>,
}

impl AssetHandle {
    pub fn new(id: u32, name: &str) -> Self {
        Self {
            id,
            name: Arc::from(name),
        }
    }

    /// Visual used when a note has no tag or its tag cannot be resolved.
    pub fn fallback() -> Self {
        Self::new(0, "default")
    }
}

/// Visual resources owned by a traveling note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteVisual {
    pub sprite: AssetHandle,
    pub animation: Option<AssetHandle>,
}

pub trait AudioResolver {
    fn resolve_clip(&self, song_name: &str) -> Result<AudioHandle, AssetError>;
}

pub trait SpriteResolver {
    fn resolve_sprite(&self, tag: &str) -> Result<AssetHandle, AssetError>;

    fn resolve_animation(&self, tag: &str) -> Result<AssetHandle, AssetError> {
        self.resolve_sprite(tag)
    }
}

/// Looks for `<dir>/<song>.<ext>` for each of [`AUDIO_EXTENSIONS`].
#[derive(Debug, Clone)]
pub struct DirectoryAudioResolver {
    dir: PathBuf,
}

impl DirectoryAudioResolver {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }
}

impl AudioResolver for DirectoryAudioResolver {
    fn resolve_clip(&self, song_name: &str) -> Result<AudioHandle, AssetError> {
        AUDIO_EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{song_name}.{ext}")))
            .find(|path| path.is_file())
            .map(|path| AudioHandle {
                song_name: song_name.to_string(),
                path: Some(path),
            })
            .ok_or_else(|| AssetError::AudioNotFound(song_name.to_string()))
    }
}

/// Named sprites known up front, e.g. the file stems of a sprite directory.
#[derive(Debug, Clone, Default)]
pub struct SpriteCatalog {
    sprites: HashMap<String, AssetHandle>,
}

impl SpriteCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str) -> AssetHandle {
        let id = self.sprites.len() as u32 + 1;
        self.sprites
            .entry(name.to_string())
            .or_insert_with(|| AssetHandle::new(id, name))
            .clone()
    }

    /// Register every file in `dir` under its file stem
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> std::io::Result<Self> {
        let mut catalog = Self::new();
        let mut names: Vec<String> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter_map(|path| Some(path.file_stem()?.to_str()?.to_string()))
            .collect();
        names.sort();
        for name in &names {
            catalog.register(name);
        }
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

impl SpriteResolver for SpriteCatalog {
    fn resolve_sprite(&self, tag: &str) -> Result<AssetHandle, AssetError> {
        self.sprites
            .get(tag)
            .cloned()
            .ok_or_else(|| AssetError::SpriteNotFound(tag.to_string()))
    }
}

/// Visual for every chart note, indexed like the chart.
#[derive(Debug, Clone, Default)]
pub struct VisualTable {
    visuals: Vec<NoteVisual>,
}

impl VisualTable {
    /// Resolve every tag in the chart. Unknown tags degrade to the fallback visual.
    pub fn resolve(chart: &Chart, resolver: &dyn SpriteResolver) -> Self {
        let mut cache: HashMap<String, AssetHandle> = HashMap::new();
        let mut missing = 0usize;

        let mut lookup = |tag: &str, animation: bool| -> Option<AssetHandle> {
            let tag = tag.trim();
            if tag.is_empty() {
                return None;
            }
            if let Some(handle) = cache.get(tag) {
                return Some(handle.clone());
            }
            let resolved = if animation {
                resolver.resolve_animation(tag)
            } else {
                resolver.resolve_sprite(tag)
            };
            match resolved {
                Ok(handle) => {
                    cache.insert(tag.to_string(), handle.clone());
                    Some(handle)
                }
                Err(e) => {
                    if missing == 0 {
                        warn!("{}, using default visual (further misses counted)", e);
                    }
                    missing += 1;
                    None
                }
            }
        };

        let visuals = chart
            .notes()
            .iter()
            .map(|note| NoteVisual {
                sprite: note
                    .visual_tag
                    .as_deref()
                    .and_then(|tag| lookup(tag, false))
                    .unwrap_or_else(AssetHandle::fallback),
                animation: note
                    .animation_tag
                    .as_deref()
                    .and_then(|tag| lookup(tag, true)),
            })
            .collect();

        if missing > 1 {
            warn!("{} visual lookups fell back to the default", missing);
        }
        debug!("Resolved visuals for {} notes", chart.len());

        Self { visuals }
    }

    pub fn get(&self, index: usize) -> Option<&NoteVisual> {
        self.visuals.get(index)
    }

    pub fn len(&self) -> usize {
        self.visuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visuals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartNote;

    #[test]
    fn test_directory_audio_resolver() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("sakura.wav"), b"RIFF").unwrap();

        let resolver = DirectoryAudioResolver::new(dir.path());
        let handle = resolver.resolve_clip("sakura").unwrap();
        assert_eq!(handle.song_name, "sakura");
        assert_eq!(handle.path, Some(dir.path().join("sakura.wav")));

        assert!(matches!(
            resolver.resolve_clip("yuki"),
            Err(AssetError::AudioNotFound(name)) if name == "yuki"
        ));
    }

    #[test]
    fn test_catalog_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("petal.png"), b"").unwrap();
        fs::write(dir.path().join("star.png"), b"").unwrap();

        let catalog = SpriteCatalog::from_dir(dir.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(&*catalog.resolve_sprite("star").unwrap().name, "star");
        assert!(catalog.resolve_sprite("moon").is_err());
    }

    #[test]
    fn test_visual_table_falls_back() {
        let mut catalog = SpriteCatalog::new();
        let petal = catalog.register("petal");

        let mut with_anim = ChartNote::new(0, 0.0, 1.0).with_visual_tag("petal");
        with_anim.animation_tag = Some("petal".to_string());
        let chart = Chart::new(
            "s",
            vec![
                with_anim,
                ChartNote::new(1, 0.0, 1.0).with_visual_tag("missing"),
                ChartNote::new(1, 0.0, 2.0),
            ],
        );

        let table = VisualTable::resolve(&chart, &catalog);
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(0).unwrap().sprite, petal);
        assert_eq!(table.get(0).unwrap().animation, Some(petal));
        assert_eq!(table.get(1).unwrap().sprite, AssetHandle::fallback());
        assert_eq!(table.get(2).unwrap().sprite, AssetHandle::fallback());
        assert_eq!(table.get(2).unwrap().animation, None);
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut catalog = SpriteCatalog::new();
        let a = catalog.register("a");
        let again = catalog.register("a");
        assert_eq!(a, again);
        assert_eq!(catalog.len(), 1);
    }
}
