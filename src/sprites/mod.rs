//! # Sprites Module
//!
//! Lookup from sprite identifiers (`"dirt"`, `"player"`, ...) to opaque sprite
//! handles.
//!
//! The game model never loads images. It asks a [`SpriteStore`] for a handle
//! and stores that handle in cells, resources and movables; the front-end maps
//! handles back to whatever it draws with.

use crate::config::SPRITE_SIZE;
use crate::{FlatcraftError, FlatcraftResult};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

/// Identifiers of every sprite the game model asks for.
pub const DEFAULT_SPRITE_IDENTIFIERS: &[&str] = &[
    "cloud",
    "ice",
    "junglegrass",
    "water",
    "grass",
    "gold_block",
    "diamond_block",
    "bronze_block",
    "coal_block",
    "copper_block",
    "dirt",
    "tree",
    "leaves",
    "player",
    "mob",
];

/// Prefix of the image files recognized by [`SpriteCache::from_directory`].
const SPRITE_FILE_PREFIX: &str = "default_";

/// Opaque handle on a loaded sprite.
///
/// Two handles are equal when they were produced by the same store for the
/// same identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sprite {
    id: u32,
    identifier: String,
}

impl Sprite {
    /// Numeric handle assigned by the store.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Identifier the sprite was looked up with.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

/// Source of sprite handles.
pub trait SpriteStore {
    /// Gets the sprite for an identifier, loading it on first use.
    ///
    /// Fails with [`FlatcraftError::AssetNotFound`] for identifiers the store
    /// does not know; no default sprite is ever substituted.
    fn create_sprite(&mut self, identifier: &str) -> FlatcraftResult<Sprite>;

    /// Side of a sprite, in pixels.
    fn sprite_size(&self) -> u32 {
        SPRITE_SIZE
    }
}

/// Caching sprite store backed by a catalog of known identifiers.
///
/// # Examples
///
/// ```
/// use flatcraft::{SpriteCache, SpriteStore};
///
/// let mut sprites = SpriteCache::with_default_catalog();
/// let dirt = sprites.create_sprite("dirt").unwrap();
/// assert_eq!(sprites.create_sprite("dirt").unwrap(), dirt);
/// assert!(sprites.create_sprite("lava").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct SpriteCache {
    catalog: BTreeSet<String>,
    cache: HashMap<String, Sprite>,
    next_id: u32,
}

impl SpriteCache {
    /// Creates a store that knows exactly the given identifiers.
    pub fn new<I, S>(identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            catalog: identifiers.into_iter().map(Into::into).collect(),
            cache: HashMap::new(),
            next_id: 0,
        }
    }

    /// Creates a store that knows every identifier used by the game model.
    pub fn with_default_catalog() -> Self {
        Self::new(DEFAULT_SPRITE_IDENTIFIERS.iter().copied())
    }

    /// Builds the catalog from the `default_<name>.png` files of a directory.
    pub fn from_directory(dir: impl AsRef<Path>) -> FlatcraftResult<Self> {
        let mut identifiers = Vec::new();
        for entry in fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("png") {
                continue;
            }
            let identifier = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.strip_prefix(SPRITE_FILE_PREFIX));
            if let Some(identifier) = identifier {
                identifiers.push(identifier.to_string());
            }
        }
        debug!(
            "Found {} sprites in {}",
            identifiers.len(),
            dir.as_ref().display()
        );
        Ok(Self::new(identifiers))
    }

    /// Checks whether the identifier can be looked up.
    pub fn knows(&self, identifier: &str) -> bool {
        self.catalog.contains(identifier)
    }

    /// Number of distinct sprites handed out so far.
    pub fn loaded_count(&self) -> usize {
        self.cache.len()
    }
}

impl Default for SpriteCache {
    fn default() -> Self {
        Self::with_default_catalog()
    }
}

impl SpriteStore for SpriteCache {
    fn create_sprite(&mut self, identifier: &str) -> FlatcraftResult<Sprite> {
        if let Some(cached) = self.cache.get(identifier) {
            return Ok(cached.clone());
        }
        if !self.catalog.contains(identifier) {
            return Err(FlatcraftError::AssetNotFound(identifier.to_string()));
        }

        let sprite = Sprite {
            id: self.next_id,
            identifier: identifier.to_string(),
        };
        self.next_id += 1;
        self.cache.insert(identifier.to_string(), sprite.clone());
        Ok(sprite)
    }
}
