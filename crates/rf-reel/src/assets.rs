//! Asset catalog seam
//!
//! The asset cache is an external collaborator. The engine only reads from
//! it, through [`AssetCatalog`], and resolves everything it needs up front so
//! nothing is looked up per frame.

use std::collections::HashMap;

use rf_slot::{SymbolCatalog, SymbolId};
use serde::{Deserialize, Serialize};

use crate::error::{ReelError, ReelResult};

/// Opaque texture reference owned by the asset cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

/// Spritesheet: textures keyed by frame filename
#[derive(Debug, Clone, Default)]
pub struct Spritesheet {
    pub textures: HashMap<String, TextureHandle>,
}

/// Skeleton definition handed to the renderer untouched
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonData {
    /// Asset key
    pub name: String,
    /// Animations the skeleton provides
    pub animations: Vec<String>,
}

impl SkeletonData {
    pub fn has_animation(&self, animation: &str) -> bool {
        self.animations.iter().any(|a| a == animation)
    }
}

/// Read-only view of the populated asset cache
pub trait AssetCatalog {
    /// Spritesheet by name
    fn spritesheet(&self, name: &str) -> Option<&Spritesheet>;

    /// Standalone texture by name
    fn texture(&self, name: &str) -> Option<TextureHandle>;

    /// Skeleton definition by name
    fn skeleton(&self, name: &str) -> Option<&SkeletonData>;
}

/// In-memory asset catalog
///
/// Hands out sequential texture handles. Used by tests and headless runs in
/// place of a real loader.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssets {
    spritesheets: HashMap<String, Spritesheet>,
    textures: HashMap<String, TextureHandle>,
    skeletons: HashMap<String, SkeletonData>,
    next_handle: u32,
}

impl InMemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> TextureHandle {
        self.next_handle += 1;
        TextureHandle(self.next_handle)
    }

    /// Register a spritesheet with the given frame names
    pub fn with_spritesheet<I, S>(mut self, name: impl Into<String>, frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sheet = Spritesheet::default();
        for frame in frames {
            let handle = self.allocate();
            sheet.textures.insert(frame.into(), handle);
        }
        self.spritesheets.insert(name.into(), sheet);
        self
    }

    /// Register a standalone texture
    pub fn with_texture(mut self, name: impl Into<String>) -> Self {
        let handle = self.allocate();
        self.textures.insert(name.into(), handle);
        self
    }

    /// Register a skeleton with its animations
    pub fn with_skeleton<I, S>(mut self, name: impl Into<String>, animations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        self.skeletons.insert(
            name.clone(),
            SkeletonData {
                name,
                animations: animations.into_iter().map(Into::into).collect(),
            },
        );
        self
    }

    /// Spritesheet holding a frame for every catalog entry
    pub fn for_catalog(sheet: impl Into<String>, catalog: &SymbolCatalog) -> Self {
        Self::new().with_spritesheet(
            sheet,
            catalog.entries().iter().map(|e| e.display_ref.clone()),
        )
    }
}

impl AssetCatalog for InMemoryAssets {
    fn spritesheet(&self, name: &str) -> Option<&Spritesheet> {
        self.spritesheets.get(name)
    }

    fn texture(&self, name: &str) -> Option<TextureHandle> {
        self.textures.get(name).copied()
    }

    fn skeleton(&self, name: &str) -> Option<&SkeletonData> {
        self.skeletons.get(name)
    }
}

/// Texture for every catalog symbol, resolved once at construction
#[derive(Debug, Clone)]
pub struct SymbolTextures {
    by_symbol: HashMap<SymbolId, TextureHandle>,
}

impl SymbolTextures {
    /// Resolve each symbol's display reference, spritesheet first, then
    /// standalone textures
    ///
    /// Any missing asset is a configuration error.
    pub fn resolve(
        assets: &dyn AssetCatalog,
        sheet: &str,
        catalog: &SymbolCatalog,
    ) -> ReelResult<Self> {
        let spritesheet = assets.spritesheet(sheet);
        if spritesheet.is_none() && !sheet.is_empty() {
            log::error!("Spritesheet '{}' not found in asset catalog", sheet);
            return Err(ReelError::MissingSpritesheet(sheet.to_string()));
        }

        let mut by_symbol = HashMap::with_capacity(catalog.len());
        for entry in catalog.entries() {
            let handle = spritesheet
                .and_then(|s| s.textures.get(&entry.display_ref).copied())
                .or_else(|| assets.texture(&entry.display_ref));

            match handle {
                Some(handle) => {
                    by_symbol.insert(entry.id, handle);
                }
                None => {
                    log::error!(
                        "Texture '{}' for symbol {} not found",
                        entry.display_ref,
                        entry.name
                    );
                    return Err(ReelError::MissingTexture {
                        symbol: entry.name.clone(),
                        display_ref: entry.display_ref.clone(),
                    });
                }
            }
        }

        Ok(Self { by_symbol })
    }

    pub fn get(&self, id: SymbolId) -> Option<TextureHandle> {
        self.by_symbol.get(&id).copied()
    }
}
