//! Bonus Presenter — character animation over a column-win reel
//!
//! On a column win the reel is hidden, the skeletal renderer plays the
//! character over the reel's rectangle, and the stage mask is narrowed to
//! that rectangle. [`BonusPresenter::reset`] undoes all of it before the next
//! spin, whether or not the animation ever finished.
//!
//! Failures here never touch the spin that triggered them: they are logged
//! and the reel simply stays visible.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::assets::{AssetCatalog, SkeletonData};
use crate::error::{ReelError, ReelResult, RenderError};
use crate::layout::{Rect, ReelLayout};

/// Opaque handle to a live animation owned by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimationHandle(pub u64);

/// Placement and playback parameters for one animation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationParams {
    /// Anchor x (center of the reel)
    pub x: f64,
    /// Anchor y (center of the reel)
    pub y: f64,
    pub scale: f64,
    pub animation: String,
    pub looped: bool,
}

/// External skeletal-animation playback
pub trait SkeletonRenderer {
    /// Instantiate a character animation
    fn create(
        &mut self,
        character_id: &str,
        skeleton: &SkeletonData,
        params: &AnimationParams,
    ) -> Result<AnimationHandle, RenderError>;

    /// Tear down an animation; unknown handles are ignored
    fn destroy(&mut self, handle: AnimationHandle);
}

/// Reel visibility control the presenter needs from the bank
pub trait ReelVisibility {
    fn reel_count(&self) -> usize;

    fn set_reel_visible(&mut self, index: usize, visible: bool) -> ReelResult<()>;
}

/// Character → skeleton asset binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSpec {
    pub character_id: String,
    /// Skeleton asset key
    pub skeleton: String,
    /// Overrides [`BonusConfig::default_animation`]
    #[serde(default)]
    pub animation: Option<String>,
    /// Overrides [`BonusConfig::scale`]
    #[serde(default)]
    pub scale: Option<f64>,
}

impl CharacterSpec {
    pub fn new(character_id: impl Into<String>, skeleton: impl Into<String>) -> Self {
        Self {
            character_id: character_id.into(),
            skeleton: skeleton.into(),
            animation: None,
            scale: None,
        }
    }
}

/// Bonus presentation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusConfig {
    pub characters: Vec<CharacterSpec>,
    pub default_animation: String,
    pub looped: bool,
    pub scale: f64,
}

impl BonusConfig {
    pub fn character(&self, character_id: &str) -> Option<&CharacterSpec> {
        self.characters
            .iter()
            .find(|c| c.character_id == character_id)
    }

    pub fn validate(&self) -> ReelResult<()> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(ReelError::InvalidConfig(format!(
                "bonus scale must be positive, got {}",
                self.scale
            )));
        }
        for (i, c) in self.characters.iter().enumerate() {
            if self.characters[..i]
                .iter()
                .any(|o| o.character_id == c.character_id)
            {
                return Err(ReelError::InvalidConfig(format!(
                    "duplicate bonus character '{}'",
                    c.character_id
                )));
            }
        }
        Ok(())
    }

    /// Every configured skeleton must exist in the asset catalog
    pub fn check_assets(&self, assets: &dyn AssetCatalog) -> ReelResult<()> {
        for c in &self.characters {
            if assets.skeleton(&c.skeleton).is_none() {
                log::error!(
                    "Skeleton '{}' for character '{}' not found",
                    c.skeleton,
                    c.character_id
                );
                return Err(ReelError::MissingSkeleton(c.skeleton.clone()));
            }
        }
        Ok(())
    }
}

impl Default for BonusConfig {
    fn default() -> Self {
        Self {
            characters: vec![
                CharacterSpec::new("man", "man"),
                CharacterSpec::new("woman", "woman"),
            ],
            default_animation: "win".into(),
            looped: true,
            scale: 1.0,
        }
    }
}

/// A running bonus animation
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveBonus {
    pub reel_index: usize,
    pub character_id: String,
    pub handle: AnimationHandle,
    /// Area the animation covers
    pub rect: Rect,
}

/// Plays character animations over column-win reels
pub struct BonusPresenter {
    assets: Arc<dyn AssetCatalog>,
    renderer: Box<dyn SkeletonRenderer>,
    config: BonusConfig,
    layout: ReelLayout,
    rows: usize,
    active: Vec<ActiveBonus>,
    /// Stage areas left unmasked; empty means no mask
    mask: Vec<Rect>,
}

impl BonusPresenter {
    /// Skeletons are checked up front; a missing one fails construction
    pub fn new(
        assets: Arc<dyn AssetCatalog>,
        renderer: Box<dyn SkeletonRenderer>,
        config: BonusConfig,
        layout: ReelLayout,
        rows: usize,
    ) -> ReelResult<Self> {
        config.validate()?;
        config.check_assets(assets.as_ref())?;
        Ok(Self {
            assets,
            renderer,
            config,
            layout,
            rows,
            active: Vec::new(),
            mask: Vec::new(),
        })
    }

    pub fn active(&self) -> &[ActiveBonus] {
        &self.active
    }

    pub fn is_active(&self) -> bool {
        !self.active.is_empty()
    }

    pub fn mask(&self) -> &[Rect] {
        &self.mask
    }

    pub fn config(&self) -> &BonusConfig {
        &self.config
    }

    /// React to a column win on `reel_index`
    ///
    /// Returns the new animation, or `None` if it could not be created.
    pub fn handle_column_win(
        &mut self,
        reels: &mut dyn ReelVisibility,
        reel_index: usize,
        character_id: &str,
    ) -> Option<AnimationHandle> {
        match self.present(reels, reel_index, character_id) {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!(
                    "BonusPresenter: {} on reel {} not shown: {}",
                    character_id,
                    reel_index,
                    e
                );
                None
            }
        }
    }

    fn present(
        &mut self,
        reels: &mut dyn ReelVisibility,
        reel_index: usize,
        character_id: &str,
    ) -> ReelResult<AnimationHandle> {
        if reel_index >= reels.reel_count() {
            return Err(ReelError::ReelOutOfRange(reel_index));
        }
        let spec = self
            .config
            .character(character_id)
            .ok_or_else(|| ReelError::UnknownCharacter(character_id.to_string()))?;
        let skeleton = self
            .assets
            .skeleton(&spec.skeleton)
            .ok_or_else(|| ReelError::MissingSkeleton(spec.skeleton.clone()))?;

        let animation = spec
            .animation
            .clone()
            .unwrap_or_else(|| self.config.default_animation.clone());
        if !skeleton.has_animation(&animation) {
            return Err(RenderError::UnknownAnimation {
                character: character_id.to_string(),
                animation,
            }
            .into());
        }

        let rect = self.layout.reel_rect(reel_index, self.rows);
        let (x, y) = rect.center();
        let params = AnimationParams {
            x,
            y,
            scale: spec.scale.unwrap_or(self.config.scale),
            animation,
            looped: self.config.looped,
        };

        let handle = self.renderer.create(character_id, skeleton, &params)?;
        if let Err(e) = reels.set_reel_visible(reel_index, false) {
            self.renderer.destroy(handle);
            return Err(e);
        }

        self.mask.push(rect);
        self.active.push(ActiveBonus {
            reel_index,
            character_id: character_id.to_string(),
            handle,
            rect,
        });
        log::info!(
            "BonusPresenter: {} playing '{}' on reel {}",
            character_id,
            params.animation,
            reel_index
        );
        Ok(handle)
    }

    /// Destroy every animation, drop the mask and show every reel again
    pub fn reset(&mut self, reels: &mut dyn ReelVisibility) {
        for bonus in self.active.drain(..) {
            self.renderer.destroy(bonus.handle);
        }
        self.mask.clear();
        for index in 0..reels.reel_count() {
            if let Err(e) = reels.set_reel_visible(index, true) {
                log::error!("BonusPresenter: could not restore reel {}: {}", index, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::InMemoryAssets;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Log {
        created: Vec<(String, AnimationParams)>,
        destroyed: Vec<AnimationHandle>,
    }

    struct Recorder {
        log: Arc<Mutex<Log>>,
        next: u64,
        fail: bool,
    }

    impl SkeletonRenderer for Recorder {
        fn create(
            &mut self,
            character_id: &str,
            _skeleton: &SkeletonData,
            params: &AnimationParams,
        ) -> Result<AnimationHandle, RenderError> {
            if self.fail {
                return Err(RenderError::Instantiation {
                    character: character_id.into(),
                    reason: "no gpu".into(),
                });
            }
            self.next += 1;
            self.log
                .lock()
                .unwrap()
                .created
                .push((character_id.into(), params.clone()));
            Ok(AnimationHandle(self.next))
        }

        fn destroy(&mut self, handle: AnimationHandle) {
            self.log.lock().unwrap().destroyed.push(handle);
        }
    }

    struct Reels(Vec<bool>);

    impl ReelVisibility for Reels {
        fn reel_count(&self) -> usize {
            self.0.len()
        }

        fn set_reel_visible(&mut self, index: usize, visible: bool) -> ReelResult<()> {
            let slot = self.0.get_mut(index).ok_or(ReelError::ReelOutOfRange(index))?;
            *slot = visible;
            Ok(())
        }
    }

    fn presenter(fail: bool) -> (BonusPresenter, Arc<Mutex<Log>>) {
        let log = Arc::new(Mutex::new(Log::default()));
        let assets = InMemoryAssets::new()
            .with_skeleton("man", ["win", "idle"])
            .with_skeleton("woman", ["win"]);
        let presenter = BonusPresenter::new(
            Arc::new(assets),
            Box::new(Recorder {
                log: Arc::clone(&log),
                next: 0,
                fail,
            }),
            BonusConfig::default(),
            ReelLayout::default(),
            3,
        )
        .unwrap();
        (presenter, log)
    }

    #[test]
    fn test_column_win_hides_reel_and_masks() {
        let (mut presenter, log) = presenter(false);
        let mut reels = Reels(vec![true; 5]);

        let handle = presenter.handle_column_win(&mut reels, 2, "man");
        assert_eq!(handle, Some(AnimationHandle(1)));
        assert_eq!(reels.0, vec![true, true, false, true, true]);
        assert_eq!(presenter.mask(), &[ReelLayout::default().reel_rect(2, 3)]);

        let log = log.lock().unwrap();
        let (character, params) = &log.created[0];
        assert_eq!(character, "man");
        assert_eq!((params.x, params.y), (320.0, 150.0));
        assert_eq!(params.animation, "win");
        assert!(params.looped);
    }

    #[test]
    fn test_reset_restores_everything() {
        let (mut presenter, log) = presenter(false);
        let mut reels = Reels(vec![true; 5]);
        presenter.handle_column_win(&mut reels, 0, "man");
        presenter.handle_column_win(&mut reels, 4, "woman");
        assert_eq!(presenter.active().len(), 2);

        // A reel hidden by someone else is restored too
        reels.0[1] = false;
        presenter.reset(&mut reels);
        assert!(!presenter.is_active());
        assert!(presenter.mask().is_empty());
        assert_eq!(reels.0, vec![true; 5]);
        assert_eq!(
            log.lock().unwrap().destroyed,
            vec![AnimationHandle(1), AnimationHandle(2)]
        );
    }

    #[test]
    fn test_render_failure_keeps_reel_visible() {
        let (mut presenter, _) = presenter(true);
        let mut reels = Reels(vec![true; 5]);
        assert_eq!(presenter.handle_column_win(&mut reels, 1, "man"), None);
        assert_eq!(reels.0, vec![true; 5]);
        assert!(presenter.mask().is_empty());
    }

    #[test]
    fn test_unknown_character_and_reel() {
        let (mut presenter, _) = presenter(false);
        let mut reels = Reels(vec![true; 5]);
        assert_eq!(presenter.handle_column_win(&mut reels, 1, "dog"), None);
        assert_eq!(presenter.handle_column_win(&mut reels, 7, "man"), None);
        assert!(!presenter.is_active());
    }

    #[test]
    fn test_missing_skeleton_fails_construction() {
        let result = BonusPresenter::new(
            Arc::new(InMemoryAssets::new().with_skeleton("man", ["win"])),
            Box::new(Recorder {
                log: Arc::default(),
                next: 0,
                fail: false,
            }),
            BonusConfig::default(),
            ReelLayout::default(),
            3,
        );
        assert!(matches!(result, Err(ReelError::MissingSkeleton(s)) if s == "woman"));
    }
}
