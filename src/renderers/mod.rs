//! Product renderers: anchor geometry, smoothing, visibility and LOD.
//!
//! Every product shares [`AnchoredRenderer`]; what differs is the
//! [`AnchorGeometry`] that maps one frame of landmarks to a raw target pose.
//! Each geometry declares the [`TrackingSource`] it consumes. Feeding a
//! renderer the other source always hides its model, so hosts can call both
//! update methods uniformly.

/// Glasses anchored between the eyes
pub mod eyewear;

/// Watches and bracelets anchored on the forearm
pub mod watch;

/// Necklaces hanging below the chin
pub mod necklace;

/// Mirrored earring pair anchored under the ears
pub mod earring;

/// Rings anchored on the ring finger
pub mod ring;

pub use earring::EarringRenderer;
pub use eyewear::EyewearRenderer;
pub use necklace::NecklaceRenderer;
pub use ring::RingRenderer;
pub use watch::WatchRenderer;

use crate::filters::{create_filter, exponential::ExponentialFilter, validate_factor, PoseFilter};
use crate::landmarks::{FaceLandmarks, HandLandmarks, Rotation};
use crate::pose::Pose;
use crate::scene::{AssetLoader, RenderFlags, SceneGraph, SceneNode};
use crate::{Error, Result};
use log::{debug, info, warn};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Which tracker feeds a renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackingSource {
    Face,
    Hand,
}

/// Level-of-detail variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LodLevel {
    High,
    Medium,
    Low,
}

impl LodLevel {
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    const fn index(self) -> usize {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

/// Optional model URL per LOD level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LodUrls {
    pub high: Option<String>,
    pub medium: Option<String>,
    pub low: Option<String>,
}

impl LodUrls {
    #[must_use]
    pub fn get(&self, level: LodLevel) -> Option<&str> {
        match level {
            LodLevel::High => self.high.as_deref(),
            LodLevel::Medium => self.medium.as_deref(),
            LodLevel::Low => self.low.as_deref(),
        }
    }
}

/// Per-product renderer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Primary model
    pub model_url: String,
    pub lod_urls: LodUrls,
    /// Multiplies every anchor scale
    pub scale_factor: f64,
    /// Scene-space offset added to every pose
    pub default_position: [f64; 3],
    /// Pitch, yaw, roll offset in radians added to every pose
    pub default_rotation: [f64; 3],
    pub enable_occlusion: bool,
    pub enable_shadows: bool,
    /// Filter spec overriding the product's smoothing, e.g. `exponential:0.5`
    pub smoothing: Option<String>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            model_url: String::new(),
            lod_urls: LodUrls::default(),
            scale_factor: 1.0,
            default_position: [0.0; 3],
            default_rotation: [0.0; 3],
            enable_occlusion: true,
            enable_shadows: true,
            smoothing: None,
        }
    }
}

impl RendererConfig {
    #[must_use]
    pub fn with_model(model_url: impl Into<String>) -> Self {
        Self {
            model_url: model_url.into(),
            ..Self::default()
        }
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for a non-positive scale factor, non-finite
    /// offsets, or an unparsable smoothing spec
    pub fn validate(&self) -> Result<()> {
        if !(self.scale_factor.is_finite() && self.scale_factor > 0.0) {
            return Err(Error::ConfigError(format!(
                "Scale factor must be positive, got {}",
                self.scale_factor
            )));
        }
        if !self
            .default_position
            .iter()
            .chain(self.default_rotation.iter())
            .all(|v| v.is_finite())
        {
            return Err(Error::ConfigError("Default offsets must be finite".to_string()));
        }
        if let Some(spec) = &self.smoothing {
            create_filter(spec, 0.5).map_err(|e| Error::ConfigError(e.to_string()))?;
        }
        Ok(())
    }

    fn render_flags(&self) -> RenderFlags {
        RenderFlags {
            cast_shadow: self.enable_shadows,
            receive_shadow: self.enable_shadows,
            occlusion: self.enable_occlusion,
        }
    }
}

/// The landmarks of one frame, for hosts that update renderers uniformly
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackingFrame<'a> {
    pub face: Option<&'a FaceLandmarks>,
    pub hands: &'a [HandLandmarks],
}

/// Product-specific mapping from landmarks to a raw target pose
pub trait AnchorGeometry {
    /// The tracker this product follows
    const SOURCE: TrackingSource;
    /// Product name for logs
    const NAME: &'static str;
    /// Exponential smoothing factor
    const SMOOTHING: f64;
    /// Whether the model and each LOD variant get a mirrored clone driven by `Pose::secondary`
    const MIRRORED_PAIR: bool = false;

    /// Target from a face, `None` if this frame gives no usable anchor
    fn face_target(&self, _face: &FaceLandmarks, _scale_factor: f64) -> Option<Pose> {
        None
    }

    /// Target from the frame's hands, `None` if no usable hand
    fn hand_target(&self, _hands: &[HandLandmarks], _scale_factor: f64) -> Option<Pose> {
        None
    }
}

/// Object-safe renderer contract used by sessions and hosts
pub trait ProductRenderer {
    fn name(&self) -> &'static str;

    fn source(&self) -> TrackingSource;

    /// Load the primary model; it starts hidden at the default transform
    ///
    /// # Errors
    ///
    /// Returns `ModelLoad` when the asset engine fails; the renderer keeps
    /// its previous model
    fn load_model(&mut self, url: &str) -> Result<()>;

    /// Load every configured LOD variant, returning how many loaded
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` without a primary model or after attaching
    fn preload_lods(&mut self) -> Result<usize>;

    /// Add every node to the scene
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when no model is loaded
    fn attach_to_scene(&mut self, scene: &mut dyn SceneGraph) -> Result<()>;

    fn update_from_face_tracking(&mut self, face: Option<&FaceLandmarks>);

    fn update_from_hand_tracking(&mut self, hands: &[HandLandmarks]);

    /// Update from whichever source this renderer follows
    fn update(&mut self, frame: &TrackingFrame<'_>) {
        match self.source() {
            TrackingSource::Face => self.update_from_face_tracking(frame.face),
            TrackingSource::Hand => self.update_from_hand_tracking(frame.hands),
        }
    }

    /// Swap to a preloaded variant; returns false and shows the primary model
    /// when that level was never preloaded
    fn set_lod(&mut self, level: LodLevel) -> bool;

    fn is_visible(&self) -> bool;

    /// Smoothed pose of the current frame while visible
    fn current_pose(&self) -> Option<Pose>;

    /// Release every node; safe to repeat
    fn dispose(&mut self);
}

/// Shared renderer machinery parameterized by anchor geometry
pub struct AnchoredRenderer<A: AnchorGeometry> {
    anchor: A,
    config: RendererConfig,
    loader: Rc<dyn AssetLoader>,
    filter: Box<dyn PoseFilter>,
    primary: Option<Box<dyn SceneNode>>,
    mirror: Option<Box<dyn SceneNode>>,
    lods: [Option<Box<dyn SceneNode>>; 3],
    lod_mirrors: [Option<Box<dyn SceneNode>>; 3],
    active_lod: Option<LodLevel>,
    attached: bool,
    visible: bool,
    pose: Option<Pose>,
}

impl<A: AnchorGeometry + Default> AnchoredRenderer<A> {
    /// Create a renderer with the product's default anchor
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the configuration does not validate
    pub fn new(config: RendererConfig, loader: Rc<dyn AssetLoader>) -> Result<Self> {
        Self::with_anchor(A::default(), config, loader)
    }
}

impl<A: AnchorGeometry> AnchoredRenderer<A> {
    /// Create a renderer around a specific anchor instance
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the configuration does not validate
    pub fn with_anchor(anchor: A, config: RendererConfig, loader: Rc<dyn AssetLoader>) -> Result<Self> {
        config.validate()?;
        let filter = match &config.smoothing {
            Some(spec) => create_filter(spec, A::SMOOTHING)?,
            None => {
                validate_factor(A::SMOOTHING)?;
                Box::new(ExponentialFilter::new(A::SMOOTHING)) as Box<dyn PoseFilter>
            }
        };
        debug!("{} renderer using {}", A::NAME, filter.name());

        Ok(Self {
            anchor,
            config,
            loader,
            filter,
            primary: None,
            mirror: None,
            lods: [None, None, None],
            lod_mirrors: [None, None, None],
            active_lod: None,
            attached: false,
            visible: false,
            pose: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    #[must_use]
    pub fn anchor(&self) -> &A {
        &self.anchor
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.primary.is_some()
    }

    /// Level currently shown, `None` for the primary model
    #[must_use]
    pub fn active_lod(&self) -> Option<LodLevel> {
        self.active_lod
    }

    /// Node currently receiving the pose
    #[must_use]
    pub fn active_node(&self) -> Option<&dyn SceneNode> {
        match self.active_lod {
            Some(level) => self.lods[level.index()].as_deref(),
            None => self.primary.as_deref(),
        }
    }

    /// Mirrored clone of the node currently receiving the pose
    #[must_use]
    pub fn mirror_node(&self) -> Option<&dyn SceneNode> {
        match self.active_lod {
            Some(level) => self.lod_mirrors[level.index()].as_deref(),
            None => self.mirror.as_deref(),
        }
    }

    fn active_node_mut(&mut self) -> Option<&mut (dyn SceneNode + 'static)> {
        match self.active_lod {
            Some(level) => self.lods[level.index()].as_deref_mut(),
            None => self.primary.as_deref_mut(),
        }
    }

    fn active_mirror_mut(&mut self) -> Option<&mut (dyn SceneNode + 'static)> {
        match self.active_lod {
            Some(level) => self.lod_mirrors[level.index()].as_deref_mut(),
            None => self.mirror.as_deref_mut(),
        }
    }

    fn mirror_of(&self, node: &dyn SceneNode) -> Option<Box<dyn SceneNode>> {
        if !A::MIRRORED_PAIR {
            return None;
        }
        let mut clone = node.clone_node();
        clone.set_scale(mirrored(Vector3::repeat(self.config.scale_factor)));
        clone.set_visible(false);
        Some(clone)
    }

    fn default_position(&self) -> Vector3<f64> {
        Vector3::from(self.config.default_position)
    }

    fn default_rotation(&self) -> Rotation {
        let [pitch, yaw, roll] = self.config.default_rotation;
        Rotation::new(pitch, yaw, roll)
    }

    fn prepare_node(&self, node: &mut dyn SceneNode) {
        node.set_scale(Vector3::repeat(self.config.scale_factor));
        node.set_position(self.default_position());
        node.set_rotation(self.default_rotation());
        node.set_render_flags(self.config.render_flags());
        node.set_visible(false);
    }

    fn apply_target(&mut self, target: Option<Pose>) {
        match target.filter(Pose::is_finite) {
            Some(target) if self.primary.is_some() => {
                let pose = self.filter.apply(&target);
                self.write_pose(&pose);
                self.pose = Some(pose);
                if !self.visible {
                    debug!("{} target acquired", A::NAME);
                    self.visible = true;
                    self.sync_visibility();
                }
            }
            _ => self.hide(),
        }
    }

    fn hide(&mut self) {
        if self.visible {
            debug!("{} target lost", A::NAME);
        }
        self.visible = false;
        self.pose = None;
        self.filter.reset();
        self.sync_visibility();
    }

    fn write_pose(&mut self, pose: &Pose) {
        let offset = self.default_position();
        let rotation = pose.rotation + self.default_rotation();
        let scale = Vector3::repeat(pose.scale);

        if let Some(node) = self.active_node_mut() {
            node.set_position(pose.position + offset);
            node.set_rotation(rotation);
            node.set_scale(scale);
        }
        if let Some(mirror) = self.active_mirror_mut() {
            mirror.set_position(pose.secondary.unwrap_or(pose.position) + offset);
            mirror.set_rotation(rotation);
            mirror.set_scale(mirrored(scale));
        }
    }

    fn sync_visibility(&mut self) {
        let visible = self.visible;
        let active = self.active_lod;

        if let Some(primary) = self.primary.as_deref_mut() {
            primary.set_visible(visible && active.is_none());
        }
        if let Some(mirror) = self.mirror.as_deref_mut() {
            mirror.set_visible(visible && active.is_none());
        }
        for level in LodLevel::ALL {
            let shown = visible && active == Some(level);
            if let Some(node) = self.lods[level.index()].as_deref_mut() {
                node.set_visible(shown);
            }
            if let Some(mirror) = self.lod_mirrors[level.index()].as_deref_mut() {
                mirror.set_visible(shown);
            }
        }
    }

    fn release_nodes(&mut self) -> bool {
        let mut nodes: Vec<Box<dyn SceneNode>> = self
            .lods
            .iter_mut()
            .chain(self.lod_mirrors.iter_mut())
            .filter_map(Option::take)
            .collect();
        nodes.extend(self.mirror.take());
        nodes.extend(self.primary.take());

        let released = !nodes.is_empty();
        for mut node in nodes {
            node.remove_from_parent();
            node.dispose();
        }
        released
    }
}

/// Negate the mirror axis of a scale vector
#[must_use]
pub fn mirrored(scale: Vector3<f64>) -> Vector3<f64> {
    Vector3::new(-scale.x, scale.y, scale.z)
}

impl<A: AnchorGeometry> ProductRenderer for AnchoredRenderer<A> {
    fn name(&self) -> &'static str {
        A::NAME
    }

    fn source(&self) -> TrackingSource {
        A::SOURCE
    }

    fn load_model(&mut self, url: &str) -> Result<()> {
        info!("Loading {} model from {}", A::NAME, url);
        let mut node = self.loader.load(url).map_err(|e| {
            warn!("{} model failed to load: {}", A::NAME, e);
            e
        })?;
        self.prepare_node(node.as_mut());
        let mirror = self.mirror_of(node.as_ref());

        // a reload replaces the previous model entirely
        self.release_nodes();
        self.primary = Some(node);
        self.mirror = mirror;
        self.active_lod = None;
        self.attached = false;
        self.visible = false;
        self.pose = None;
        self.filter.reset();
        Ok(())
    }

    fn preload_lods(&mut self) -> Result<usize> {
        if self.primary.is_none() {
            return Err(Error::InvalidState(format!("{} model not loaded", A::NAME)));
        }
        if self.attached {
            return Err(Error::InvalidState("LOD variants must be preloaded before attaching".to_string()));
        }

        let urls: Vec<(LodLevel, String)> = LodLevel::ALL
            .iter()
            .filter_map(|&level| self.config.lod_urls.get(level).map(|url| (level, url.to_string())))
            .collect();

        let mut loaded = 0;
        for (level, url) in urls {
            match self.loader.load(&url) {
                Ok(mut node) => {
                    self.prepare_node(node.as_mut());
                    let mirror = self.mirror_of(node.as_ref());
                    let slot = level.index();
                    let replaced = [
                        self.lods[slot].replace(node),
                        std::mem::replace(&mut self.lod_mirrors[slot], mirror),
                    ];
                    for mut old in replaced.into_iter().flatten() {
                        old.remove_from_parent();
                        old.dispose();
                    }
                    loaded += 1;
                }
                Err(e) => warn!("Skipping {level:?} LOD for {}: {e}", A::NAME),
            }
        }

        debug!("{} preloaded {loaded} LOD variants", A::NAME);
        Ok(loaded)
    }

    fn attach_to_scene(&mut self, scene: &mut dyn SceneGraph) -> Result<()> {
        let Some(primary) = self.primary.as_deref_mut() else {
            return Err(Error::InvalidState(format!("{} model not loaded", A::NAME)));
        };
        scene.add(primary);
        if let Some(mirror) = self.mirror.as_deref_mut() {
            scene.add(mirror);
        }
        for slot in self.lods.iter_mut().chain(self.lod_mirrors.iter_mut()) {
            if let Some(node) = slot.as_deref_mut() {
                scene.add(node);
            }
        }
        self.attached = true;
        Ok(())
    }

    fn update_from_face_tracking(&mut self, face: Option<&FaceLandmarks>) {
        if A::SOURCE != TrackingSource::Face {
            self.hide();
            return;
        }
        let target = face.and_then(|face| self.anchor.face_target(face, self.config.scale_factor));
        self.apply_target(target);
    }

    fn update_from_hand_tracking(&mut self, hands: &[HandLandmarks]) {
        if A::SOURCE != TrackingSource::Hand {
            self.hide();
            return;
        }
        let target = self.anchor.hand_target(hands, self.config.scale_factor);
        self.apply_target(target);
    }

    fn set_lod(&mut self, level: LodLevel) -> bool {
        let available = self.lods[level.index()].is_some();
        let next = available.then_some(level);

        if next != self.active_lod {
            self.active_lod = next;
            if let Some(pose) = self.pose {
                self.write_pose(&pose);
            }
            self.sync_visibility();
        }
        if !available {
            debug!("{level:?} LOD not preloaded for {}, showing primary model", A::NAME);
        }
        available
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn current_pose(&self) -> Option<Pose> {
        self.pose
    }

    fn dispose(&mut self) {
        let released = self.release_nodes();
        self.active_lod = None;
        self.attached = false;
        self.visible = false;
        self.pose = None;
        self.filter.reset();
        if released {
            info!("{} renderer disposed", A::NAME);
        }
    }
}

impl<A: AnchorGeometry> Drop for AnchoredRenderer<A> {
    fn drop(&mut self) {
        self.dispose();
    }
}
