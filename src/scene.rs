//! Scene/asset engine boundary.
//!
//! The engine owns GPU resources and drawing; the tracking core only moves
//! nodes, toggles their visibility and asks for them to be released.

use crate::landmarks::Rotation;
use crate::Result;
use nalgebra::Vector3;

/// Per-node render flags applied at load time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderFlags {
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    /// Let a face/hand occluder hide the parts of the model behind the body
    pub occlusion: bool,
}

/// Engine handle identifying a node
pub type NodeId = u64;

/// A repositionable model node in the engine's scene graph
pub trait SceneNode {
    fn id(&self) -> NodeId;

    fn set_position(&mut self, position: Vector3<f64>);
    fn position(&self) -> Vector3<f64>;

    fn set_rotation(&mut self, rotation: Rotation);
    fn rotation(&self) -> Rotation;

    fn set_scale(&mut self, scale: Vector3<f64>);
    fn scale(&self) -> Vector3<f64>;

    fn set_visible(&mut self, visible: bool);
    fn is_visible(&self) -> bool;

    fn set_render_flags(&mut self, flags: RenderFlags);

    /// Deep copy sharing nothing mutable with the original
    fn clone_node(&self) -> Box<dyn SceneNode>;

    /// Detach from whatever parent currently holds the node
    fn remove_from_parent(&mut self);

    /// Release geometry and material buffers
    fn dispose(&mut self);
}

/// The engine's scene root
pub trait SceneGraph {
    fn add(&mut self, node: &mut dyn SceneNode);
}

/// Model loading, injected into renderers at construction
pub trait AssetLoader {
    /// Load a model and return its root node
    ///
    /// # Errors
    ///
    /// Returns `ModelLoad` when the asset cannot be fetched or parsed
    fn load(&self, url: &str) -> Result<Box<dyn SceneNode>>;
}
