//! In-memory scene engine.
//!
//! Nodes are plain records in a shared world, so the replay binary can log
//! what a real engine would draw and tests can inspect every node a renderer
//! touched, including after the renderer has released it.

use crate::landmarks::Rotation;
use crate::scene::{AssetLoader, NodeId, RenderFlags, SceneGraph, SceneNode};
use crate::{Error, Result};
use nalgebra::Vector3;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// Snapshot of one node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeState {
    pub id: NodeId,
    pub url: String,
    pub position: Vector3<f64>,
    pub rotation: Rotation,
    pub scale: Vector3<f64>,
    pub visible: bool,
    pub flags: RenderFlags,
    pub attached: bool,
    pub disposed: bool,
    /// Source node when created by `clone_node`
    pub cloned_from: Option<NodeId>,
}

impl NodeState {
    fn new(id: NodeId, url: &str) -> Self {
        Self {
            id,
            url: url.to_string(),
            position: Vector3::zeros(),
            rotation: Rotation::default(),
            scale: Vector3::repeat(1.0),
            visible: true,
            flags: RenderFlags::default(),
            attached: false,
            disposed: false,
            cloned_from: None,
        }
    }

    /// Attached, not disposed and visible
    #[must_use]
    pub fn is_drawn(&self) -> bool {
        self.attached && !self.disposed && self.visible
    }
}

#[derive(Debug, Default)]
struct World {
    nodes: Vec<NodeState>,
    failing: HashSet<String>,
    loads: usize,
}

impl World {
    fn spawn(&mut self, mut state: NodeState) -> NodeId {
        let id = self.nodes.len() as NodeId;
        state.id = id;
        self.nodes.push(state);
        id
    }
}

/// Handle to a shared in-memory world
#[derive(Debug, Clone, Default)]
pub struct HeadlessEngine {
    world: Rc<RefCell<World>>,
}

impl HeadlessEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Asset loader creating nodes in this world
    #[must_use]
    pub fn loader(&self) -> Rc<dyn AssetLoader> {
        Rc::new(HeadlessLoader {
            world: Rc::clone(&self.world),
        })
    }

    /// Scene root of this world
    #[must_use]
    pub fn scene(&self) -> HeadlessScene {
        HeadlessScene {
            world: Rc::clone(&self.world),
        }
    }

    /// Make every later load of `url` fail
    pub fn fail_url(&self, url: impl Into<String>) {
        self.world.borrow_mut().failing.insert(url.into());
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<NodeState> {
        self.world.borrow().nodes.get(id as usize).cloned()
    }

    /// Every node ever created, in creation order
    #[must_use]
    pub fn nodes(&self) -> Vec<NodeState> {
        self.world.borrow().nodes.clone()
    }

    /// Nodes currently drawn
    #[must_use]
    pub fn drawn_nodes(&self) -> Vec<NodeState> {
        self.world.borrow().nodes.iter().filter(|n| n.is_drawn()).cloned().collect()
    }

    /// Nodes not yet disposed
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.world.borrow().nodes.iter().filter(|n| !n.disposed).count()
    }

    /// Nodes attached to the scene and not disposed
    #[must_use]
    pub fn attached_count(&self) -> usize {
        self.world
            .borrow()
            .nodes
            .iter()
            .filter(|n| n.attached && !n.disposed)
            .count()
    }

    /// Load requests seen, including failed ones
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.world.borrow().loads
    }
}

/// Loader producing [`HeadlessNode`]s
#[derive(Debug)]
pub struct HeadlessLoader {
    world: Rc<RefCell<World>>,
}

impl AssetLoader for HeadlessLoader {
    fn load(&self, url: &str) -> Result<Box<dyn SceneNode>> {
        let mut world = self.world.borrow_mut();
        world.loads += 1;
        if url.is_empty() || world.failing.contains(url) {
            return Err(Error::ModelLoad {
                url: url.to_string(),
                reason: "asset unavailable".to_string(),
            });
        }
        let id = world.spawn(NodeState::new(0, url));
        log::trace!("Headless node {id} loaded from {url}");
        drop(world);

        Ok(Box::new(HeadlessNode {
            id,
            world: Rc::clone(&self.world),
        }))
    }
}

/// Scene root marking added nodes as attached
#[derive(Debug)]
pub struct HeadlessScene {
    world: Rc<RefCell<World>>,
}

impl SceneGraph for HeadlessScene {
    fn add(&mut self, node: &mut dyn SceneNode) {
        let id = node.id();
        match self.world.borrow_mut().nodes.get_mut(id as usize) {
            Some(state) => state.attached = true,
            None => log::warn!("Ignoring foreign node {id}"),
        }
    }
}

/// Node backed by a record in the shared world
#[derive(Debug)]
pub struct HeadlessNode {
    id: NodeId,
    world: Rc<RefCell<World>>,
}

impl HeadlessNode {
    fn read<R>(&self, f: impl FnOnce(&NodeState) -> R) -> R {
        f(&self.world.borrow().nodes[self.id as usize])
    }

    fn write(&mut self, f: impl FnOnce(&mut NodeState)) {
        f(&mut self.world.borrow_mut().nodes[self.id as usize]);
    }
}

impl SceneNode for HeadlessNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn set_position(&mut self, position: Vector3<f64>) {
        self.write(|n| n.position = position);
    }

    fn position(&self) -> Vector3<f64> {
        self.read(|n| n.position)
    }

    fn set_rotation(&mut self, rotation: Rotation) {
        self.write(|n| n.rotation = rotation);
    }

    fn rotation(&self) -> Rotation {
        self.read(|n| n.rotation)
    }

    fn set_scale(&mut self, scale: Vector3<f64>) {
        self.write(|n| n.scale = scale);
    }

    fn scale(&self) -> Vector3<f64> {
        self.read(|n| n.scale)
    }

    fn set_visible(&mut self, visible: bool) {
        self.write(|n| n.visible = visible);
    }

    fn is_visible(&self) -> bool {
        self.read(|n| n.visible)
    }

    fn set_render_flags(&mut self, flags: RenderFlags) {
        self.write(|n| n.flags = flags);
    }

    fn clone_node(&self) -> Box<dyn SceneNode> {
        let mut state = self.read(NodeState::clone);
        state.attached = false;
        state.disposed = false;
        state.cloned_from = Some(self.id);
        let id = self.world.borrow_mut().spawn(state);

        Box::new(Self {
            id,
            world: Rc::clone(&self.world),
        })
    }

    fn remove_from_parent(&mut self) {
        self.write(|n| n.attached = false);
    }

    fn dispose(&mut self) {
        self.write(|n| n.disposed = true);
    }
}
