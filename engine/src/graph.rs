//! Retained scene graph.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Nodes are never
//! freed while the graph lives; detaching a node only unlinks it from its
//! parent, so an id handed out by a graph is always valid for that graph.

use std::ops::{Index, IndexMut};

use glam::Vec2;
use log::trace;

use crate::action::{Action, Effect, RunningAction, Step};
use crate::assets::{SoundId, TextureId};
use crate::geometry::Rect;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Empty,
    Sprite(TextureId),
    Label(String),
}

#[derive(Debug)]
pub struct Node {
    pub name: String,
    /// Relative to the parent.
    pub position: Vec2,
    pub scale: Vec2,
    pub rotation: f32,
    /// Draw order among siblings; higher draws later.
    pub z: f32,
    pub size: Vec2,
    /// Fraction of `size` that sits on `position`. (0.5, 0.5) is centered.
    pub anchor: Vec2,
    pub content: Content,
    pub hidden: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    actions: Vec<RunningAction>,
}

impl Node {
    pub fn empty(name: &str, size: Vec2) -> Self {
        Self {
            name: name.to_owned(),
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
            z: 0.0,
            size,
            anchor: Vec2::splat(0.5),
            content: Content::Empty,
            hidden: false,
            parent: None,
            children: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn sprite(name: &str, texture: TextureId, size: Vec2) -> Self {
        Self {
            content: Content::Sprite(texture),
            ..Self::empty(name, size)
        }
    }

    pub fn label(name: &str, text: impl Into<String>, size: Vec2) -> Self {
        Self {
            content: Content::Label(text.into()),
            ..Self::empty(name, size)
        }
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_z(mut self, z: f32) -> Self {
        self.z = z;
        self
    }

    pub fn with_anchor(mut self, anchor: Vec2) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn texture(&self) -> Option<TextureId> {
        match self.content {
            Content::Sprite(texture) => Some(texture),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Content::Label(text) => Some(text),
            _ => None,
        }
    }

    fn is_hit_testable(&self) -> bool {
        !matches!(self.content, Content::Empty) && self.size.x != 0.0 && self.size.y != 0.0
    }
}

pub struct SceneGraph {
    nodes: Vec<Node>,
    root: NodeId,
    sounds: Vec<SoundId>,
}

impl SceneGraph {
    /// A graph whose root spans `size` with its origin in the lower-left.
    pub fn new(size: Vec2) -> Self {
        let root = Node::empty("scene", size).with_anchor(Vec2::ZERO);
        Self {
            nodes: vec![root],
            root: NodeId(0),
            sounds: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn size(&self) -> Vec2 {
        self[self.root].size
    }

    pub fn resize(&mut self, size: Vec2) {
        let root = self.root;
        self[root].size = size;
    }

    /// Adds a detached node to the arena.
    pub fn spawn(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Appends `child` to the end of `parent`'s children, detaching it from
    /// any previous parent first.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.remove_from_parent(child);
        self[child].parent = Some(parent);
        self[parent].children.push(child);
    }

    pub fn remove_from_parent(&mut self, id: NodeId) {
        if let Some(parent) = self[id].parent.take() {
            self[parent].children.retain(|c| *c != id);
        }
    }

    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self[id].parent, move |p| self[*p].parent)
    }

    /// World position and scale, ignoring rotation.
    fn world_transform(&self, id: NodeId) -> (Vec2, Vec2) {
        let node = &self[id];
        match node.parent {
            None => (node.position, node.scale),
            Some(parent) => {
                let (p_pos, p_scale) = self.world_transform(parent);
                (p_pos + p_scale * node.position, p_scale * node.scale)
            }
        }
    }

    /// Axis-aligned bounds in scene coordinates.
    pub fn frame(&self, id: NodeId) -> Rect {
        let (position, scale) = self.world_transform(id);
        let node = &self[id];
        let size = node.size * scale;
        Rect::new(position - size * node.anchor, size)
    }

    /// Visible nodes in draw order: parents before children, siblings by
    /// ascending `z`, ties in child order.
    pub fn render_list(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        self.collect_visible(self.root, &mut out);
        out
    }

    fn collect_visible(&self, id: NodeId, out: &mut Vec<NodeId>) {
        let node = &self[id];
        if node.hidden {
            return;
        }
        out.push(id);
        let mut children = node.children.clone();
        children.sort_by(|a, b| self[*a].z.total_cmp(&self[*b].z));
        for child in children {
            self.collect_visible(child, out);
        }
    }

    /// Topmost drawn node containing `point`.
    pub fn node_at(&self, point: Vec2) -> Option<NodeId> {
        self.render_list()
            .into_iter()
            .rev()
            .find(|id| self[*id].is_hit_testable() && self.frame(*id).contains(point))
    }

    pub fn run(&mut self, id: NodeId, action: Action) {
        self[id].actions.push(RunningAction::new(&action, None));
    }

    /// Runs `action` under `key`, replacing whatever already ran under it.
    pub fn run_with_key(&mut self, id: NodeId, action: Action, key: &str) {
        self.remove_action(id, key);
        self[id]
            .actions
            .push(RunningAction::new(&action, Some(key.to_owned())));
    }

    pub fn remove_action(&mut self, id: NodeId, key: &str) {
        self[id].actions.retain(|a| a.key() != Some(key));
    }

    pub fn remove_all_actions(&mut self, id: NodeId) {
        self[id].actions.clear();
    }

    pub fn has_action(&self, id: NodeId, key: &str) -> bool {
        self[id].actions.iter().any(|a| a.key() == Some(key))
    }

    pub fn has_actions(&self, id: NodeId) -> bool {
        !self[id].actions.is_empty()
    }

    /// Advances every running action by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        let mut effects = Vec::new();
        for index in 0..self.nodes.len() {
            let node = &mut self.nodes[index];
            if node.actions.is_empty() {
                continue;
            }
            let mut actions = std::mem::take(&mut node.actions);
            actions.retain_mut(|action| matches!(action.step(dt, node, &mut effects), Step::Running));
            node.actions = actions;
        }
        for effect in effects {
            match effect {
                Effect::Sound(sound) => self.sounds.push(sound),
                Effect::Run { node, key, action } => {
                    trace!("follow-up action {key:?} on {node:?}");
                    self.run_with_key(node, action, &key);
                }
            }
        }
    }

    /// Sounds emitted by actions since the last drain.
    pub fn drain_sounds(&mut self) -> Vec<SoundId> {
        std::mem::take(&mut self.sounds)
    }
}

impl Index<NodeId> for SceneGraph {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

impl IndexMut<NodeId> for SceneGraph {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetStore;

    fn graph_with_two_cards() -> (SceneGraph, NodeId, NodeId) {
        let mut assets = AssetStore::in_memory();
        let tex = assets.register_texture("card", Vec2::new(100.0, 140.0));
        let mut graph = SceneGraph::new(Vec2::new(1024.0, 768.0));
        let root = graph.root();
        let a = graph.spawn(Node::sprite("a", tex, Vec2::new(100.0, 140.0)).with_position(Vec2::new(100.0, 200.0)));
        let b = graph.spawn(Node::sprite("b", tex, Vec2::new(100.0, 140.0)).with_position(Vec2::new(150.0, 200.0)));
        graph.add_child(root, a);
        graph.add_child(root, b);
        (graph, a, b)
    }

    #[test]
    fn later_sibling_is_on_top_at_equal_z() {
        let (graph, _, b) = graph_with_two_cards();
        assert_eq!(graph.node_at(Vec2::new(125.0, 200.0)), Some(b));
    }

    #[test]
    fn higher_z_wins_hit_test() {
        let (mut graph, a, _) = graph_with_two_cards();
        graph[a].z = 100.0;
        assert_eq!(graph.node_at(Vec2::new(125.0, 200.0)), Some(a));
    }

    #[test]
    fn readding_moves_node_to_end_of_children() {
        let (mut graph, a, b) = graph_with_two_cards();
        let root = graph.root();
        graph.remove_from_parent(a);
        assert_eq!(graph[a].parent(), None);
        assert!(!graph.render_list().contains(&a));
        graph.add_child(root, a);
        assert_eq!(graph[root].children(), &[b, a]);
        assert_eq!(graph.node_at(Vec2::new(125.0, 200.0)), Some(a));
    }

    #[test]
    fn hidden_nodes_are_not_hit() {
        let (mut graph, a, b) = graph_with_two_cards();
        graph[b].hidden = true;
        assert_eq!(graph.node_at(Vec2::new(125.0, 200.0)), Some(a));
        assert_eq!(graph.node_at(Vec2::new(900.0, 700.0)), None);
    }

    #[test]
    fn child_frames_follow_parent_scale() {
        let (mut graph, a, _) = graph_with_two_cards();
        let label = graph.spawn(Node::label("damage", "0", Vec2::new(10.0, 10.0)).with_position(Vec2::new(-40.0, -60.0)));
        graph.add_child(a, label);
        graph[a].scale = Vec2::splat(2.0);
        assert_eq!(graph.frame(label), Rect::new(Vec2::new(10.0, 70.0), Vec2::new(20.0, 20.0)));
        assert_eq!(graph.ancestors(label).collect::<Vec<_>>(), vec![a, graph.root()]);
    }

    #[test]
    fn keyed_actions_replace_and_cancel() {
        let (mut graph, a, _) = graph_with_two_cards();
        graph.run_with_key(a, Action::scale_to(1.3, 0.25), "pickup");
        graph.run_with_key(a, Action::scale_to(2.0, 0.25), "pickup");
        graph.update(0.3);
        assert_eq!(graph[a].scale, Vec2::splat(2.0));

        graph.run_with_key(a, Action::scale_to(1.0, 0.25), "drop");
        assert!(graph.has_action(a, "drop"));
        graph.remove_action(a, "drop");
        graph.update(0.3);
        assert_eq!(graph[a].scale, Vec2::splat(2.0));
        assert!(!graph.has_actions(a));
    }

    #[test]
    fn sounds_and_follow_ups_are_collected() {
        let (mut graph, a, b) = graph_with_two_cards();
        let mut assets = AssetStore::in_memory();
        let roar = assets.register_sound("roar.wav");
        graph.run(
            a,
            Action::sequence([
                Action::PlaySound(roar),
                Action::run_on(b, "hide", Action::SetHidden(true)),
            ]),
        );
        graph.update(0.0);
        assert_eq!(graph.drain_sounds(), vec![roar]);
        assert!(graph.drain_sounds().is_empty());
        assert!(!graph[b].hidden);
        assert!(graph.has_action(b, "hide"));
        graph.update(0.0);
        assert!(graph[b].hidden);
    }

    #[test]
    fn queued_follow_up_can_be_cancelled_by_key() {
        let (mut graph, a, b) = graph_with_two_cards();
        graph.run(a, Action::run_on(b, "hide", Action::SetHidden(true)));
        graph.update(0.0);
        graph.remove_action(b, "hide");
        graph.update(0.0);
        assert!(!graph[b].hidden);
    }
}
