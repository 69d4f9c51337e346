//! The table: puts the cards down and turns touches into card moves.
//!
//! A single press picks a card up (it wiggles and grows), dragging moves it,
//! and letting go puts it back on the board on top of the others. A double
//! press blows the card up in the middle of the table, or puts it back.
//! Enlarged cards ignore everything else until they are put back.

use std::collections::HashMap;

use engine::{Action, Node, NodeId, SceneGraph, SceneHandler, Touch, TouchId, World};
use glam::Vec2;
use log::{debug, error, info, trace};

use crate::card::{Card, CardLevel};
use crate::config::{GameConfig, Tuning};

pub const WIGGLE_KEY: &str = "wiggle";
pub const PICKUP_KEY: &str = "pickup";
pub const DROP_KEY: &str = "drop";

pub struct CardScene {
    config: GameConfig,
    cards: Vec<Card>,
    by_node: HashMap<NodeId, usize>,
    /// Card each live touch picked up.
    held: HashMap<TouchId, usize>,
    background: Option<NodeId>,
}

impl CardScene {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            cards: Vec::new(),
            by_node: HashMap::new(),
            held: HashMap::new(),
            background: None,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn background(&self) -> Option<NodeId> {
        self.background
    }

    /// Index of the card drawn topmost at `point`. A hit on one of a card's
    /// child nodes counts as a hit on the card.
    pub fn card_at(&self, graph: &SceneGraph, point: Vec2) -> Option<usize> {
        let hit = graph.node_at(point)?;
        std::iter::once(hit)
            .chain(graph.ancestors(hit))
            .find_map(|id| self.by_node.get(&id).copied())
    }

    fn tuning(&self) -> Tuning {
        self.config.tuning
    }

    fn press(&mut self, world: &mut World, touch: &Touch) {
        let Some(index) = self.card_at(&world.graph, touch.location) else {
            return;
        };
        if touch.tap_count > 1 {
            self.held.remove(&touch.id);
            let container = world.bounds();
            let card = &mut self.cards[index];
            if let Err(err) = card.toggle_enlarge(world, container) {
                error!("cannot enlarge {:?}: {err}", card.kind());
            }
            return;
        }

        let card = &self.cards[index];
        if card.is_modal(&world.graph) {
            return;
        }
        debug!("picked up {:?}", card.kind());
        let node = card.node();
        let tuning = self.tuning();
        let graph = &mut world.graph;

        let wiggle = Action::repeat_forever(Action::sequence([
            Action::scale_x_to(tuning.wiggle_low, tuning.wiggle_half),
            Action::scale_x_to(tuning.wiggle_high, tuning.wiggle_half),
        ]));
        graph.run_with_key(node, wiggle, WIGGLE_KEY);
        graph[node].z = CardLevel::Moving.z();
        graph.remove_action(node, DROP_KEY);
        graph.run_with_key(
            node,
            Action::scale_to(tuning.pickup_scale, tuning.pickup_duration),
            PICKUP_KEY,
        );
        self.held.insert(touch.id, index);
    }

    fn drag(&mut self, world: &mut World, touch: &Touch) {
        let target = match self.held.get(&touch.id) {
            Some(index) => Some(*index),
            None => self.card_at(&world.graph, touch.location),
        };
        let Some(index) = target else {
            return;
        };
        let card = &self.cards[index];
        if card.is_modal(&world.graph) {
            return;
        }
        trace!("{:?} to {}", card.kind(), touch.location);
        world.graph[card.node()].position = touch.location;
    }

    fn release(&mut self, world: &mut World, touch: &Touch) {
        let target = match self.held.remove(&touch.id) {
            Some(index) => Some(index),
            None => self.card_at(&world.graph, touch.location),
        };
        let Some(index) = target else {
            return;
        };
        let card = &self.cards[index];
        if card.is_modal(&world.graph) {
            return;
        }
        debug!("dropped {:?} at {}", card.kind(), card.position(&world.graph));
        let node = card.node();
        let tuning = self.tuning();
        let graph = &mut world.graph;

        graph[node].z = CardLevel::Board.z();
        // back on as the last child so it stacks above cards already down
        let parent = graph[node].parent().unwrap_or(graph.root());
        graph.remove_from_parent(node);
        graph.add_child(parent, node);

        graph.remove_action(node, WIGGLE_KEY);
        graph.remove_action(node, PICKUP_KEY);
        graph.run_with_key(node, Action::scale_to(1.0, tuning.drop_duration), DROP_KEY);
    }
}

impl SceneHandler for CardScene {
    fn did_move(&mut self, world: &mut World) -> engine::Result<()> {
        let root = world.graph.root();
        let bounds = world.bounds();

        let bg_texture = world.assets.texture(&self.config.background)?;
        let bg = world.graph.spawn(
            Node::sprite("background", bg_texture, bounds.size)
                .with_anchor(Vec2::ZERO)
                .with_position(bounds.origin),
        );
        world.graph.add_child(root, bg);
        self.background = Some(bg);

        let tuning = self.tuning();
        for placement in self.config.cards.clone() {
            let card = Card::new(placement.kind, world, tuning)?;
            world.graph[card.node()].position = placement.position;
            world.graph.add_child(root, card.node());
            self.by_node.insert(card.node(), self.cards.len());
            self.cards.push(card);
        }
        info!("dealt {} cards", self.cards.len());
        Ok(())
    }

    fn did_change_size(&mut self, world: &mut World, _old_size: Vec2) {
        let Some(bg) = self.background else {
            return;
        };
        let bounds = world.bounds();
        let node = &mut world.graph[bg];
        node.position = bounds.origin;
        node.size = bounds.size;
    }

    fn touches_began(&mut self, world: &mut World, touches: &[Touch]) {
        for touch in touches {
            self.press(world, touch);
        }
    }

    fn touches_moved(&mut self, world: &mut World, touches: &[Touch]) {
        for touch in touches {
            self.drag(world, touch);
        }
    }

    fn touches_ended(&mut self, world: &mut World, touches: &[Touch]) {
        for touch in touches {
            self.release(world, touch);
        }
    }

    fn touches_cancelled(&mut self, world: &mut World, touches: &[Touch]) {
        for touch in touches {
            self.release(world, touch);
        }
    }

    fn secondary_press(&mut self, world: &mut World, location: Vec2) {
        if let Some(index) = self.card_at(&world.graph, location) {
            self.cards[index].flip(&mut world.graph);
        }
    }
}
