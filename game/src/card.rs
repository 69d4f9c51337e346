//! Card entity: which creature it shows, which side is up, and whether it is
//! blown up in the middle of the table.

use engine::{Action, Content, Node, NodeId, Rect, SceneGraph, TextureId, World};
use glam::Vec2;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::Tuning;

pub const BACK_TEXTURE: &str = "card_back";

pub const FLIP_KEY: &str = "flip";
pub const ENLARGE_KEY: &str = "enlarge";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    Wolf,
    Bear,
    Dragon,
}

/// Assets belonging to one kind of card.
#[derive(Debug)]
pub struct CardArt {
    pub front: &'static str,
    pub large: &'static str,
    pub sound: &'static str,
}

const ART: [CardArt; 3] = [
    CardArt {
        front: "card_creature_wolf",
        large: "card_creature_wolf_large",
        sound: "wolf_howl.wav",
    },
    CardArt {
        front: "card_creature_bear",
        large: "card_creature_bear_large",
        sound: "bear_growl.wav",
    },
    CardArt {
        front: "card_creature_dragon",
        large: "card_creature_dragon_large",
        sound: "dragon_roar.wav",
    },
];

impl CardKind {
    pub const ALL: [CardKind; 3] = [CardKind::Wolf, CardKind::Bear, CardKind::Dragon];

    pub fn art(self) -> &'static CardArt {
        &ART[self as usize]
    }
}

/// Draw-order tiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardLevel {
    Board,
    Moving,
    Enlarged,
}

impl CardLevel {
    pub fn z(self) -> f32 {
        match self {
            CardLevel::Board => 10.0,
            CardLevel::Moving => 100.0,
            CardLevel::Enlarged => 200.0,
        }
    }
}

const DAMAGE_LABEL_SIZE: Vec2 = Vec2::new(24.0, 16.0);

#[derive(Debug)]
pub struct Card {
    kind: CardKind,
    node: NodeId,
    damage_label: NodeId,
    front: TextureId,
    back: TextureId,
    /// Resolved on the first enlarge.
    large: Option<TextureId>,
    face_up: bool,
    damage: u32,
    enlarged: bool,
    /// Only set while enlarged.
    saved_position: Option<Vec2>,
    tuning: Tuning,
}

impl Card {
    /// Builds the card's sprite and damage label. The sprite is left detached
    /// so the caller decides where it goes.
    pub fn new(kind: CardKind, world: &mut World, tuning: Tuning) -> engine::Result<Self> {
        let front = world.assets.texture(kind.art().front)?;
        let back = world.assets.texture(BACK_TEXTURE)?;
        let size = world.assets.texture_size(front);

        let damage = 0;
        let graph = &mut world.graph;
        let node = graph.spawn(Node::sprite(&format!("{kind:?}"), front, size).with_z(CardLevel::Board.z()));
        let corner = Vec2::new(-size.x, -size.y) * 0.5 + DAMAGE_LABEL_SIZE;
        let damage_label = graph.spawn(
            Node::label("damage", damage.to_string(), DAMAGE_LABEL_SIZE)
                .with_position(corner)
                .with_z(1.0),
        );
        graph.add_child(node, damage_label);

        Ok(Self {
            kind,
            node,
            damage_label,
            front,
            back,
            large: None,
            face_up: true,
            damage,
            enlarged: false,
            saved_position: None,
            tuning,
        })
    }

    pub fn kind(&self) -> CardKind {
        self.kind
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn damage_label(&self) -> NodeId {
        self.damage_label
    }

    pub fn face_up(&self) -> bool {
        self.face_up
    }

    pub fn damage(&self) -> u32 {
        self.damage
    }

    pub fn is_enlarged(&self) -> bool {
        self.enlarged
    }

    pub fn saved_position(&self) -> Option<Vec2> {
        self.saved_position
    }

    pub fn large_texture(&self) -> Option<TextureId> {
        self.large
    }

    pub fn position(&self, graph: &SceneGraph) -> Vec2 {
        graph[self.node].position
    }

    /// Enlarged, or still sliding back from being enlarged. Drag input is
    /// ignored in both cases.
    pub fn is_modal(&self, graph: &SceneGraph) -> bool {
        self.enlarged || graph.has_action(self.node, ENLARGE_KEY)
    }

    /// Texture matching the current state.
    pub fn face_texture(&self) -> TextureId {
        match (self.face_up, self.enlarged) {
            (false, _) => self.back,
            (true, true) => self.large.unwrap_or(self.front),
            (true, false) => self.front,
        }
    }

    fn resting_scale(&self) -> f32 {
        if self.enlarged {
            self.tuning.enlarge_scale
        } else {
            1.0
        }
    }

    /// Turns the card over. The state changes now; the texture swaps when the
    /// shrinking half of the animation reaches zero width. A flip issued while
    /// another is still animating replaces it, so the card always comes to
    /// rest on the side `face_up` says.
    pub fn flip(&mut self, graph: &mut SceneGraph) {
        self.face_up = !self.face_up;
        debug!("{:?} flipped, face up: {}", self.kind, self.face_up);

        let half = self.tuning.flip_half;
        let flip = Action::sequence([
            Action::scale_x_to(0.0, half),
            Action::SetTexture(self.face_texture()),
            Action::run_on(self.damage_label, FLIP_KEY, Action::SetHidden(!self.face_up)),
            Action::scale_x_to(self.resting_scale(), half),
        ]);
        graph.run_with_key(self.node, flip, FLIP_KEY);
    }

    /// Blows the card up in the middle of `container`, or puts it back where
    /// it was. Fails only if the large texture cannot be resolved, in which
    /// case nothing changes.
    pub fn toggle_enlarge(&mut self, world: &mut World, container: Rect) -> engine::Result<()> {
        if self.enlarged {
            self.shrink(&mut world.graph);
            return Ok(());
        }

        let large = match self.large {
            Some(large) => large,
            None => {
                let large = world.assets.texture(self.kind.art().large)?;
                self.large = Some(large);
                large
            }
        };
        debug!("{:?} enlarged with {large:?}", self.kind);

        let sound = if self.tuning.sounds {
            match world.assets.sound(self.kind.art().sound) {
                Ok(sound) => Some(sound),
                Err(err) => {
                    warn!("{:?} enlarged without sound: {err}", self.kind);
                    None
                }
            }
        } else {
            None
        };

        let graph = &mut world.graph;
        self.saved_position = Some(graph[self.node].position);
        self.enlarged = true;

        graph.remove_all_actions(self.node);
        self.show_face(graph);
        let node = &mut graph[self.node];
        node.rotation = 0.0;
        node.z = CardLevel::Enlarged.z();

        let duration = self.tuning.enlarge_duration;
        let mut steps = vec![
            Action::move_to(container.mid(), duration),
            Action::scale_to(self.tuning.enlarge_scale, duration),
        ];
        steps.extend(sound.map(Action::PlaySound));
        graph.run_with_key(self.node, Action::group(steps), ENLARGE_KEY);
        Ok(())
    }

    /// Shows the current side at once, for when an in-flight flip was cut off.
    fn show_face(&self, graph: &mut SceneGraph) {
        graph[self.node].content = Content::Sprite(self.face_texture());
        graph.remove_action(self.damage_label, FLIP_KEY);
        graph[self.damage_label].hidden = !self.face_up;
    }

    fn shrink(&mut self, graph: &mut SceneGraph) {
        let current = graph[self.node].position;
        let saved = self.saved_position.take().unwrap_or(current);
        self.enlarged = false;
        debug!("{:?} back to {saved}", self.kind);

        graph.remove_action(self.node, FLIP_KEY);
        self.show_face(graph);
        let node = &mut graph[self.node];
        node.scale.x = node.scale.y;

        let duration = self.tuning.enlarge_duration;
        let back = Action::sequence([
            Action::group([Action::move_to(saved, duration), Action::scale_to(1.0, duration)]),
            Action::SetZ(CardLevel::Board.z()),
        ]);
        graph.run_with_key(self.node, back, ENLARGE_KEY);
    }
}
