use std::path::Path;

use engine::{EngineConfig, EngineError};
use glam::Vec2;
use log::info;
use serde::{Deserialize, Serialize};

use crate::card::CardKind;

pub const DEFAULT_CONFIG: &str = "card_table.toml";

/// Top-level config file: an `[engine]` table and a `[game]` table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub game: GameConfig,
}

impl AppConfig {
    pub fn from_toml(text: &str) -> engine::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads `path`, or falls back to defaults when there is no such file.
    pub fn load(path: &Path) -> engine::Result<Self> {
        if !path.exists() {
            info!("no {} found, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml(&text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardPlacement {
    pub kind: CardKind,
    pub position: Vec2,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub background: String,
    pub cards: Vec<CardPlacement>,
    pub tuning: Tuning,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            background: "bg_blank".to_owned(),
            cards: vec![
                CardPlacement {
                    kind: CardKind::Wolf,
                    position: Vec2::new(100.0, 200.0),
                },
                CardPlacement {
                    kind: CardKind::Bear,
                    position: Vec2::new(300.0, 200.0),
                },
                CardPlacement {
                    kind: CardKind::Dragon,
                    position: Vec2::new(500.0, 200.0),
                },
            ],
            tuning: Tuning::default(),
        }
    }
}

/// Animation timings (seconds) and scales.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Each half of a flip: shrink to zero width, then grow back.
    pub flip_half: f32,
    pub wiggle_half: f32,
    pub wiggle_low: f32,
    pub wiggle_high: f32,
    pub pickup_scale: f32,
    pub pickup_duration: f32,
    pub drop_duration: f32,
    pub enlarge_scale: f32,
    pub enlarge_duration: f32,
    /// Play the card's sound when it is enlarged.
    pub sounds: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            flip_half: 0.15,
            wiggle_half: 0.2,
            wiggle_low: 1.0,
            wiggle_high: 1.2,
            pickup_scale: 1.3,
            pickup_duration: 0.25,
            drop_duration: 0.25,
            enlarge_scale: 2.5,
            enlarge_duration: 0.3,
            sounds: true,
        }
    }
}
